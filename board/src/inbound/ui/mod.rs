//! Board controller and the views it hands to a render surface.

mod controller;
mod view;

pub use controller::{
    ActionOutcome, BoardController, BoardKey, BoardPorts, DELETE_COMMENT_PROMPT, SIGN_IN_PROVIDER,
};
