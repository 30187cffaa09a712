//! Driving adapters.

pub mod ui;
