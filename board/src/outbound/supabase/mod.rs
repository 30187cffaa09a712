//! Adapters for the hosted backend (PostgREST tables plus auth endpoints).
//!
//! All adapters share one [`SupabaseClient`], which carries the project URL,
//! the API key and the optional user access token.

mod auth;
mod client;
mod dto;
mod feedback;
mod fingerprint;
mod selections;

pub use auth::SupabaseAuthSession;
pub use client::SupabaseClient;
pub use feedback::SupabaseFeedbackRepository;
pub use fingerprint::key_fingerprint;
pub use selections::SupabaseSelectionRepository;
