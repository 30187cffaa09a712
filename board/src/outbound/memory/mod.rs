//! In-process adapters used by demos, the controller tests and local runs.

mod auth;
mod feedback;
mod selections;

pub use auth::InMemoryAuthSession;
pub use feedback::InMemoryFeedbackRepository;
pub use selections::InMemorySelectionRepository;
