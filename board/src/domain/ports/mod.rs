//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_session;
mod feedback_repository;
mod render_surface;
mod selection_repository;
mod sleeper;

#[cfg(test)]
pub use auth_session::MockAuthSession;
pub use auth_session::{AuthSession, AuthSessionError, FixtureAuthSession};
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
pub use feedback_repository::{
    CommentSelector, FeedbackRepository, FeedbackRepositoryError, FixtureFeedbackRepository,
    NewComment, NewVote, StoredVote,
};
pub use render_surface::{CommentView, LightboxView, Notice, RenderSurface, ThemeStatsView};
#[cfg(test)]
pub use selection_repository::MockSelectionRepository;
pub use selection_repository::{
    FixtureSelectionRepository, SelectionRepository, SelectionRepositoryError,
};
pub use sleeper::{ImmediateSleeper, Sleeper, TokioSleeper};
