//! Domain primitives, the feedback cache and the services over the ports.
//!
//! Everything here is independent of the hosted backend and of how the page
//! is drawn. Adapters live under `outbound` and `inbound`.

pub mod ports;

mod auth;
mod comments;
mod design;
mod error;
mod feedback;
mod feedback_cache;
mod feedback_service;
mod identity;
mod in_flight;
mod selection;
mod selection_service;
mod slideshow;
mod theme_stats;
mod user;
mod vote;

pub use self::auth::{ApiCredentials, CredentialsValidationError};
pub use self::comments::{CommentText, CommentValidationError};
pub use self::design::{DesignId, DesignIdValidationError, Gallery, Theme};
pub use self::error::{DomainError, ErrorCode};
pub use self::feedback::{
    AggregatedFeedback, Comment, DesignVoters, FeedbackBody, FeedbackRecord, FeedbackRecordId,
    Voter, aggregate,
};
pub use self::feedback_cache::FeedbackCache;
pub use self::feedback_service::FeedbackService;
pub use self::identity::{ANONYMOUS_USERNAME, AdminPolicy, Identity};
pub use self::in_flight::{InFlight, InFlightGuard};
pub use self::selection::{Selection, SelectionChange};
pub use self::selection_service::SelectionService;
pub use self::slideshow::Slideshow;
pub use self::theme_stats::{DesignTally, ThemeStats, theme_stats};
pub use self::user::{UserId, UserValidationError};
pub use self::vote::{
    UnknownVoteKind, VoteCommand, VoteCounts, VoteKind, VoteSnapshot, WriteAction, next_vote,
};
