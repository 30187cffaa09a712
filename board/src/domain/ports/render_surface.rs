//! Port through which the controller draws the board.
//!
//! Every element of the generated page that the controller updates is
//! addressed by a typed [`DesignId`] plus a [`BadgeKind`] or by a theme
//! folder, never by hand-built element ids. Implementations translate these
//! into their own binding (DOM ids, terminal rows, a test log).

use chrono::{DateTime, Utc};
use gallery_builder::BadgeKind;

use crate::domain::{DesignId, Identity, VoteCounts, VoteKind};

/// User-facing notices raised by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Voting or commenting needs a signed-in reviewer.
    SignInRequired,
    /// A vote write failed and was rolled back.
    VoteFailed,
    /// A comment could not be stored.
    CommentFailed,
    /// A comment could not be deleted.
    CommentDeleteFailed,
    /// A selection toggle failed.
    SelectionFailed,
    /// The reviewer may not perform the action.
    NotPermitted,
}

impl Notice {
    /// Text shown to the reviewer.
    pub const fn message(self) -> &'static str {
        match self {
            Self::SignInRequired => "Please sign in with Google to vote on or comment on designs.",
            Self::VoteFailed => "Failed to submit vote. Please try again.",
            Self::CommentFailed => "Failed to submit comment. Please try again.",
            Self::CommentDeleteFailed => "Failed to delete comment. Please try again.",
            Self::SelectionFailed => "Failed to update the selection. Please try again.",
            Self::NotPermitted => "You are not allowed to do that.",
        }
    }
}

/// One comment row in the lightbox sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    /// Position in display order (newest first).
    pub display_index: usize,
    /// Comment text.
    pub text: String,
    /// Author name snapshot.
    pub username: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the delete affordance is shown.
    pub deletable: bool,
}

/// Everything the lightbox shows for the current design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxView {
    /// Current design.
    pub design: DesignId,
    /// Formatted design name.
    pub title: String,
    /// Zero-based position within the theme.
    pub position: usize,
    /// Number of designs in the theme.
    pub total: usize,
    /// Public counts.
    pub counts: VoteCounts,
    /// Comment badge count.
    pub comment_count: u32,
    /// The reviewer's vote.
    pub own_vote: Option<VoteKind>,
    /// Comments, newest first.
    pub comments: Vec<CommentView>,
}

/// Labels of the theme statistics; `None` renders as `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeStatsView {
    /// Formatted name of the most liked design.
    pub most_liked: Option<String>,
    /// Formatted name of the most disliked design.
    pub most_disliked: Option<String>,
}

/// Driven port for the page the reviewer looks at.
pub trait RenderSurface {
    /// Set the badge of `kind` on `design`.
    fn set_badge(&self, design: &DesignId, kind: BadgeKind, value: u32);

    /// Highlight the reviewer's vote on `design`'s thumbnail controls.
    fn set_vote_highlight(&self, design: &DesignId, vote: Option<VoteKind>);

    /// Refresh the lightbox vote buttons and sidebar counts.
    fn set_lightbox_votes(&self, counts: VoteCounts, vote: Option<VoteKind>);

    /// Mark `design`'s vote controls busy or idle.
    fn set_processing(&self, design: &DesignId, processing: bool);

    /// Open or redraw the lightbox.
    fn show_lightbox(&self, view: &LightboxView);

    /// Replace the comment list of the open lightbox.
    fn patch_comments(&self, design: &DesignId, comments: &[CommentView]);

    /// Close the lightbox.
    fn close_lightbox(&self);

    /// Update the statistics placeholders of `theme`.
    fn set_theme_stats(&self, theme: &str, stats: &ThemeStatsView);

    /// Show the signed-in reviewer, or the sign-in button for `None`.
    fn set_identity(&self, identity: Option<&Identity>);

    /// Mark `design` as selected or not.
    fn set_selected(&self, design: &DesignId, selected: bool);

    /// Show a notice.
    fn notify(&self, notice: Notice);

    /// Ask the reviewer to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_have_distinct_messages() {
        let notices = [
            Notice::SignInRequired,
            Notice::VoteFailed,
            Notice::CommentFailed,
            Notice::CommentDeleteFailed,
            Notice::SelectionFailed,
            Notice::NotPermitted,
        ];
        let messages: std::collections::HashSet<_> =
            notices.iter().map(|notice| notice.message()).collect();
        assert_eq!(messages.len(), notices.len());
    }
}
