//! Feedback rows and their per-design aggregation.
//!
//! The backend stores one row per vote and one row per comment. The board
//! works with [`AggregatedFeedback`]: counts, the comment list (oldest first)
//! and the viewer's own vote.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DesignId, UserId, VoteCounts, VoteKind};

/// Backend row id of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackRecordId(pub i64);

/// What a feedback row carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackBody {
    /// A like or dislike.
    Vote(VoteKind),
    /// Free comment text.
    Comment(String),
}

/// One stored feedback row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Row id.
    pub id: FeedbackRecordId,
    /// Design the row belongs to.
    pub design: DesignId,
    /// Author; `None` only for legacy anonymous rows.
    pub user: Option<UserId>,
    /// Vote or comment payload.
    pub body: FeedbackBody,
    /// Display name snapshot taken at write time.
    pub username: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A comment as held by the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Row id; `None` for comments added locally before the id was known.
    pub id: Option<FeedbackRecordId>,
    /// Comment text.
    pub text: String,
    /// Author name snapshot.
    pub username: String,
    /// Author id.
    pub user: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether `viewer` wrote this comment.
    pub fn is_authored_by(&self, viewer: &UserId) -> bool {
        self.user.as_ref() == Some(viewer)
    }
}

/// Everything the board shows for one design.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedFeedback {
    /// Like and dislike counts.
    pub counts: VoteCounts,
    /// Comment badge count.
    pub comment_count: u32,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    /// The viewer's vote.
    pub user_vote: Option<VoteKind>,
}

impl AggregatedFeedback {
    /// Comments in display order (newest first).
    pub fn comments_newest_first(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().rev()
    }
}

/// Group rows by design.
///
/// Rows may arrive in any order; comments end up oldest first with the row
/// id breaking timestamp ties. `viewer` decides which vote becomes
/// `user_vote`.
///
/// # Examples
/// ```
/// use board::domain::{DesignId, FeedbackBody, FeedbackRecord, FeedbackRecordId, VoteKind, aggregate};
/// use chrono::{TimeZone, Utc};
///
/// let design = DesignId::parse("theme1/a.png").expect("valid id");
/// let rows = vec![FeedbackRecord {
///     id: FeedbackRecordId(1),
///     design: design.clone(),
///     user: None,
///     body: FeedbackBody::Vote(VoteKind::Like),
///     username: "Anonymous".into(),
///     created_at: Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
/// }];
///
/// let grouped = aggregate(&rows, None);
/// assert_eq!(grouped[&design].counts.likes, 1);
/// assert_eq!(grouped[&design].user_vote, None);
/// ```
pub fn aggregate(
    records: &[FeedbackRecord],
    viewer: Option<&UserId>,
) -> HashMap<DesignId, AggregatedFeedback> {
    let mut ordered: Vec<&FeedbackRecord> = records.iter().collect();
    ordered.sort_by_key(|record| (record.created_at, record.id));

    let mut grouped: HashMap<DesignId, AggregatedFeedback> = HashMap::new();
    for record in ordered {
        let entry = grouped.entry(record.design.clone()).or_default();
        match &record.body {
            FeedbackBody::Vote(kind) => {
                entry.counts = entry.counts.transition(None, Some(*kind));
                if viewer.is_some() && record.user.as_ref() == viewer {
                    entry.user_vote = Some(*kind);
                }
            }
            FeedbackBody::Comment(text) => {
                entry.comment_count = entry.comment_count.saturating_add(1);
                entry.comments.push(Comment {
                    id: Some(record.id),
                    text: text.clone(),
                    username: record.username.clone(),
                    user: record.user.clone(),
                    created_at: record.created_at,
                });
            }
        }
    }
    grouped
}

/// Who voted on a design, for the admin voter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    /// Name snapshot.
    pub username: String,
    /// Vote kind.
    pub kind: VoteKind,
    /// When the vote was cast.
    pub created_at: DateTime<Utc>,
}

/// Likes and dislikes of one design, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignVoters {
    /// People who liked the design.
    pub likes: Vec<Voter>,
    /// People who disliked the design.
    pub dislikes: Vec<Voter>,
}

impl DesignVoters {
    /// Split voters by kind, newest first.
    pub fn from_voters(mut voters: Vec<Voter>) -> Self {
        voters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let (likes, dislikes) = voters
            .into_iter()
            .partition(|voter| voter.kind == VoteKind::Like);
        Self { likes, dislikes }
    }
}
