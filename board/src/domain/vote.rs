//! Vote state machine and the optimistic vote command.
//!
//! A reviewer holds at most one vote per design: none, like or dislike.
//! Clicking the active kind retracts it, clicking the other kind switches.
//! [`VoteCommand`] captures the state before and after a click so the caller
//! can apply the change immediately and restore the exact prior state if the
//! backend write fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DesignId;

/// The two kinds of vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Thumbs up.
    Like,
    /// Thumbs down.
    Dislike,
}

impl VoteKind {
    /// Wire and markup name (`like` / `dislike`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vote kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVoteKind(pub String);

impl fmt::Display for UnknownVoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vote type '{}'", self.0)
    }
}

impl std::error::Error for UnknownVoteKind {}

impl FromStr for VoteKind {
    type Err = UnknownVoteKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(UnknownVoteKind(other.to_owned())),
        }
    }
}

/// Next own-vote state after clicking `clicked`.
///
/// # Examples
/// ```
/// use board::domain::{VoteKind, next_vote};
///
/// assert_eq!(next_vote(None, VoteKind::Like), Some(VoteKind::Like));
/// assert_eq!(next_vote(Some(VoteKind::Like), VoteKind::Like), None);
/// assert_eq!(next_vote(Some(VoteKind::Like), VoteKind::Dislike), Some(VoteKind::Dislike));
/// ```
pub fn next_vote(current: Option<VoteKind>, clicked: VoteKind) -> Option<VoteKind> {
    if current == Some(clicked) {
        None
    } else {
        Some(clicked)
    }
}

/// Public like and dislike counts of a design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VoteCounts {
    /// Number of likes.
    pub likes: u32,
    /// Number of dislikes.
    pub dislikes: u32,
}

impl VoteCounts {
    /// Counts with the given values.
    pub const fn new(likes: u32, dislikes: u32) -> Self {
        Self { likes, dislikes }
    }

    /// Counts after one voter moves from `from` to `to`.
    ///
    /// Decrements saturate at zero so a stale cache can never go negative.
    pub fn transition(self, from: Option<VoteKind>, to: Option<VoteKind>) -> Self {
        let mut next = self;
        match from {
            Some(VoteKind::Like) => next.likes = next.likes.saturating_sub(1),
            Some(VoteKind::Dislike) => next.dislikes = next.dislikes.saturating_sub(1),
            None => {}
        }
        match to {
            Some(VoteKind::Like) => next.likes = next.likes.saturating_add(1),
            Some(VoteKind::Dislike) => next.dislikes = next.dislikes.saturating_add(1),
            None => {}
        }
        next
    }

    /// Count for one kind.
    pub const fn get(self, kind: VoteKind) -> u32 {
        match kind {
            VoteKind::Like => self.likes,
            VoteKind::Dislike => self.dislikes,
        }
    }
}

/// Own vote plus public counts of one design at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteSnapshot {
    /// The current reviewer's vote.
    pub own_vote: Option<VoteKind>,
    /// Public counts.
    pub counts: VoteCounts,
}

/// One optimistic vote transition with its compensating rollback.
///
/// # Examples
/// ```
/// use board::domain::{DesignId, VoteCommand, VoteCounts, VoteKind, VoteSnapshot};
///
/// let design = DesignId::parse("theme1/a.png").expect("valid id");
/// let before = VoteSnapshot { own_vote: Some(VoteKind::Dislike), counts: VoteCounts::new(2, 3) };
/// let command = VoteCommand::plan(design, before, VoteKind::Like);
///
/// assert_eq!(command.after().own_vote, Some(VoteKind::Like));
/// assert_eq!(command.after().counts, VoteCounts::new(3, 2));
/// assert_eq!(command.rollback(), before);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteCommand {
    design: DesignId,
    clicked: VoteKind,
    before: VoteSnapshot,
    after: VoteSnapshot,
}

impl VoteCommand {
    /// Plan the transition caused by clicking `clicked` in state `before`.
    pub fn plan(design: DesignId, before: VoteSnapshot, clicked: VoteKind) -> Self {
        let target = next_vote(before.own_vote, clicked);
        let after = VoteSnapshot {
            own_vote: target,
            counts: before.counts.transition(before.own_vote, target),
        };
        Self {
            design,
            clicked,
            before,
            after,
        }
    }

    /// Design the command applies to.
    pub fn design(&self) -> &DesignId {
        &self.design
    }

    /// Kind the reviewer clicked.
    pub fn clicked(&self) -> VoteKind {
        self.clicked
    }

    /// State before the click.
    pub fn before(&self) -> VoteSnapshot {
        self.before
    }

    /// Optimistic state after the click.
    pub fn after(&self) -> VoteSnapshot {
        self.after
    }

    /// Vote the backend should hold once the command succeeds.
    pub fn target(&self) -> Option<VoteKind> {
        self.after.own_vote
    }

    /// State to restore when the backend write fails.
    pub fn rollback(&self) -> VoteSnapshot {
        self.before
    }
}

/// The single backend write that moves a stored vote to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// Insert a new vote row.
    Insert(VoteKind),
    /// Change the kind of the existing row.
    Update(VoteKind),
    /// Delete the existing row.
    Delete,
}

impl WriteAction {
    /// Choose the write for a stored vote and a target; `None` when the store
    /// already holds the target.
    ///
    /// # Examples
    /// ```
    /// use board::domain::{VoteKind, WriteAction};
    ///
    /// assert_eq!(WriteAction::decide(None, Some(VoteKind::Like)), Some(WriteAction::Insert(VoteKind::Like)));
    /// assert_eq!(WriteAction::decide(Some(VoteKind::Like), None), Some(WriteAction::Delete));
    /// assert_eq!(WriteAction::decide(Some(VoteKind::Like), Some(VoteKind::Like)), None);
    /// ```
    pub fn decide(stored: Option<VoteKind>, target: Option<VoteKind>) -> Option<Self> {
        match (stored, target) {
            (None, None) => None,
            (Some(_), None) => Some(Self::Delete),
            (None, Some(kind)) => Some(Self::Insert(kind)),
            (Some(current), Some(kind)) if current == kind => None,
            (Some(_), Some(kind)) => Some(Self::Update(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn design() -> DesignId {
        DesignId::parse("theme1/a.png").expect("valid id")
    }

    fn snapshot(own_vote: Option<VoteKind>, likes: u32, dislikes: u32) -> VoteSnapshot {
        VoteSnapshot {
            own_vote,
            counts: VoteCounts::new(likes, dislikes),
        }
    }

    #[rstest]
    #[case(None, VoteKind::Like, snapshot(Some(VoteKind::Like), 1, 0))]
    #[case(None, VoteKind::Dislike, snapshot(Some(VoteKind::Dislike), 0, 1))]
    #[case(Some(VoteKind::Like), VoteKind::Like, snapshot(None, 0, 0))]
    #[case(Some(VoteKind::Like), VoteKind::Dislike, snapshot(Some(VoteKind::Dislike), 0, 1))]
    #[case(Some(VoteKind::Dislike), VoteKind::Like, snapshot(Some(VoteKind::Like), 1, 0))]
    fn plans_every_transition(
        #[case] own_vote: Option<VoteKind>,
        #[case] clicked: VoteKind,
        #[case] expected: VoteSnapshot,
    ) {
        let start = snapshot(
            own_vote,
            u32::from(own_vote == Some(VoteKind::Like)),
            u32::from(own_vote == Some(VoteKind::Dislike)),
        );
        let command = VoteCommand::plan(design(), start, clicked);

        assert_eq!(command.after(), expected);
        assert_eq!(command.rollback(), start);
    }

    #[test]
    fn own_contribution_never_exceeds_one() {
        let mut state = snapshot(None, 4, 4);
        let clicks = [
            VoteKind::Like,
            VoteKind::Dislike,
            VoteKind::Dislike,
            VoteKind::Like,
            VoteKind::Like,
            VoteKind::Dislike,
        ];
        for clicked in clicks {
            state = VoteCommand::plan(design(), state, clicked).after();
            let total = state.counts.likes + state.counts.dislikes;
            let own = u32::from(state.own_vote.is_some());
            assert_eq!(total, 8 + own);
        }
    }

    #[test]
    fn clicking_active_vote_twice_restores_it() {
        let start = snapshot(Some(VoteKind::Like), 3, 0);
        let retracted = VoteCommand::plan(design(), start, VoteKind::Like).after();
        let restored = VoteCommand::plan(design(), retracted, VoteKind::Like).after();

        assert_eq!(retracted.own_vote, None);
        assert_eq!(restored, start);
    }

    #[test]
    fn stale_counts_saturate_at_zero() {
        let counts = VoteCounts::new(0, 0).transition(Some(VoteKind::Like), None);
        assert_eq!(counts, VoteCounts::new(0, 0));
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("like".parse::<VoteKind>(), Ok(VoteKind::Like));
        assert_eq!(
            "meh".parse::<VoteKind>(),
            Err(UnknownVoteKind("meh".to_owned()))
        );
    }
}
