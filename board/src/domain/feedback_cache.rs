//! Page-lifetime feedback store.
//!
//! Holds aggregated feedback per design plus the viewer's own vote per
//! design. Every method that touches the viewer's vote writes both maps
//! before returning, so no reader can observe them disagreeing.

use std::collections::HashMap;

use super::{AggregatedFeedback, Comment, DesignId, VoteCounts, VoteKind, VoteSnapshot};

/// Aggregate cache plus own-vote cache.
#[derive(Debug, Clone, Default)]
pub struct FeedbackCache {
    aggregates: HashMap<DesignId, AggregatedFeedback>,
    own_votes: HashMap<DesignId, VoteKind>,
}

impl FeedbackCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all contents with a fresh bulk load.
    ///
    /// The own-vote map is rebuilt from each aggregate's `user_vote`.
    pub fn replace_all(&mut self, aggregates: HashMap<DesignId, AggregatedFeedback>) {
        self.own_votes = aggregates
            .iter()
            .filter_map(|(design, feedback)| feedback.user_vote.map(|kind| (design.clone(), kind)))
            .collect();
        self.aggregates = aggregates;
    }

    /// Store the result of a single-design fetch.
    pub fn insert(&mut self, design: DesignId, feedback: AggregatedFeedback) {
        match feedback.user_vote {
            Some(kind) => self.own_votes.insert(design.clone(), kind),
            None => self.own_votes.remove(&design),
        };
        self.aggregates.insert(design, feedback);
    }

    /// Feedback for `design`, or the zero default on a miss.
    ///
    /// # Examples
    /// ```
    /// use board::domain::{DesignId, FeedbackCache};
    ///
    /// let cache = FeedbackCache::new();
    /// let design = DesignId::parse("theme1/a.png").expect("valid id");
    /// let feedback = cache.get(&design);
    /// assert_eq!(feedback.counts.likes, 0);
    /// assert!(feedback.comments.is_empty());
    /// assert!(feedback.user_vote.is_none());
    /// ```
    pub fn get(&self, design: &DesignId) -> AggregatedFeedback {
        self.aggregates.get(design).cloned().unwrap_or_default()
    }

    /// Feedback for `design` only if it was loaded.
    pub fn get_cached(&self, design: &DesignId) -> Option<&AggregatedFeedback> {
        self.aggregates.get(design)
    }

    /// Whether `design` has an entry.
    pub fn contains(&self, design: &DesignId) -> bool {
        self.aggregates.contains_key(design)
    }

    /// The viewer's vote on `design`.
    pub fn own_vote(&self, design: &DesignId) -> Option<VoteKind> {
        self.own_votes.get(design).copied()
    }

    /// Own vote plus counts of `design`.
    pub fn vote_snapshot(&self, design: &DesignId) -> VoteSnapshot {
        VoteSnapshot {
            own_vote: self.own_vote(design),
            counts: self
                .aggregates
                .get(design)
                .map(|feedback| feedback.counts)
                .unwrap_or_default(),
        }
    }

    /// Overwrite the numeric fields of `design`.
    pub fn patch_counts(&mut self, design: &DesignId, likes: u32, dislikes: u32, comment_count: u32) {
        let entry = self.entry(design);
        entry.counts = VoteCounts::new(likes, dislikes);
        entry.comment_count = comment_count;
    }

    /// Write own vote and counts together.
    pub fn apply_vote_snapshot(&mut self, design: &DesignId, snapshot: VoteSnapshot) {
        let entry = self.entry(design);
        entry.counts = snapshot.counts;
        entry.user_vote = snapshot.own_vote;
        self.set_own_vote_entry(design, snapshot.own_vote);
    }

    /// Set the viewer's vote in both maps without touching counts.
    pub fn set_own_vote(&mut self, design: &DesignId, vote: Option<VoteKind>) {
        self.entry(design).user_vote = vote;
        self.set_own_vote_entry(design, vote);
    }

    /// Forget the viewer's votes after sign-out; public counts stay.
    pub fn clear_own_votes(&mut self) {
        self.own_votes.clear();
        for feedback in self.aggregates.values_mut() {
            feedback.user_vote = None;
        }
    }

    /// Append a comment and bump the badge count by one.
    pub fn append_comment(&mut self, design: &DesignId, comment: Comment) {
        let entry = self.entry(design);
        entry.comments.push(comment);
        entry.comment_count = entry.comment_count.saturating_add(1);
    }

    /// Comment shown at `display_index` (newest first).
    pub fn comment_at_display_index(&self, design: &DesignId, display_index: usize) -> Option<&Comment> {
        let comments = &self.aggregates.get(design)?.comments;
        let storage_index = storage_index(comments.len(), display_index)?;
        comments.get(storage_index)
    }

    /// Remove the comment shown at `display_index` and decrement the badge,
    /// floored at zero.
    ///
    /// Display index `i` is storage index `len - 1 - i`.
    ///
    /// # Examples
    /// ```
    /// use board::domain::{Comment, DesignId, FeedbackCache};
    /// use chrono::Utc;
    ///
    /// let design = DesignId::parse("theme1/a.png").expect("valid id");
    /// let mut cache = FeedbackCache::new();
    /// for text in ["C1", "C2", "C3"] {
    ///     cache.append_comment(&design, Comment {
    ///         id: None,
    ///         text: text.into(),
    ///         username: "sam".into(),
    ///         user: None,
    ///         created_at: Utc::now(),
    ///     });
    /// }
    ///
    /// let removed = cache.remove_comment_at_display_index(&design, 1).expect("present");
    /// assert_eq!(removed.text, "C2");
    /// let left: Vec<_> = cache.get(&design).comments.iter().map(|c| c.text.clone()).collect();
    /// assert_eq!(left, ["C1", "C3"]);
    /// ```
    pub fn remove_comment_at_display_index(
        &mut self,
        design: &DesignId,
        display_index: usize,
    ) -> Option<Comment> {
        let entry = self.aggregates.get_mut(design)?;
        let index = storage_index(entry.comments.len(), display_index)?;
        let removed = entry.comments.remove(index);
        entry.comment_count = entry.comment_count.saturating_sub(1);
        Some(removed)
    }

    /// Number of designs with an entry.
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    fn entry(&mut self, design: &DesignId) -> &mut AggregatedFeedback {
        self.aggregates.entry(design.clone()).or_default()
    }

    fn set_own_vote_entry(&mut self, design: &DesignId, vote: Option<VoteKind>) {
        match vote {
            Some(kind) => {
                self.own_votes.insert(design.clone(), kind);
            }
            None => {
                self.own_votes.remove(design);
            }
        }
    }
}

fn storage_index(len: usize, display_index: usize) -> Option<usize> {
    len.checked_sub(1)?.checked_sub(display_index)
}
