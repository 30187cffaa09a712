//! Port for feedback row persistence (votes and comments).
//!
//! The [`FeedbackRepository`] trait is the seam between the board and the
//! hosted `feedback` table. It exposes row-level operations; the
//! read-check-then-write orchestration that keeps one vote per reviewer and
//! design lives in the domain service, not in adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CommentText, DesignId, FeedbackBody, FeedbackRecord, FeedbackRecordId, UserId, VoteKind, Voter,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "feedback store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "feedback store query failed: {message}",
        /// The store refused the request.
        Rejected { status: u16, message: String } =>
            "feedback store rejected the request ({status}): {message}",
        /// The store answered with rows the adapter could not read.
        Decode { message: String } =>
            "feedback store returned an unreadable payload: {message}",
        /// The write violates a uniqueness rule.
        Conflict { message: String } =>
            "feedback write conflicts with stored data: {message}",
    }
}

/// The reviewer's stored vote row for one design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredVote {
    /// Row id.
    pub id: FeedbackRecordId,
    /// Stored vote kind.
    pub kind: VoteKind,
}

/// Vote row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    /// Design voted on.
    pub design: DesignId,
    /// Voter.
    pub user: UserId,
    /// Vote kind.
    pub kind: VoteKind,
    /// Name snapshot.
    pub username: String,
}

/// Comment row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Design commented on.
    pub design: DesignId,
    /// Author.
    pub user: UserId,
    /// Comment text.
    pub text: CommentText,
    /// Name snapshot.
    pub username: String,
}

/// How a comment row is identified for deletion.
///
/// Rows are always additionally scoped to the requesting author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSelector {
    /// By row id.
    ById {
        /// Row id.
        id: FeedbackRecordId,
        /// Author.
        user: UserId,
    },
    /// By design, author and exact text, for comments without a known id.
    ByContent {
        /// Design commented on.
        design: DesignId,
        /// Author.
        user: UserId,
        /// Exact stored text.
        text: String,
    },
}

/// Port for feedback storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Every feedback row, newest first.
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError>;

    /// Feedback rows of one design, newest first.
    async fn fetch_design(
        &self,
        design: &DesignId,
    ) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError>;

    /// The vote row of `user` on `design`, if any.
    async fn find_vote(
        &self,
        design: &DesignId,
        user: &UserId,
    ) -> Result<Option<StoredVote>, FeedbackRepositoryError>;

    /// Insert a vote row.
    ///
    /// Adapters backed by a uniqueness constraint report a second vote row
    /// for the same design and user as [`FeedbackRepositoryError::Conflict`].
    async fn insert_vote(&self, vote: &NewVote) -> Result<(), FeedbackRepositoryError>;

    /// Change the kind (and refresh the name snapshot) of a vote row.
    async fn update_vote(
        &self,
        id: FeedbackRecordId,
        kind: VoteKind,
        username: &str,
    ) -> Result<(), FeedbackRepositoryError>;

    /// Delete a vote row.
    async fn delete_vote(&self, id: FeedbackRecordId) -> Result<(), FeedbackRepositoryError>;

    /// Insert a comment row and return it as stored.
    async fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> Result<FeedbackRecord, FeedbackRepositoryError>;

    /// Delete comment rows matching `selector`; returns how many went.
    async fn delete_comment(
        &self,
        selector: &CommentSelector,
    ) -> Result<u64, FeedbackRepositoryError>;

    /// Vote rows of one design as voter entries, newest first.
    async fn voters(&self, design: &DesignId) -> Result<Vec<Voter>, FeedbackRepositoryError>;

    /// Rename `user`'s vote rows whose snapshot is `Anonymous`; returns how
    /// many rows changed.
    async fn claim_anonymous_votes(
        &self,
        user: &UserId,
        username: &str,
    ) -> Result<u64, FeedbackRepositoryError>;
}

/// Fixture implementation for tests that do not exercise storage.
///
/// Lookups return nothing and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFeedbackRepository;

#[async_trait]
impl FeedbackRepository for FixtureFeedbackRepository {
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        Ok(Vec::new())
    }

    async fn fetch_design(
        &self,
        _design: &DesignId,
    ) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_vote(
        &self,
        _design: &DesignId,
        _user: &UserId,
    ) -> Result<Option<StoredVote>, FeedbackRepositoryError> {
        Ok(None)
    }

    async fn insert_vote(&self, _vote: &NewVote) -> Result<(), FeedbackRepositoryError> {
        Ok(())
    }

    async fn update_vote(
        &self,
        _id: FeedbackRecordId,
        _kind: VoteKind,
        _username: &str,
    ) -> Result<(), FeedbackRepositoryError> {
        Ok(())
    }

    async fn delete_vote(&self, _id: FeedbackRecordId) -> Result<(), FeedbackRepositoryError> {
        Ok(())
    }

    async fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> Result<FeedbackRecord, FeedbackRepositoryError> {
        Ok(FeedbackRecord {
            id: FeedbackRecordId(0),
            design: comment.design.clone(),
            user: Some(comment.user.clone()),
            body: FeedbackBody::Comment(comment.text.to_string()),
            username: comment.username.clone(),
            created_at: DateTime::<Utc>::default(),
        })
    }

    async fn delete_comment(
        &self,
        _selector: &CommentSelector,
    ) -> Result<u64, FeedbackRepositoryError> {
        Ok(0)
    }

    async fn voters(&self, _design: &DesignId) -> Result<Vec<Voter>, FeedbackRepositoryError> {
        Ok(Vec::new())
    }

    async fn claim_anonymous_votes(
        &self,
        _user: &UserId,
        _username: &str,
    ) -> Result<u64, FeedbackRepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_echoes_inserted_comment() {
        let repo = FixtureFeedbackRepository;
        let comment = NewComment {
            design: DesignId::parse("theme1/a.png").expect("valid id"),
            user: UserId::random(),
            text: CommentText::new("nice").expect("valid text"),
            username: "sam".to_owned(),
        };

        let stored = repo.insert_comment(&comment).await.expect("fixture insert");

        assert_eq!(stored.body, FeedbackBody::Comment("nice".to_owned()));
        assert_eq!(stored.design, comment.design);
        assert!(repo.fetch_all().await.expect("fixture fetch").is_empty());
    }
}
