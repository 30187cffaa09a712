//! Feedback domain service.
//!
//! Wraps the [`FeedbackRepository`] port with the rules the board relies on:
//! one vote row per reviewer and design (read, check, then a single write),
//! author-only comment deletion, and username snapshots taken from the
//! signed-in [`Identity`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CommentSelector, FeedbackRepository, FeedbackRepositoryError, NewComment, NewVote,
};
use crate::domain::{
    AggregatedFeedback, Comment, CommentText, DesignId, DesignVoters, DomainError, FeedbackBody,
    Identity, UserId, VoteKind, WriteAction, aggregate,
};

/// Feedback service over a repository adapter.
#[derive(Clone)]
pub struct FeedbackService<R> {
    repo: Arc<R>,
}

impl<R> FeedbackService<R> {
    /// Create a service backed by `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

/// Translate a repository failure into a domain error.
pub(crate) fn map_feedback_error(error: FeedbackRepositoryError) -> DomainError {
    match error {
        FeedbackRepositoryError::Connection { message } => {
            DomainError::service_unavailable(format!("feedback store unavailable: {message}"))
        }
        FeedbackRepositoryError::Query { message } => {
            DomainError::internal(format!("feedback store error: {message}"))
        }
        FeedbackRepositoryError::Rejected { status, message } => {
            let mapped = match status {
                401 => DomainError::unauthorized(message),
                403 => DomainError::forbidden(message),
                404 => DomainError::not_found(message),
                409 => DomainError::conflict(message),
                500..=599 => DomainError::service_unavailable(message),
                _ => DomainError::invalid_request(message),
            };
            mapped.with_details(json!({ "status": status }))
        }
        FeedbackRepositoryError::Decode { message } => {
            DomainError::internal(format!("feedback store payload unreadable: {message}"))
        }
        FeedbackRepositoryError::Conflict { message } => DomainError::conflict(message),
    }
}

impl<R> FeedbackService<R>
where
    R: FeedbackRepository,
{
    /// Every design's feedback, with `viewer`'s votes marked.
    pub async fn fetch_all(
        &self,
        viewer: Option<&UserId>,
    ) -> Result<HashMap<DesignId, AggregatedFeedback>, DomainError> {
        let records = self.repo.fetch_all().await.map_err(map_feedback_error)?;
        debug!(rows = records.len(), "fetched feedback rows");
        Ok(aggregate(&records, viewer))
    }

    /// Feedback of one design; designs without rows yield the zero default.
    pub async fn fetch_design(
        &self,
        design: &DesignId,
        viewer: Option<&UserId>,
    ) -> Result<AggregatedFeedback, DomainError> {
        let records = self
            .repo
            .fetch_design(design)
            .await
            .map_err(map_feedback_error)?;
        Ok(aggregate(&records, viewer)
            .remove(design)
            .unwrap_or_default())
    }

    /// Bring the stored vote of `identity` on `design` to `target`.
    ///
    /// Reads the stored row first and issues exactly one of insert, update or
    /// delete. An insert that collides with a row written in the meantime is
    /// resolved once by re-reading and applying the matching write.
    pub async fn submit_vote(
        &self,
        identity: &Identity,
        design: &DesignId,
        target: Option<VoteKind>,
    ) -> Result<(), DomainError> {
        let username = identity.vote_username();
        match self.write_vote(identity, design, target, &username).await {
            Err(FeedbackRepositoryError::Conflict { message }) => {
                debug!(%design, %message, "vote insert raced; retrying against stored row");
                self.write_vote(identity, design, target, &username)
                    .await
                    .map_err(map_feedback_error)
            }
            other => other.map_err(map_feedback_error),
        }
    }

    async fn write_vote(
        &self,
        identity: &Identity,
        design: &DesignId,
        target: Option<VoteKind>,
        username: &str,
    ) -> Result<(), FeedbackRepositoryError> {
        let stored = self.repo.find_vote(design, &identity.user_id).await?;
        let action = WriteAction::decide(stored.map(|vote| vote.kind), target);
        match (action, stored) {
            (None, _) => Ok(()),
            (Some(WriteAction::Insert(kind)), _) => {
                self.repo
                    .insert_vote(&NewVote {
                        design: design.clone(),
                        user: identity.user_id.clone(),
                        kind,
                        username: username.to_owned(),
                    })
                    .await
            }
            (Some(WriteAction::Update(kind)), Some(row)) => {
                self.repo.update_vote(row.id, kind, username).await
            }
            (Some(WriteAction::Delete), Some(row)) => self.repo.delete_vote(row.id).await,
            (Some(_), None) => Err(FeedbackRepositoryError::query(
                "stored vote disappeared while planning the write",
            )),
        }
    }

    /// Store a comment by `identity` and return it as the board holds it.
    pub async fn submit_comment(
        &self,
        identity: &Identity,
        design: &DesignId,
        text: CommentText,
    ) -> Result<Comment, DomainError> {
        let record = self
            .repo
            .insert_comment(&NewComment {
                design: design.clone(),
                user: identity.user_id.clone(),
                text,
                username: identity.comment_username(),
            })
            .await
            .map_err(map_feedback_error)?;

        match record.body {
            FeedbackBody::Comment(text) => Ok(Comment {
                id: Some(record.id),
                text,
                username: record.username,
                user: record.user,
                created_at: record.created_at,
            }),
            FeedbackBody::Vote(kind) => Err(DomainError::internal(
                "feedback store returned a vote row for a comment insert",
            )
            .with_details(json!({ "voteType": kind.as_str() }))),
        }
    }

    /// Delete `comment` on `design` on behalf of `identity`.
    ///
    /// Only the author may delete. Comments with a row id are deleted by id;
    /// older local entries fall back to matching design, author and text.
    pub async fn delete_comment(
        &self,
        identity: &Identity,
        design: &DesignId,
        comment: &Comment,
    ) -> Result<(), DomainError> {
        if !comment.is_authored_by(&identity.user_id) {
            return Err(DomainError::forbidden("only the author may delete a comment"));
        }
        let selector = match comment.id {
            Some(id) => CommentSelector::ById {
                id,
                user: identity.user_id.clone(),
            },
            None => CommentSelector::ByContent {
                design: design.clone(),
                user: identity.user_id.clone(),
                text: comment.text.clone(),
            },
        };
        let removed = self
            .repo
            .delete_comment(&selector)
            .await
            .map_err(map_feedback_error)?;
        if removed == 0 {
            debug!(%design, "comment delete matched no rows");
        }
        Ok(())
    }

    /// Who liked and disliked `design`, newest first.
    pub async fn voters(&self, design: &DesignId) -> Result<DesignVoters, DomainError> {
        let voters = self.repo.voters(design).await.map_err(map_feedback_error)?;
        Ok(DesignVoters::from_voters(voters))
    }

    /// Rename `identity`'s vote rows still carrying the anonymous snapshot.
    pub async fn claim_anonymous_votes(&self, identity: &Identity) -> Result<u64, DomainError> {
        let username = identity.vote_username();
        let updated = self
            .repo
            .claim_anonymous_votes(&identity.user_id, &username)
            .await
            .map_err(|error| {
                warn!(user = %identity.user_id, %error, "claiming anonymous votes failed");
                map_feedback_error(error)
            })?;
        if updated > 0 {
            info!(user = %identity.user_id, updated, "claimed anonymous votes");
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "feedback_service_tests.rs"]
mod tests;
