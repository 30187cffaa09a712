//! PostgREST adapter for the `feedback` table.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};

use super::client::{HttpFailure, RETURN_REPRESENTATION, SupabaseClient, eq};
use super::dto::{
    FeedbackRowDto, NewCommentRowDto, NewVoteRowDto, StoredVoteRowDto, VotePatchDto, VoterRowDto,
};
use crate::domain::ports::{
    CommentSelector, FeedbackRepository, FeedbackRepositoryError, NewComment, NewVote, StoredVote,
};
use crate::domain::{
    ANONYMOUS_USERNAME, DesignId, FeedbackRecord, FeedbackRecordId, UserId, VoteKind, Voter,
};

const FEEDBACK_PATH: &str = "rest/v1/feedback";
const NEWEST_FIRST: (&str, &str) = ("order", "created_at.desc");
const IS_VOTE: (&str, &str) = ("vote_type", "not.is.null");
const IS_COMMENT: (&str, &str) = ("comment_text", "not.is.null");

/// Feedback repository backed by the hosted `feedback` table.
#[derive(Clone)]
pub struct SupabaseFeedbackRepository {
    client: SupabaseClient,
}

impl SupabaseFeedbackRepository {
    /// Wrap a project client.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn call(
        &self,
        method: Method,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
        returning: bool,
    ) -> Result<Vec<u8>, FeedbackRepositoryError> {
        let url = self
            .client
            .endpoint(FEEDBACK_PATH, query)
            .map_err(map_http_failure)?;
        let mut request = self.client.request(method, url);
        if returning {
            request = request.header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.client.execute(request).await.map_err(map_http_failure)
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FeedbackRepositoryError> {
        let body = self.call(Method::GET, query, None, false).await?;
        decode(&body)
    }

    async fn count_affected(
        &self,
        method: Method,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<u64, FeedbackRepositoryError> {
        let body = self.call(method, query, body, true).await?;
        let rows: Vec<IgnoredAny> = decode(&body)?;
        Ok(rows.len() as u64)
    }
}

fn map_http_failure(failure: HttpFailure) -> FeedbackRepositoryError {
    match failure {
        HttpFailure::Transport { message } => FeedbackRepositoryError::connection(message),
        HttpFailure::Status { status: 409, message } => FeedbackRepositoryError::conflict(message),
        HttpFailure::Status { status, message } => {
            FeedbackRepositoryError::rejected(status, message)
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FeedbackRepositoryError> {
    serde_json::from_slice(body).map_err(|error| {
        FeedbackRepositoryError::decode(format!("invalid feedback JSON payload: {error}"))
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, FeedbackRepositoryError> {
    serde_json::to_value(value)
        .map_err(|error| FeedbackRepositoryError::query(format!("unserialisable row: {error}")))
}

fn into_records(rows: Vec<FeedbackRowDto>) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
    rows.into_iter()
        .map(FeedbackRowDto::into_domain)
        .collect::<Result<_, _>>()
        .map_err(FeedbackRepositoryError::decode)
}

#[async_trait]
impl FeedbackRepository for SupabaseFeedbackRepository {
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        into_records(self.rows(&[("select", "*"), NEWEST_FIRST]).await?)
    }

    async fn fetch_design(
        &self,
        design: &DesignId,
    ) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        let design_filter = eq(design.as_str());
        into_records(
            self.rows(&[("select", "*"), ("design_id", design_filter.as_str()), NEWEST_FIRST])
                .await?,
        )
    }

    async fn find_vote(
        &self,
        design: &DesignId,
        user: &UserId,
    ) -> Result<Option<StoredVote>, FeedbackRepositoryError> {
        let design_filter = eq(design.as_str());
        let user_filter = eq(user.as_ref());
        let rows: Vec<StoredVoteRowDto> = self
            .rows(&[
                ("select", "id,vote_type"),
                ("design_id", design_filter.as_str()),
                ("user_id", user_filter.as_str()),
                IS_VOTE,
                NEWEST_FIRST,
                ("limit", "1"),
            ])
            .await?;
        rows.into_iter()
            .next()
            .map(|row| {
                let kind = row
                    .vote_type
                    .parse::<VoteKind>()
                    .map_err(|error| FeedbackRepositoryError::decode(error.to_string()))?;
                Ok(StoredVote {
                    id: FeedbackRecordId(row.id),
                    kind,
                })
            })
            .transpose()
    }

    async fn insert_vote(&self, vote: &NewVote) -> Result<(), FeedbackRepositoryError> {
        let body = to_json(&NewVoteRowDto {
            design_id: vote.design.as_str(),
            user_id: vote.user.as_ref(),
            vote_type: vote.kind.as_str(),
            username: &vote.username,
        })?;
        self.call(Method::POST, &[], Some(body), false).await?;
        Ok(())
    }

    async fn update_vote(
        &self,
        id: FeedbackRecordId,
        kind: VoteKind,
        username: &str,
    ) -> Result<(), FeedbackRepositoryError> {
        let id_filter = eq(&id.0.to_string());
        let body = to_json(&VotePatchDto {
            vote_type: Some(kind.as_str()),
            username,
        })?;
        self.call(Method::PATCH, &[("id", id_filter.as_str())], Some(body), false)
            .await?;
        Ok(())
    }

    async fn delete_vote(&self, id: FeedbackRecordId) -> Result<(), FeedbackRepositoryError> {
        let id_filter = eq(&id.0.to_string());
        self.call(Method::DELETE, &[("id", id_filter.as_str())], None, false)
            .await?;
        Ok(())
    }

    async fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> Result<FeedbackRecord, FeedbackRepositoryError> {
        let body = to_json(&NewCommentRowDto {
            design_id: comment.design.as_str(),
            user_id: comment.user.as_ref(),
            comment_text: comment.text.as_ref(),
            username: &comment.username,
        })?;
        let response = self.call(Method::POST, &[], Some(body), true).await?;
        let rows: Vec<FeedbackRowDto> = decode(&response)?;
        into_records(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| FeedbackRepositoryError::decode("comment insert returned no row"))
    }

    async fn delete_comment(
        &self,
        selector: &CommentSelector,
    ) -> Result<u64, FeedbackRepositoryError> {
        match selector {
            CommentSelector::ById { id, user } => {
                let id_filter = eq(&id.0.to_string());
                let user_filter = eq(user.as_ref());
                self.count_affected(
                    Method::DELETE,
                    &[("id", id_filter.as_str()), ("user_id", user_filter.as_str()), IS_COMMENT],
                    None,
                )
                .await
            }
            CommentSelector::ByContent { design, user, text } => {
                let design_filter = eq(design.as_str());
                let user_filter = eq(user.as_ref());
                let text_filter = eq(text);
                self.count_affected(
                    Method::DELETE,
                    &[
                        ("design_id", design_filter.as_str()),
                        ("user_id", user_filter.as_str()),
                        ("comment_text", text_filter.as_str()),
                    ],
                    None,
                )
                .await
            }
        }
    }

    async fn voters(&self, design: &DesignId) -> Result<Vec<Voter>, FeedbackRepositoryError> {
        let design_filter = eq(design.as_str());
        let rows: Vec<VoterRowDto> = self
            .rows(&[
                ("select", "username,vote_type,created_at"),
                ("design_id", design_filter.as_str()),
                IS_VOTE,
                NEWEST_FIRST,
            ])
            .await?;
        rows.into_iter()
            .map(VoterRowDto::into_domain)
            .collect::<Result<_, _>>()
            .map_err(FeedbackRepositoryError::decode)
    }

    async fn claim_anonymous_votes(
        &self,
        user: &UserId,
        username: &str,
    ) -> Result<u64, FeedbackRepositoryError> {
        let user_filter = eq(user.as_ref());
        let anonymous_filter = eq(ANONYMOUS_USERNAME);
        let body = to_json(&VotePatchDto {
            vote_type: None,
            username,
        })?;
        self.count_affected(
            Method::PATCH,
            &[
                ("user_id", user_filter.as_str()),
                ("username", anonymous_filter.as_str()),
                IS_VOTE,
            ],
            Some(body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unique_violation(409, "Conflict")]
    #[case::unauthorised(401, "Rejected")]
    #[case::server_error(503, "Rejected")]
    fn statuses_map_to_port_errors(#[case] status: u16, #[case] expected: &str) {
        let error = map_http_failure(HttpFailure::Status {
            status,
            message: format!("status {status}"),
        });
        match expected {
            "Conflict" => assert!(matches!(error, FeedbackRepositoryError::Conflict { .. })),
            "Rejected" => assert!(
                matches!(error, FeedbackRepositoryError::Rejected { status: s, .. } if s == status)
            ),
            _ => panic!("unsupported test expectation: {expected}"),
        }
    }

    #[test]
    fn transport_failures_are_connection_errors() {
        let error = map_http_failure(HttpFailure::Transport {
            message: "dns".to_owned(),
        });
        assert_eq!(error, FeedbackRepositoryError::connection("dns"));
    }

    #[test]
    fn mutation_responses_are_counted() {
        let rows: Vec<IgnoredAny> =
            decode(br#"[{"id": 1}, {"id": 2}]"#).expect("array decodes");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn malformed_payloads_are_decode_errors() {
        let error = decode::<Vec<FeedbackRowDto>>(b"{").expect_err("invalid json");
        assert!(matches!(error, FeedbackRepositoryError::Decode { .. }));
    }
}
