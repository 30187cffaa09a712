//! Row DTOs for the hosted tables.
//!
//! Responses decode into these transport types first and are then mapped
//! into domain records in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DesignId, FeedbackBody, FeedbackRecord, FeedbackRecordId, Identity, Selection, UserId,
    VoteKind, Voter,
};

#[derive(Debug, Deserialize)]
pub(super) struct FeedbackRowDto {
    pub(super) id: i64,
    pub(super) design_id: String,
    pub(super) user_id: Option<String>,
    pub(super) vote_type: Option<String>,
    pub(super) comment_text: Option<String>,
    pub(super) username: Option<String>,
    pub(super) created_at: DateTime<Utc>,
}

impl FeedbackRowDto {
    pub(super) fn into_domain(self) -> Result<FeedbackRecord, String> {
        let design = DesignId::parse(&self.design_id)
            .map_err(|error| format!("row {}: {error}", self.id))?;
        let user = self
            .user_id
            .as_deref()
            .map(UserId::new)
            .transpose()
            .map_err(|error| format!("row {}: {error}", self.id))?;
        let body = match (self.vote_type, self.comment_text) {
            (Some(kind), None) => FeedbackBody::Vote(
                kind.parse::<VoteKind>()
                    .map_err(|error| format!("row {}: {error}", self.id))?,
            ),
            (None, Some(text)) => FeedbackBody::Comment(text),
            (Some(_), Some(_)) => {
                return Err(format!("row {} carries both a vote and a comment", self.id));
            }
            (None, None) => {
                return Err(format!("row {} carries neither a vote nor a comment", self.id));
            }
        };
        Ok(FeedbackRecord {
            id: FeedbackRecordId(self.id),
            design,
            user,
            body,
            username: self.username.unwrap_or_default(),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StoredVoteRowDto {
    pub(super) id: i64,
    pub(super) vote_type: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VoterRowDto {
    pub(super) username: Option<String>,
    pub(super) vote_type: String,
    pub(super) created_at: DateTime<Utc>,
}

impl VoterRowDto {
    pub(super) fn into_domain(self) -> Result<Voter, String> {
        Ok(Voter {
            username: self.username.unwrap_or_default(),
            kind: self.vote_type.parse().map_err(|error| format!("{error}"))?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct NewVoteRowDto<'a> {
    pub(super) design_id: &'a str,
    pub(super) user_id: &'a str,
    pub(super) vote_type: &'a str,
    pub(super) username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct VotePatchDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) vote_type: Option<&'a str>,
    pub(super) username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct NewCommentRowDto<'a> {
    pub(super) design_id: &'a str,
    pub(super) user_id: &'a str,
    pub(super) comment_text: &'a str,
    pub(super) username: &'a str,
}

#[derive(Debug, Deserialize, Serialize)]
pub(super) struct SelectionRowDto {
    pub(super) design_id: String,
    pub(super) selected_by: String,
    pub(super) selected_at: DateTime<Utc>,
}

impl SelectionRowDto {
    pub(super) fn from_domain(selection: &Selection) -> Self {
        Self {
            design_id: selection.design.as_str().to_owned(),
            selected_by: selection.selected_by.as_ref().to_owned(),
            selected_at: selection.selected_at,
        }
    }

    pub(super) fn into_domain(self) -> Result<Selection, String> {
        Ok(Selection {
            design: DesignId::parse(&self.design_id).map_err(|error| error.to_string())?,
            selected_by: UserId::new(&self.selected_by).map_err(|error| error.to_string())?,
            selected_at: self.selected_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    pub(super) id: String,
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) user_metadata: UserMetadataDto,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserMetadataDto {
    pub(super) full_name: Option<String>,
    pub(super) name: Option<String>,
    pub(super) avatar_url: Option<String>,
}

impl AuthUserDto {
    pub(super) fn into_domain(self) -> Result<Identity, String> {
        let user_id = UserId::new(&self.id).map_err(|error| error.to_string())?;
        Ok(Identity {
            user_id,
            email: self.email,
            full_name: self.user_metadata.full_name,
            name: self.user_metadata.name,
            avatar_url: self.user_metadata.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(vote_type: Option<&str>, comment_text: Option<&str>) -> FeedbackRowDto {
        serde_json::from_value(json!({
            "id": 4,
            "design_id": "theme1/a.png",
            "user_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "vote_type": vote_type,
            "comment_text": comment_text,
            "username": "Sam",
            "created_at": "2024-05-01T10:00:00+00:00",
        }))
        .expect("row decodes")
    }

    #[test]
    fn vote_rows_map_to_vote_bodies() {
        let record = row(Some("dislike"), None).into_domain().expect("valid row");
        assert_eq!(record.body, FeedbackBody::Vote(VoteKind::Dislike));
        assert_eq!(record.design.theme(), "theme1");
    }

    #[test]
    fn comment_rows_map_to_comment_bodies() {
        let record = row(None, Some("love it")).into_domain().expect("valid row");
        assert_eq!(record.body, FeedbackBody::Comment("love it".to_owned()));
    }

    #[test]
    fn rows_must_carry_exactly_one_payload() {
        assert!(row(Some("like"), Some("x")).into_domain().is_err());
        assert!(row(None, None).into_domain().is_err());
        assert!(row(Some("meh"), None).into_domain().is_err());
    }

    #[test]
    fn auth_user_metadata_is_optional() {
        let dto: AuthUserDto = serde_json::from_value(json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "email": "sam@example.com",
        }))
        .expect("user decodes");
        let identity = dto.into_domain().expect("valid user");
        assert_eq!(identity.email.as_deref(), Some("sam@example.com"));
        assert!(identity.full_name.is_none());
    }
}
