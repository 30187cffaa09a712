//! PostgREST adapter for the `design_selections` table.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};

use super::client::{HttpFailure, RETURN_REPRESENTATION, SupabaseClient, eq};
use super::dto::SelectionRowDto;
use crate::domain::ports::{SelectionRepository, SelectionRepositoryError};
use crate::domain::{DesignId, Selection};

const SELECTIONS_PATH: &str = "rest/v1/design_selections";

/// Selection repository backed by the hosted `design_selections` table.
#[derive(Clone)]
pub struct SupabaseSelectionRepository {
    client: SupabaseClient,
}

impl SupabaseSelectionRepository {
    /// Wrap a project client.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn call(
        &self,
        method: Method,
        query: &[(&str, &str)],
        body: Option<&SelectionRowDto>,
        returning: bool,
    ) -> Result<Vec<u8>, SelectionRepositoryError> {
        let url = self
            .client
            .endpoint(SELECTIONS_PATH, query)
            .map_err(map_http_failure)?;
        let mut request = self.client.request(method, url);
        if returning {
            request = request.header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);
        }
        if let Some(row) = body {
            request = request.json(row);
        }
        self.client.execute(request).await.map_err(map_http_failure)
    }
}

fn map_http_failure(failure: HttpFailure) -> SelectionRepositoryError {
    match failure {
        HttpFailure::Transport { message } => SelectionRepositoryError::connection(message),
        status @ HttpFailure::Status { .. } => SelectionRepositoryError::query(status.message()),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SelectionRepositoryError> {
    serde_json::from_slice(body).map_err(|error| {
        SelectionRepositoryError::decode(format!("invalid selection JSON payload: {error}"))
    })
}

#[async_trait]
impl SelectionRepository for SupabaseSelectionRepository {
    async fn list(&self) -> Result<Vec<Selection>, SelectionRepositoryError> {
        let body = self
            .call(
                Method::GET,
                &[("select", "*"), ("order", "selected_at.desc")],
                None,
                false,
            )
            .await?;
        let rows: Vec<SelectionRowDto> = decode(&body)?;
        rows.into_iter()
            .map(SelectionRowDto::into_domain)
            .collect::<Result<_, _>>()
            .map_err(SelectionRepositoryError::decode)
    }

    async fn is_selected(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        let design_filter = eq(design.as_str());
        let body = self
            .call(
                Method::GET,
                &[
                    ("select", "design_id"),
                    ("design_id", design_filter.as_str()),
                    ("limit", "1"),
                ],
                None,
                false,
            )
            .await?;
        let rows: Vec<IgnoredAny> = decode(&body)?;
        Ok(!rows.is_empty())
    }

    async fn insert(&self, selection: &Selection) -> Result<(), SelectionRepositoryError> {
        let row = SelectionRowDto::from_domain(selection);
        self.call(Method::POST, &[], Some(&row), false).await?;
        Ok(())
    }

    async fn delete(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        let design_filter = eq(design.as_str());
        let body = self
            .call(
                Method::DELETE,
                &[("design_id", design_filter.as_str())],
                None,
                true,
            )
            .await?;
        let rows: Vec<IgnoredAny> = decode(&body)?;
        Ok(!rows.is_empty())
    }
}
