//! Shared HTTP plumbing for the hosted project.
//!
//! Owns the reqwest client, the project base URL and the credentials sent on
//! every request. Port adapters build requests through it and map
//! [`HttpFailure`] into their own error types.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::info;
use url::Url;

use super::fingerprint::key_fingerprint;
use crate::domain::ApiCredentials;

/// PostgREST header asking for the affected rows in the response body.
pub(super) const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Connection to one hosted project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    credentials: ApiCredentials,
}

/// Failure of one HTTP exchange before port-specific mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum HttpFailure {
    /// The request never produced a response.
    Transport { message: String },
    /// The project answered with a non-success status.
    Status { status: u16, message: String },
}

impl HttpFailure {
    pub(super) fn message(self) -> String {
        match self {
            Self::Transport { message } | Self::Status { message, .. } => message,
        }
    }
}

impl SupabaseClient {
    /// Build a client for the project at `base` with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        info!(
            project = %base,
            key_fingerprint = %key_fingerprint(credentials.api_key()),
            signed_in = credentials.access_token().is_some(),
            "hosted backend client ready"
        );
        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    /// Project base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Credentials sent with each request.
    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    /// Absolute URL for `path` with `query` appended in order.
    pub(super) fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, HttpFailure> {
        let mut url = self.base.join(path).map_err(|error| HttpFailure::Transport {
            message: format!("invalid endpoint {path}: {error}"),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Request carrying the project key and bearer token.
    pub(super) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.credentials.api_key())
            .bearer_auth(self.credentials.bearer())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send `request` and return the body of a successful response.
    pub(super) async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, HttpFailure> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

/// PostgREST equality filter value.
pub(super) fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn map_transport_error(error: reqwest::Error) -> HttpFailure {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    HttpFailure::Transport { message }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> HttpFailure {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    HttpFailure::Status {
        status: status.as_u16(),
        message,
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network helpers.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> SupabaseClient {
        SupabaseClient::new(
            Url::parse("https://project.example.co/").expect("valid url"),
            ApiCredentials::try_new("anon", None).expect("valid key"),
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[rstest]
    fn endpoint_encodes_filters(client: SupabaseClient) {
        let url = client
            .endpoint("rest/v1/feedback", &[("design_id", eq("theme 1/a.png").as_str())])
            .expect("endpoint");
        assert_eq!(url.path(), "/rest/v1/feedback");
        assert_eq!(url.query(), Some("design_id=eq.theme+1%2Fa.png"));
    }

    #[rstest]
    fn status_errors_carry_a_compact_preview() {
        let failure = map_status_error(StatusCode::CONFLICT, b"{\n  \"code\": \"23505\"\n}");
        assert_eq!(
            failure,
            HttpFailure::Status {
                status: 409,
                message: "status 409: { \"code\": \"23505\" }".to_owned(),
            }
        );
    }

    #[rstest]
    fn empty_bodies_report_the_status_only() {
        assert_eq!(
            map_status_error(StatusCode::BAD_GATEWAY, b"").message(),
            "status 502"
        );
    }

    #[rstest]
    fn long_previews_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
