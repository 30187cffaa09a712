//! Auth session adapter for the hosted auth service.
//!
//! The OAuth redirect itself happens in the browser; this adapter only builds
//! the authorize URL, resolves the identity behind the configured access
//! token and revokes it on sign-out.

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;
use url::Url;

use super::client::{HttpFailure, SupabaseClient};
use super::dto::AuthUserDto;
use crate::domain::Identity;
use crate::domain::ports::{AuthSession, AuthSessionError};

const USER_PATH: &str = "auth/v1/user";
const LOGOUT_PATH: &str = "auth/v1/logout";
const AUTHORIZE_PATH: &str = "auth/v1/authorize";

/// Auth session backed by the hosted auth endpoints.
#[derive(Clone)]
pub struct SupabaseAuthSession {
    client: SupabaseClient,
}

impl SupabaseAuthSession {
    /// Wrap a project client; its access token identifies the session.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn map_http_failure(failure: HttpFailure) -> AuthSessionError {
    match failure {
        HttpFailure::Transport { message } => AuthSessionError::connection(message),
        status @ HttpFailure::Status { .. } => AuthSessionError::rejected(status.message()),
    }
}

#[async_trait]
impl AuthSession for SupabaseAuthSession {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthSessionError> {
        if self.client.credentials().access_token().is_none() {
            return Ok(None);
        }
        let url = self
            .client
            .endpoint(USER_PATH, &[])
            .map_err(map_http_failure)?;
        let body = match self
            .client
            .execute(self.client.request(Method::GET, url))
            .await
        {
            Ok(body) => body,
            Err(HttpFailure::Status { status: 401, .. }) => {
                debug!("access token no longer valid; treating session as signed out");
                return Ok(None);
            }
            Err(failure) => return Err(map_http_failure(failure)),
        };
        let user: AuthUserDto = serde_json::from_slice(&body).map_err(|error| {
            AuthSessionError::decode(format!("invalid user JSON payload: {error}"))
        })?;
        user.into_domain().map(Some).map_err(AuthSessionError::decode)
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &Url) -> Result<Url, AuthSessionError> {
        self.client
            .endpoint(
                AUTHORIZE_PATH,
                &[("provider", provider), ("redirect_to", redirect_to.as_str())],
            )
            .map_err(map_http_failure)
    }

    async fn sign_out(&self) -> Result<(), AuthSessionError> {
        if self.client.credentials().access_token().is_none() {
            return Ok(());
        }
        let url = self
            .client
            .endpoint(LOGOUT_PATH, &[])
            .map_err(map_http_failure)?;
        self.client
            .execute(self.client.request(Method::POST, url))
            .await
            .map_err(map_http_failure)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ApiCredentials;

    fn session(token: Option<&str>) -> SupabaseAuthSession {
        let client = SupabaseClient::new(
            Url::parse("https://project.example.co/").expect("valid url"),
            ApiCredentials::try_new("anon", token).expect("valid credentials"),
            Duration::from_secs(5),
        )
        .expect("client builds");
        SupabaseAuthSession::new(client)
    }

    #[test]
    fn sign_in_url_targets_the_provider() {
        let redirect = Url::parse("https://board.example.com/").expect("valid url");
        let url = session(None)
            .sign_in_url("google", &redirect)
            .expect("url builds");

        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("provider".to_owned(), "google".to_owned()),
                ("redirect_to".to_owned(), "https://board.example.com/".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn without_a_token_the_session_is_signed_out() {
        let auth = session(None);
        assert_eq!(auth.current_identity().await.expect("no request made"), None);
        auth.sign_out().await.expect("nothing to revoke");
    }
}
