//! Port for the hosted auth session.
//!
//! Sign-in itself is an OAuth redirect owned by the provider; the board only
//! needs the redirect URL, the resolved identity and sign-out.

use async_trait::async_trait;
use url::Url;

use crate::domain::Identity;

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth session adapters.
    pub enum AuthSessionError {
        /// The auth service could not be reached.
        Connection { message: String } =>
            "auth service connection failed: {message}",
        /// The auth service refused the session.
        Rejected { message: String } =>
            "auth service rejected the session: {message}",
        /// The auth service answered with an unreadable payload.
        Decode { message: String } =>
            "auth service returned an unreadable payload: {message}",
    }
}

/// Port exposing the current reviewer session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// Identity of the signed-in reviewer; `None` when signed out.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthSessionError>;

    /// URL that starts the OAuth flow with `provider`, returning to
    /// `redirect_to` afterwards.
    fn sign_in_url(&self, provider: &str, redirect_to: &Url) -> Result<Url, AuthSessionError>;

    /// End the session.
    async fn sign_out(&self) -> Result<(), AuthSessionError>;
}

/// Fixture implementation that is always signed out.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthSession;

#[async_trait]
impl AuthSession for FixtureAuthSession {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthSessionError> {
        Ok(None)
    }

    fn sign_in_url(&self, _provider: &str, redirect_to: &Url) -> Result<Url, AuthSessionError> {
        Ok(redirect_to.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthSessionError> {
        Ok(())
    }
}
