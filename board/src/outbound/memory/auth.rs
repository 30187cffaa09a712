//! Settable auth session for demos and tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use url::Url;

use crate::domain::Identity;
use crate::domain::ports::{AuthSession, AuthSessionError};

/// Auth session whose identity is set directly.
#[derive(Debug, Default)]
pub struct InMemoryAuthSession {
    identity: Mutex<Option<Identity>>,
}

impl InMemoryAuthSession {
    /// Session starting with `identity`.
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity: Mutex::new(identity),
        }
    }

    /// Replace the signed-in identity.
    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = identity;
    }
}

#[async_trait]
impl AuthSession for InMemoryAuthSession {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthSessionError> {
        Ok(self
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &Url) -> Result<Url, AuthSessionError> {
        let mut url = redirect_to.clone();
        url.query_pairs_mut().append_pair("provider", provider);
        Ok(url)
    }

    async fn sign_out(&self) -> Result<(), AuthSessionError> {
        self.set_identity(None);
        Ok(())
    }
}
