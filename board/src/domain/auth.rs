//! Credentials presented to the hosted backend.
//!
//! Keep raw configuration strings outside the adapters by validating them
//! here first. Secrets are zeroed on drop and never appear in `Debug` output.

use std::fmt;

use zeroize::Zeroizing;

/// Error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// The project API key was blank.
    EmptyApiKey,
    /// An access token was supplied but blank.
    EmptyAccessToken,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyApiKey => write!(f, "api key must not be empty"),
            Self::EmptyAccessToken => write!(f, "access token must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Project API key plus an optional user access token.
///
/// Requests carry the API key in the `apikey` header and the bearer token
/// (the access token when signed in, else the API key) in `Authorization`.
///
/// # Examples
/// ```
/// use board::domain::ApiCredentials;
///
/// let creds = ApiCredentials::try_new("anon-key", Some("jwt")).expect("valid");
/// assert_eq!(creds.api_key(), "anon-key");
/// assert_eq!(creds.bearer(), "jwt");
/// assert!(!format!("{creds:?}").contains("anon-key"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    api_key: Zeroizing<String>,
    access_token: Option<Zeroizing<String>>,
}

impl ApiCredentials {
    /// Validate raw credential strings.
    pub fn try_new(
        api_key: &str,
        access_token: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(CredentialsValidationError::EmptyApiKey);
        }
        let token = match access_token {
            Some(raw) if raw.trim().is_empty() => {
                return Err(CredentialsValidationError::EmptyAccessToken);
            }
            Some(raw) => Some(Zeroizing::new(raw.trim().to_owned())),
            None => None,
        };
        Ok(Self {
            api_key: Zeroizing::new(key.to_owned()),
            access_token: token,
        })
    }

    /// Project API key.
    pub fn api_key(&self) -> &str {
        self.api_key.as_str()
    }

    /// User access token, when signed in.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|token| token.as_str())
    }

    /// Token for the `Authorization: Bearer` header.
    pub fn bearer(&self) -> &str {
        self.access_token().unwrap_or_else(|| self.api_key())
    }

    /// Copy of these credentials carrying a different access token.
    pub fn with_access_token(&self, token: Option<&str>) -> Result<Self, CredentialsValidationError> {
        Self::try_new(self.api_key(), token)
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
