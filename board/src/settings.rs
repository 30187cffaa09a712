//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `REVIEW_BOARD_*` environment variables or a config file.
//! Only commands that reach the hosted backend require the URL and key.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{AdminPolicy, ApiCredentials, CredentialsValidationError};
use crate::outbound::supabase::SupabaseClient;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATS_REFRESH_DELAY_MS: u64 = 100;

/// Errors raised while turning settings into live collaborators.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No project URL configured.
    #[error("REVIEW_BOARD_SUPABASE_URL is not set")]
    MissingUrl,
    /// The project URL does not parse.
    #[error("invalid project URL {value}: {message}")]
    InvalidUrl {
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// No API key configured.
    #[error("REVIEW_BOARD_ANON_KEY is not set")]
    MissingApiKey,
    /// The key or token is blank.
    #[error(transparent)]
    InvalidCredentials(#[from] CredentialsValidationError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Settings for the board and the admin CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REVIEW_BOARD")]
pub struct BoardSettings {
    /// Project base URL, for example `https://abc.supabase.co`.
    pub supabase_url: Option<String>,
    /// Public (anon) API key.
    pub anon_key: Option<String>,
    /// User access token; requests run as that user when present.
    pub access_token: Option<String>,
    /// Comma separated admin emails.
    pub admin_emails: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Delay before theme statistics are recomputed after a vote.
    pub stats_refresh_delay_ms: Option<u64>,
}

impl BoardSettings {
    /// Project base URL with a trailing slash so relative paths join below it.
    pub fn supabase_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .supabase_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::MissingUrl)?;
        let normalised = if raw.ends_with('/') {
            raw.to_owned()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalised).map_err(|error| SettingsError::InvalidUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// API key plus optional access token.
    pub fn credentials(&self) -> Result<ApiCredentials, SettingsError> {
        let key = self.anon_key.as_deref().ok_or(SettingsError::MissingApiKey)?;
        Ok(ApiCredentials::try_new(key, self.access_token.as_deref())?)
    }

    /// Who may curate selections; empty when unset.
    pub fn admin_policy(&self) -> AdminPolicy {
        self.admin_emails
            .as_deref()
            .map(AdminPolicy::from_comma_separated)
            .unwrap_or_default()
    }

    /// Per-request timeout, at least one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Delay before theme statistics are recomputed.
    pub fn stats_refresh_delay(&self) -> Duration {
        Duration::from_millis(
            self.stats_refresh_delay_ms
                .unwrap_or(DEFAULT_STATS_REFRESH_DELAY_MS),
        )
    }

    /// Client for the configured project.
    pub fn connect(&self) -> Result<SupabaseClient, SettingsError> {
        Ok(SupabaseClient::new(
            self.supabase_url()?,
            self.credentials()?,
            self.request_timeout(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "REVIEW_BOARD_SUPABASE_URL",
        "REVIEW_BOARD_ANON_KEY",
        "REVIEW_BOARD_ACCESS_TOKEN",
        "REVIEW_BOARD_ADMIN_EMAILS",
        "REVIEW_BOARD_REQUEST_TIMEOUT_SECS",
        "REVIEW_BOARD_STATS_REFRESH_DELAY_MS",
    ];

    fn blank() -> BoardSettings {
        BoardSettings {
            supabase_url: None,
            anon_key: None,
            access_token: None,
            admin_emails: None,
            request_timeout_secs: None,
            stats_refresh_delay_ms: None,
        }
    }

    fn load_from_empty_args() -> BoardSettings {
        BoardSettings::load_from_iter([OsString::from("review-admin")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.stats_refresh_delay(), Duration::from_millis(100));
        assert!(settings.admin_policy().is_empty());
        assert!(matches!(settings.supabase_url(), Err(SettingsError::MissingUrl)));
        assert!(matches!(settings.credentials(), Err(SettingsError::MissingApiKey)));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("REVIEW_BOARD_SUPABASE_URL", Some("https://abc.example.co".to_owned())),
            ("REVIEW_BOARD_ANON_KEY", Some("anon".to_owned())),
            ("REVIEW_BOARD_ACCESS_TOKEN", None::<String>),
            ("REVIEW_BOARD_ADMIN_EMAILS", Some("a@x.io, b@x.io".to_owned())),
            ("REVIEW_BOARD_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("REVIEW_BOARD_STATS_REFRESH_DELAY_MS", Some("0".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.supabase_url().expect("url").as_str(),
            "https://abc.example.co/"
        );
        assert_eq!(settings.credentials().expect("key").bearer(), "anon");
        assert_eq!(settings.admin_policy().len(), 2);
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.stats_refresh_delay(), Duration::ZERO);
    }

    #[rstest]
    #[case("not a url")]
    #[case("   ")]
    fn bad_urls_are_reported(#[case] raw: &str) {
        let settings = BoardSettings {
            supabase_url: Some(raw.to_owned()),
            ..blank()
        };
        assert!(settings.supabase_url().is_err());
    }

    #[rstest]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = BoardSettings {
            request_timeout_secs: Some(0),
            ..blank()
        };
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }
}
