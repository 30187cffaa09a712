//! Domain-level error type.
//!
//! Errors here are transport agnostic. The UI controller turns them into
//! notices and the admin CLI into reports; neither needs to know which
//! adapter produced them.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure category of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input.
    InvalidRequest,
    /// No signed-in reviewer.
    Unauthorized,
    /// Signed in but not allowed.
    Forbidden,
    /// The row does not exist.
    NotFound,
    /// The write collides with stored rows.
    Conflict,
    /// The backend could not be reached.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "sign in required",
            Self::Forbidden => "not permitted",
            Self::NotFound => "not found",
            Self::Conflict => "conflicting write",
            Self::ServiceUnavailable => "backend unavailable",
            Self::InternalError => "internal error",
        }
    }

    /// Whether retrying the same call later may succeed.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::Conflict)
    }
}

/// Error returned by domain services.
///
/// The message is never blank: constructors substitute the code's fallback
/// text.
///
/// # Examples
/// ```
/// use board::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(DomainError::forbidden("  ").message(), "not permitted");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

impl DomainError {
    /// Error of `code`; a blank `message` falls back to a generic one.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            code.fallback_message().clone_into(&mut message);
        }
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context, such as the design or HTTP status involved.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured context.
    ///
    /// # Examples
    /// ```
    /// use board::domain::DomainError;
    /// use serde_json::json;
    ///
    /// let err = DomainError::conflict("vote exists")
    ///     .with_details(json!({ "designId": "theme1/a.png" }));
    /// assert_eq!(err.details().and_then(|d| d["designId"].as_str()), Some("theme1/a.png"));
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}
