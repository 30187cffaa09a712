//! Comment input validation.

use std::fmt;

/// Validation errors returned by [`CommentText::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    /// Nothing but whitespace was entered.
    Empty,
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "comment must not be empty"),
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Trimmed, non-empty comment text.
///
/// # Examples
/// ```
/// use board::domain::CommentText;
///
/// let text = CommentText::new("  looks great \n").expect("valid comment");
/// assert_eq!(text.as_ref(), "looks great");
/// assert!(CommentText::new(" \t ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentText(String);

impl CommentText {
    /// Trim and validate raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommentValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}
