//! Error types for the gallery-builder crate.
//!
//! This module defines semantic error enums for page configuration parsing and
//! the build pipeline, following the project's error handling conventions with
//! `thiserror`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when loading the page configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read gallery config at '{path}': {message}")]
    IoError {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The configuration JSON is malformed or contains unknown fields.
    #[error("invalid gallery config JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The theme name pattern is not a valid regular expression.
    #[error("invalid theme name pattern '{pattern}': {message}")]
    InvalidThemePattern {
        /// The rejected pattern.
        pattern: String,
        /// Description of the regex compilation failure.
        message: String,
    },

    /// A supported extension entry is blank or missing its leading dot.
    #[error("invalid supported extension '{value}': expected a value such as '.png'")]
    InvalidExtension {
        /// The rejected extension.
        value: String,
    },
}

/// Errors that abort a page build.
///
/// A missing assets directory is not an error; it is reported through
/// [`crate::BuildOutcome::AssetsMissing`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A directory inside the assets tree could not be listed.
    #[error("failed to scan '{path}': {message}")]
    ScanError {
        /// Directory that failed to list.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The output document could not be written.
    #[error("failed to write '{path}': {message}")]
    WriteError {
        /// Path that failed to write.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}
