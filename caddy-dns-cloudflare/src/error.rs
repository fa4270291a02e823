//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::Field;

/// Syntax error raised while reading Caddyfile tokens.
///
/// Carries the file name and line of the offending token so the host can
/// report it verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{file}:{line} - Error during parsing: {message}")]
pub struct ParseError {
    /// Source file name (`"Testfile"` for in-memory input).
    pub file: String,
    /// 1-based line of the token the error refers to.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

/// Credential presence and format errors, detected after the grammar is satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialError {
    /// No token of any kind was configured.
    #[error("missing API token(s)")]
    MissingTokens,

    /// One half of a token pair was configured without its companion.
    #[error("{provided} provided but no {missing} found")]
    MissingCompanion {
        /// Field that was set.
        provided: Field,
        /// Field that is required alongside it.
        missing: Field,
    },

    /// A field the active schema does not accept was set.
    #[error("{field} is not accepted by the configured schema")]
    UnsupportedField {
        /// The offending field.
        field: Field,
    },

    /// The fully expanded API token does not look like a Cloudflare token.
    ///
    /// This is the only error that echoes a credential value.
    #[error(
        "API token '{value}' appears invalid; ensure it's correctly entered and not wrapped in braces nor quotes"
    )]
    InvalidFormat {
        /// The offending value after placeholder expansion.
        value: String,
    },
}

/// Top-level configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ConfigError {
    /// Caddyfile syntax error
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Credential validation error
    #[error("{0}")]
    Credentials(#[from] CredentialError),

    /// No module registered under this ID
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// A module with this ID is already registered
    #[error("module already registered: {0}")]
    DuplicateModule(String),

    /// JSON module config could not be decoded
    #[error("invalid JSON config for {module}: {detail}")]
    InvalidJson { module: String, detail: String },
}

/// Convenience type alias for `Result<T, ConfigError>`.
pub type Result<T> = std::result::Result<T, ConfigError>;
