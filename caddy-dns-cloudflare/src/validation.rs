//! Credential format checks.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CredentialError;

/// Cloudflare API tokens: 35 to 50 alphanumerics, dashes or underscores.
#[allow(clippy::expect_used)]
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{35,50}$").expect("token pattern is valid"));

/// Whether `token` has the shape of a Cloudflare API token.
pub fn is_valid_token(token: &str) -> bool {
    TOKEN_PATTERN.is_match(token)
}

/// Check a fully expanded API token.
///
/// The error echoes the value so that quoting or unexpanded placeholders are
/// easy to spot.
pub fn validate_api_token(token: &str) -> Result<(), CredentialError> {
    if is_valid_token(token) {
        Ok(())
    } else {
        Err(CredentialError::InvalidFormat {
            value: token.to_string(),
        })
    }
}
