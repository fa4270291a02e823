//! Log sanitization utilities
//!
//! Keeps API tokens out of debug logs and `Debug` output. Only the token
//! format error is allowed to show a full value.

/// Number of leading characters kept visible.
const VISIBLE_PREFIX: usize = 4;

/// Tokens at or below this length are fully hidden.
const MIN_MASKED_LEN: usize = 8;

/// Mask a credential for safe logging.
///
/// Returns an empty string for an empty input, `***` for short values,
/// otherwise the first few characters followed by the total length.
pub fn mask_token(s: &str) -> String {
    let len = s.chars().count();
    if len == 0 {
        String::new()
    } else if len <= MIN_MASKED_LEN {
        "***".to_string()
    } else {
        let prefix: String = s.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}*** [{len} chars]")
    }
}
