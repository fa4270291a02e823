//! Caddyfile tokens and the dispenser used to walk them.
//!
//! Lexing is done by `caddyfile_rs`; this module narrows its token stream
//! to what provider directives need: words, quoted values and
//! brace-delimited blocks.

mod dispenser;
mod lexer;

use std::borrow::Cow;

pub use caddyfile_rs::TokenKind;
pub use dispenser::Dispenser;
pub use lexer::{Token, tokenize};

/// Quote a value so that it lexes back to exactly one token with the same text.
///
/// Values that are already safe as bare words are returned unchanged. Inside
/// double quotes only `"` is escaped, so values holding a backslash are
/// wrapped in backticks instead. A value holding a backtick as well as a
/// backslash before a quote or at its end cannot be written back.
pub fn quote(value: &str) -> Cow<'_, str> {
    if is_bare_word(value) {
        return Cow::Borrowed(value);
    }
    if value.contains('\\') && !value.contains('`') {
        return Cow::Owned(format!("`{value}`"));
    }
    Cow::Owned(format!("\"{}\"", value.replace('"', "\\\"")))
}

fn is_bare_word(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '`' | '\\'))
        || value.contains("{$")
        || value.starts_with("<<")
    {
        return false;
    }
    match first {
        '#' | '}' => false,
        // `{key}` only stays one word when the key follows the brace directly
        '{' => chars
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')),
        _ => true,
    }
}
