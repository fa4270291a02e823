//! Caddyfile tokens for the dispenser, built on [`caddyfile_rs::tokenize`].
//!
//! The raw stream is reduced to the tokens a directive reads: comments are
//! dropped, line breaks become a flag on the preceding token, and a `{` glued
//! to the following word (`{env.CF_API_TOKEN}`) is rejoined into one word.

use caddyfile_rs::{Span, TokenKind};

use crate::error::ParseError;

/// A single Caddyfile token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quotes and escapes removed.
    pub text: String,
    /// 1-based line the token starts on.
    pub line: usize,
    pub kind: TokenKind,
    pub(crate) ends_line: bool,
}

impl Token {
    /// Unquoted `{`.
    pub fn is_block_open(&self) -> bool {
        self.kind == TokenKind::OpenBrace
    }

    /// Unquoted `}`.
    pub fn is_block_close(&self) -> bool {
        self.kind == TokenKind::CloseBrace
    }

    /// Whether the token was written in quotes, backticks or as a heredoc.
    pub fn is_quoted(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::QuotedString | TokenKind::BacktickString | TokenKind::Heredoc { .. }
        )
    }

    /// Whether a line break follows this token.
    pub fn ends_line(&self) -> bool {
        self.ends_line
    }
}

/// Split Caddyfile text into tokens.
///
/// `file` is only used to label errors.
pub fn tokenize(input: &str, file: &str) -> Result<Vec<Token>, ParseError> {
    let raw = caddyfile_rs::tokenize(input).map_err(|e| ParseError {
        file: file.to_string(),
        line: e.span.line,
        message: e.kind.to_string(),
    })?;
    let lines = line_starts(input);

    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut open_brace: Option<Span> = None;

    for tok in raw {
        match tok.kind {
            TokenKind::Comment => continue,
            TokenKind::Newline => {
                if let Some(last) = tokens.last_mut() {
                    last.ends_line = true;
                }
                open_brace = None;
                continue;
            }
            _ => {}
        }

        if tok.kind == TokenKind::Word
            && open_brace.take().is_some_and(|open| is_glued(&open, &tok.span))
            && let Some(brace) = tokens.last_mut()
        {
            brace.text.push_str(&tok.text);
            brace.kind = TokenKind::Word;
            continue;
        }

        open_brace = (tok.kind == TokenKind::OpenBrace).then(|| tok.span.clone());
        let text = if tok.kind == TokenKind::QuotedString {
            byte_offset(&lines, &tok.span)
                .and_then(|at| unquote(input, at))
                .unwrap_or(tok.text)
        } else {
            tok.text
        };
        let ends_line = matches!(tok.kind, TokenKind::Heredoc { .. });
        tokens.push(Token {
            text,
            line: tok.span.line,
            kind: tok.kind,
            ends_line,
        });
    }

    Ok(tokens)
}

/// Whether `next` starts right after a one-byte token at `prev`.
fn is_glued(prev: &Span, next: &Span) -> bool {
    prev.line == next.line && prev.column + 1 == next.column
}

/// Byte offset of the first character of each line. Columns from the lexer
/// count bytes and skip a leading BOM.
fn line_starts(input: &str) -> Vec<usize> {
    let first = if input.starts_with('\u{feff}') { 3 } else { 0 };
    std::iter::once(first)
        .chain(input.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn byte_offset(lines: &[usize], span: &Span) -> Option<usize> {
    let start = lines.get(span.line.checked_sub(1)?)?;
    Some(start + span.column.checked_sub(1)?)
}

/// Read the double-quoted token opening at byte `at`.
///
/// A backslash is only dropped in front of `"`; every other backslash is
/// kept, so `"a\\b"` reads as `a\\b`.
fn unquote(input: &str, at: usize) -> Option<String> {
    let body = input.get(at..)?.strip_prefix('"')?;
    let mut out = String::new();
    let mut escaped = false;
    for c in body.chars() {
        if escaped {
            if c != '"' {
                out.push('\\');
            }
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(out);
        } else {
            out.push(c);
        }
    }
    None
}
