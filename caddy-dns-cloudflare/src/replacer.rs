//! Placeholder expansion.
//!
//! Placeholders look like `{env.CF_API_TOKEN}`. A backslash before a brace
//! makes it literal. Expansion happens at provisioning time, after the
//! Caddyfile has been parsed.

use std::collections::HashMap;

/// Text substitution applied to credential fields before validation.
///
/// `empty` is written in place of placeholders the implementation does not
/// recognize. Input without placeholders must come back unchanged.
pub trait Expand {
    fn replace_all(&self, input: &str, empty: &str) -> String;
}

/// Any `Fn(&str) -> String` works as a substitution function; it receives the
/// whole field and decides on its own what to do with unknown placeholders.
impl<F> Expand for F
where
    F: Fn(&str) -> String,
{
    fn replace_all(&self, input: &str, _empty: &str) -> String {
        self(input)
    }
}

/// Placeholder replacer with the global `env.*` and `file.*` families and
/// host-provided static values.
#[derive(Debug, Clone)]
pub struct Replacer {
    values: HashMap<String, String>,
    globals: bool,
}

impl Default for Replacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer {
    /// Replacer with the `env.*` and `file.*` families enabled.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            globals: true,
        }
    }

    /// Replacer that only knows values added with [`set`](Self::set).
    pub fn isolated() -> Self {
        Self {
            values: HashMap::new(),
            globals: false,
        }
    }

    /// Add or overwrite a static value. Static values shadow global families.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Resolve a placeholder key (without braces).
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }
        if !self.globals {
            return None;
        }
        if let Some(name) = key.strip_prefix("env.") {
            return std::env::var(name).ok();
        }
        if let Some(path) = key.strip_prefix("file.") {
            return read_file_value(path);
        }
        None
    }
}

/// File contents with a single trailing line ending removed.
fn read_file_value(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(mut body) => {
            if body.ends_with('\n') {
                body.pop();
                if body.ends_with('\r') {
                    body.pop();
                }
            }
            Some(body)
        }
        Err(e) => {
            log::warn!("Failed to read placeholder file {path}: {e}");
            None
        }
    }
}

impl Expand for Replacer {
    fn replace_all(&self, input: &str, empty: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = String::with_capacity(input.len());
        let mut copied = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b'{' | b'}')) => {
                    out.push_str(&input[copied..i]);
                    i += 1;
                    copied = i;
                    i += 1;
                }
                b'{' => {
                    let Some(len) = input[i + 1..].find('}') else {
                        break;
                    };
                    let key = &input[i + 1..i + 1 + len];
                    if key.is_empty() || key.contains('{') {
                        i += 1;
                        continue;
                    }
                    out.push_str(&input[copied..i]);
                    match self.get(key) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(empty),
                    }
                    i += len + 2;
                    copied = i;
                }
                _ => i += 1,
            }
        }

        out.push_str(&input[copied..]);
        out
    }
}
