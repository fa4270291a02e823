use crate::error::ParseError;

use super::lexer::{Token, tokenize};

/// File name used for dispensers built from in-memory test input.
const TEST_FILE: &str = "Testfile";

/// Cursor over the tokens of one configuration segment.
///
/// Starts positioned before the first token; the first call to
/// [`next_token`](Self::next_token) loads the directive name.
#[derive(Debug, Clone)]
pub struct Dispenser {
    file: String,
    tokens: Vec<Token>,
    cursor: Option<usize>,
    nesting: usize,
}

impl Dispenser {
    pub fn new(file: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            file: file.into(),
            tokens,
            cursor: None,
            nesting: 0,
        }
    }

    /// Tokenize `input` and wrap the result.
    pub fn parse(file: impl Into<String>, input: &str) -> Result<Self, ParseError> {
        let file = file.into();
        let tokens = tokenize(input, &file)?;
        Ok(Self::new(file, tokens))
    }

    /// Dispenser over in-memory input, labelled `Testfile` in errors.
    pub fn for_test(input: &str) -> Result<Self, ParseError> {
        Self::parse(TEST_FILE, input)
    }

    fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor.map_or(0, |c| c + 1))
    }

    /// The following token if no line break separates it from the current one.
    fn peek_same_line(&self) -> Option<&Token> {
        if self.current().is_some_and(Token::ends_line) {
            return None;
        }
        self.peek()
    }

    /// Load the next token, wherever it is. Returns false at end of input.
    pub fn next_token(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Load the next token if it is on the same line and is not a block opening.
    pub fn next_arg(&mut self) -> bool {
        if self.peek_same_line().is_some_and(|t| !t.is_block_open()) {
            self.next_token()
        } else {
            false
        }
    }

    /// Step through a block that opens on the current line.
    ///
    /// Pass the value of [`nesting`](Self::nesting) taken before the loop. Each
    /// `true` leaves the cursor on the first token of a line inside the block;
    /// `false` means there is no block, the block has closed, or input ended
    /// inside the block (in which case `nesting()` is still above `initial`).
    pub fn next_block(&mut self, initial: usize) -> bool {
        if self.nesting > initial {
            if !self.next_token() {
                return false;
            }
            if self.current().is_some_and(Token::is_block_close) {
                self.nesting -= 1;
            } else if self.current().is_some_and(Token::is_block_open) {
                self.nesting += 1;
            }
            return self.nesting > initial;
        }

        if !self.peek_same_line().is_some_and(Token::is_block_open) {
            return false;
        }
        self.next_token();
        self.nesting += 1;
        if !self.next_token() {
            return false;
        }
        if self.current().is_some_and(Token::is_block_close) {
            self.nesting -= 1;
            return false;
        }
        true
    }

    /// Rewind to before the first token.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.nesting = 0;
    }

    /// Current block depth.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Text of the current token, or `""` before the first token.
    pub fn val(&self) -> &str {
        self.current().map_or("", |t| t.text.as_str())
    }

    /// Line of the current token, falling back to the last line seen.
    pub fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Error located at the current token.
    pub fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.clone(),
            line: self.line(),
            message: message.into(),
        }
    }

    /// Argument-count error for the current token.
    pub fn arg_err(&self) -> ParseError {
        if self.peek_same_line().is_some_and(Token::is_block_open) {
            return self.err(format!(
                "unexpected '{{' after '{}', expecting argument",
                self.val()
            ));
        }
        self.err(format!(
            "wrong argument count or unexpected line ending after '{}'",
            self.val()
        ))
    }
}
