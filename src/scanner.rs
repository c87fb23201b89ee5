use crate::error::{Position, TagError};

/// Cursor over one tag's text with character lookahead.
///
/// End of input is reported as `None` by every lookahead and consuming
/// method, so it can never be confused with a real character.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    // ── Cursor ──────────────────────────────────────────────────────

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Look `offset` characters past the cursor without consuming anything.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Consume and return the current character. At end of input the
    /// cursor stays put and `None` is returned.
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consume everything up to the end of input and return it verbatim.
    pub fn take_rest(&mut self) -> &'a str {
        let rest = self.remaining();
        self.pos = self.input.len();
        rest
    }

    /// Current position in the tag text.
    pub fn position(&self) -> Position {
        Position {
            column: self.input[..self.pos].chars().count(),
            offset: self.pos,
        }
    }

    fn lexical_error(&self, message: String, begin: Position) -> TagError {
        TagError::lexical(message, begin, self.position())
    }

    // ── Numbers ─────────────────────────────────────────────────────

    /// Consume an integer literal: an optional sign, then either a
    /// `0x`/`0o`/`0b` prefixed digit run or a decimal digit run.
    /// Returns the exact text consumed.
    pub fn next_number(&mut self) -> Result<&'a str, TagError> {
        let start = self.pos;
        let begin = self.position();

        if matches!(self.peek(), Some('+' | '-')) {
            self.pos += 1;
        }

        let radix_prefix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let radix = match radix_prefix {
            Some(radix) => {
                self.pos += 2;
                radix
            }
            None => 10,
        };

        let digit_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == digit_start {
            let message = if radix_prefix.is_some() {
                format!(
                    "Expected digits after '{}'",
                    &self.input[digit_start - 2..digit_start]
                )
            } else {
                "Expected a digit".to_string()
            };
            return Err(self.lexical_error(message, begin));
        }

        Ok(&self.input[start..self.pos])
    }

    // ── Strings ─────────────────────────────────────────────────────

    /// Consume a `"`-quoted or `` ` ``-quoted string and return its contents.
    ///
    /// Double-quoted strings understand exactly two escapes, `\"` and `\\`.
    /// Backtick strings are taken verbatim up to the closing backtick.
    pub fn next_string(&mut self) -> Result<String, TagError> {
        let begin = self.position();
        match self.peek() {
            Some('"') => {
                self.pos += 1;
                self.double_quoted_rest(begin)
            }
            Some('`') => {
                self.pos += 1;
                self.backtick_rest(begin)
            }
            _ => Err(self.lexical_error("Expected a quoted string".to_string(), begin)),
        }
    }

    fn double_quoted_rest(&mut self, begin: Position) -> Result<String, TagError> {
        let mut result = String::new();
        loop {
            match self.next_char() {
                None => {
                    return Err(self.lexical_error("Unterminated string".to_string(), begin));
                }
                Some('"') => return Ok(result),
                Some('\\') => {
                    let escape_begin = self.position();
                    match self.next_char() {
                        Some(ch @ ('"' | '\\')) => result.push(ch),
                        Some(ch) => {
                            return Err(self.lexical_error(
                                format!("Invalid escape sequence '\\{}'", ch),
                                escape_begin,
                            ));
                        }
                        None => {
                            return Err(
                                self.lexical_error("Unterminated string".to_string(), begin)
                            );
                        }
                    }
                }
                Some(ch) => result.push(ch),
            }
        }
    }

    fn backtick_rest(&mut self, begin: Position) -> Result<String, TagError> {
        let start = self.pos;
        match self.remaining().find('`') {
            Some(len) => {
                self.pos += len + 1;
                Ok(self.input[start..start + len].to_string())
            }
            None => {
                self.pos = self.input.len();
                Err(self.lexical_error("Unterminated backtick string".to_string(), begin))
            }
        }
    }

    // ── Identifiers ─────────────────────────────────────────────────

    /// Consume an identifier whose first character is a letter or `_` and
    /// whose remaining characters satisfy `is_interior`.
    pub fn next_ident(&mut self, is_interior: fn(char) -> bool) -> Result<&'a str, TagError> {
        let start = self.pos;
        match self.peek() {
            Some(ch) if is_ident_start(ch) => self.pos += ch.len_utf8(),
            Some(ch) => {
                let begin = self.position();
                return Err(TagError::syntax(
                    format!("Expected an identifier, found '{}'", ch),
                    begin,
                    begin,
                ));
            }
            None => {
                let begin = self.position();
                return Err(TagError::syntax(
                    "Expected an identifier".to_string(),
                    begin,
                    begin,
                ));
            }
        }
        while let Some(ch) = self.peek() {
            if is_interior(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        Ok(&self.input[start..self.pos])
    }
}

pub fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Interior characters of argument names and bare values.
pub fn is_ident_interior(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '-'
}

/// Interior characters of tag names, which may carry a `group:` prefix.
pub fn is_tag_name_interior(ch: char) -> bool {
    is_ident_interior(ch) || ch == ':'
}
