use std::fmt;

use thiserror::Error;

use crate::identifier::TagIdentifier;

/// A 0-based position in the tag text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-based column (character offset within the tag text)
    pub column: usize,
    /// 0-based absolute byte offset from the start of the tag text
    pub offset: usize,
}

/// Which layer of the parser rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal: unterminated string, bad escape, bad number.
    Lexical,
    /// Unexpected character, unterminated argument list or comment, empty input.
    Syntax,
    /// Well-formed tokens in an invalid combination (mixed or repeated
    /// positional arguments, chains nested too deep).
    Grammar,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "tag-lexical-error",
            ErrorKind::Syntax => "tag-syntax-error",
            ErrorKind::Grammar => "tag-grammar-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A tag parse error with span information (begin..end).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message} ({kind})", span_label(.begin, .end))]
pub struct TagError {
    pub kind: ErrorKind,
    pub message: String,
    /// Start of the offending region
    pub begin: Position,
    /// End of the offending region (exclusive)
    pub end: Position,
}

impl TagError {
    pub fn lexical(message: String, begin: Position, end: Position) -> Self {
        TagError {
            kind: ErrorKind::Lexical,
            message,
            begin,
            end,
        }
    }

    pub fn syntax(message: String, begin: Position, end: Position) -> Self {
        TagError {
            kind: ErrorKind::Syntax,
            message,
            begin,
            end,
        }
    }

    pub fn grammar(message: String, begin: Position, end: Position) -> Self {
        TagError {
            kind: ErrorKind::Grammar,
            message,
            begin,
            end,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

fn span_label(begin: &Position, end: &Position) -> String {
    if begin == end {
        format!("{}", begin.column)
    } else {
        format!("{}-{}", begin.column, end.column)
    }
}

/// Failure of a batch extract-and-parse: the first tag body that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("line {}: tag `{identifier}`: {source}", .line + 1)]
    Parse {
        /// 0-based index of the input line the tag came from
        line: usize,
        /// Byte offset of the tag body within that line
        body_offset: usize,
        identifier: TagIdentifier,
        #[source]
        source: TagError,
    },
}

impl ExtractError {
    /// The underlying tag parse error.
    pub fn tag_error(&self) -> &TagError {
        match self {
            ExtractError::Parse { source, .. } => source,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ExtractError::Parse { line, .. } => *line,
        }
    }
}
