//! Extraction and parsing of `+tag` annotations embedded in comment text.
//!
//! Comment lines such as
//!
//! ```text
//! +k8s:required
//! +k8s:format=k8s-long-name
//! +k8s:ifEnabled(feature: "Foo", since: 0x10)=+k8s:optional
//! ```
//!
//! are found by [`extract`], which files the unparsed tag bodies under
//! their `group:name` [`TagIdentifier`], and turned into [`TypedTag`]s by
//! [`parse`] (or both at once by [`extract_and_parse`]).

pub mod ast;
pub mod error;
pub mod extract;
pub mod identifier;
pub mod json;
pub mod log_init;
pub mod options;
pub mod parser;
pub mod scanner;

pub use ast::{Arg, TagValue, TypedTag, TypedValue, ValueKind};
pub use error::{ErrorKind, ExtractError, Position, TagError};
pub use extract::{extract, extract_and_parse, extract_and_parse_with, Extracted, ParsedTags};
pub use identifier::TagIdentifier;
pub use options::ParseOptions;
pub use parser::{parse, parse_all, parse_all_with, parse_with};

#[cfg(test)]
mod tests;
