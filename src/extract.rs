//! Finding marker-prefixed lines in comment text and filing them by tag
//! identifier.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::ast::TypedTag;
use crate::error::ExtractError;
use crate::identifier::TagIdentifier;
use crate::options::ParseOptions;
use crate::parser;

/// Raw tag bodies grouped by identifier, in input order.
pub type Extracted = BTreeMap<TagIdentifier, Vec<String>>;

/// Parsed tags grouped by identifier, in input order.
pub type ParsedTags = BTreeMap<TagIdentifier, Vec<TypedTag>>;

/// One accepted tag line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TagLine {
    /// 0-based index of the input line
    line: usize,
    /// Byte offset of `body` within the untrimmed input line
    body_offset: usize,
    identifier: TagIdentifier,
    body: String,
}

/// Collect the unparsed body of every line starting with `marker`, keyed
/// by its identifier. When `group` is given, only identifiers in that
/// group are kept. Bodies have the marker and any `group:` prefix removed.
pub fn extract<I, S>(marker: &str, group: Option<&str>, lines: I) -> Extracted
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Extracted::new();
    for tag_line in tag_lines(marker, group, lines) {
        out.entry(tag_line.identifier)
            .or_default()
            .push(tag_line.body);
    }
    out
}

/// Like [`extract`], then parse every body with default options.
pub fn extract_and_parse<I, S>(
    marker: &str,
    group: Option<&str>,
    lines: I,
) -> Result<ParsedTags, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extract_and_parse_with(marker, group, lines, &ParseOptions::default())
}

/// Like [`extract`], then parse every body. The first body that fails to
/// parse aborts the whole call.
pub fn extract_and_parse_with<I, S>(
    marker: &str,
    group: Option<&str>,
    lines: I,
    options: &ParseOptions,
) -> Result<ParsedTags, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = ParsedTags::new();
    for tag_line in tag_lines(marker, group, lines) {
        let tag = parser::parse_with(&tag_line.body, options).map_err(|source| {
            ExtractError::Parse {
                line: tag_line.line,
                body_offset: tag_line.body_offset,
                identifier: tag_line.identifier.clone(),
                source,
            }
        })?;
        out.entry(tag_line.identifier).or_default().push(tag);
    }
    Ok(out)
}

fn tag_lines<I, S>(marker: &str, group: Option<&str>, lines: I) -> Vec<TagLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scanned = 0;
    let mut found = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        scanned += 1;
        let raw = line.as_ref();
        if let Some(tag_line) = tag_line(marker, group, index, raw) {
            found.push(tag_line);
        }
    }
    debug!(
        "extracted {} tag line(s) with marker '{}' from {} line(s)",
        found.len(),
        marker,
        scanned
    );
    found
}

fn tag_line(marker: &str, group: Option<&str>, index: usize, raw: &str) -> Option<TagLine> {
    let leading = raw.len() - raw.trim_start().len();
    let line = raw.trim();
    let rest = line.strip_prefix(marker)?;

    let boundary = rest.find(['(', '=']).unwrap_or(rest.len());
    let identifier = TagIdentifier::parse(&rest[..boundary]);

    if let Some(group) = group {
        if identifier.group() != group {
            trace!(
                "line {}: skipping '{}' outside group '{}'",
                index + 1,
                identifier,
                group
            );
            return None;
        }
    }

    let prefix_len = if identifier.has_group() {
        identifier.group().len() + 1
    } else {
        0
    };
    let body = &rest[prefix_len..];
    trace!("line {}: found tag '{}'", index + 1, identifier);

    Some(TagLine {
        line: index,
        body_offset: leading + marker.len() + prefix_len,
        identifier,
        body: body.to_string(),
    })
}
