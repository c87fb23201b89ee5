use serde_json::{json, Map, Value};

use crate::ast::*;
use crate::error::{ExtractError, Position};
use crate::extract::{Extracted, ParsedTags};

/// JSON formatting style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonStyle {
    /// Compact: no whitespace between tokens.
    Compact,
    /// Pretty: 2-space indented, one entry per line.
    Pretty,
}

fn render(value: &Value, style: JsonStyle) -> String {
    match style {
        JsonStyle::Compact => value.to_string(),
        // Serializing a `Value` to a string cannot fail.
        JsonStyle::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

pub fn typed_value_to_value(value: &TypedValue) -> Value {
    match value {
        TypedValue::String(s) => json!({ "type": "string", "value": s }),
        TypedValue::Int { literal, value } => {
            json!({ "type": "int", "value": value, "literal": literal })
        }
        TypedValue::Bool(b) => json!({ "type": "bool", "value": b }),
    }
}

fn arg_to_value(arg: &Arg) -> Value {
    let mut value = typed_value_to_value(&arg.value);
    if !arg.is_positional() {
        if let Value::Object(map) = &mut value {
            map.insert("name".to_string(), Value::String(arg.name.clone()));
        }
    }
    value
}

/// `{"name", "args", "valueType", "value"?}`; `value` is absent when the
/// tag has no `=` part.
pub fn tag_to_value(tag: &TypedTag) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::String(tag.name.clone()));
    map.insert(
        "args".to_string(),
        Value::Array(tag.args.iter().map(arg_to_value).collect()),
    );
    map.insert(
        "valueType".to_string(),
        Value::String(tag.value_kind().as_str().to_string()),
    );
    match &tag.value {
        None => {}
        Some(TagValue::Value(v)) => {
            map.insert("value".to_string(), typed_value_to_value(v));
        }
        Some(TagValue::Tag(t)) => {
            map.insert("value".to_string(), tag_to_value(t));
        }
        Some(TagValue::Raw(raw)) => {
            map.insert("value".to_string(), Value::String(raw.clone()));
        }
    }
    Value::Object(map)
}

/// Serialize a tag to a compact JSON string (no whitespace).
pub fn to_json(tag: &TypedTag) -> String {
    render(&tag_to_value(tag), JsonStyle::Compact)
}

/// Serialize a tag to a pretty-printed JSON string (2-space indent).
pub fn to_json_pretty(tag: &TypedTag) -> String {
    render(&tag_to_value(tag), JsonStyle::Pretty)
}

/// Raw extraction results keyed by the identifier's text form.
pub fn extracted_to_value(extracted: &Extracted) -> Value {
    let map: Map<String, Value> = extracted
        .iter()
        .map(|(id, bodies)| (id.to_string(), json!(bodies)))
        .collect();
    Value::Object(map)
}

/// Parsed tags keyed by the identifier's text form.
pub fn parsed_to_value(parsed: &ParsedTags) -> Value {
    let map: Map<String, Value> = parsed
        .iter()
        .map(|(id, tags)| {
            (
                id.to_string(),
                Value::Array(tags.iter().map(tag_to_value).collect()),
            )
        })
        .collect();
    Value::Object(map)
}

pub fn extracted_to_json(extracted: &Extracted, style: JsonStyle) -> String {
    render(&extracted_to_value(extracted), style)
}

pub fn parsed_to_json(parsed: &ParsedTags, style: JsonStyle) -> String {
    render(&parsed_to_value(parsed), style)
}

fn position_to_value(pos: &Position) -> Value {
    json!({ "column": pos.column, "offset": pos.offset })
}

/// Serialize an extract-and-parse failure.
pub fn error_to_json(err: &ExtractError) -> String {
    let tag_error = err.tag_error();
    let value = match err {
        ExtractError::Parse { identifier, .. } => json!({
            "code": tag_error.code(),
            "message": tag_error.message,
            "line": err.line(),
            "identifier": identifier.to_string(),
            "begin": position_to_value(&tag_error.begin),
            "end": position_to_value(&tag_error.end),
        }),
    };
    render(&value, JsonStyle::Compact)
}
