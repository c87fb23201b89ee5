//! Typed tag values produced by the parser.

use std::fmt;

/// A primitive literal: an argument value or a tag's `=` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    /// `literal` is the source text (`0xFF`, `-5`, `0o17`), `value` the parsed integer.
    Int { literal: String, value: i64 },
    Bool(bool),
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::String(_) => ValueKind::String,
            TypedValue::Int { .. } => ValueKind::Int,
            TypedValue::Bool(_) => ValueKind::Bool,
        }
    }
}

/// Renders the canonical source form: strings double-quoted, ints as
/// their original literal.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => write_quoted(f, s),
            TypedValue::Int { literal, .. } => f.write_str(literal),
            TypedValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// One entry of a tag's parenthesized argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Empty for a positional argument.
    pub name: String,
    pub value: TypedValue,
}

impl Arg {
    pub fn positional(value: TypedValue) -> Self {
        Arg {
            name: String::new(),
            value,
        }
    }

    pub fn named(name: impl Into<String>, value: TypedValue) -> Self {
        Arg {
            name: name.into(),
            value,
        }
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positional() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}: {}", self.name, self.value)
        }
    }
}

/// What follows a tag's `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Value(TypedValue),
    /// `=+other`: the next link of a tag chain.
    Tag(Box<TypedTag>),
    /// Everything after `=`, untouched. Only produced in raw-value mode.
    Raw(String),
}

/// Discriminant of a tag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    None,
    String,
    Int,
    Bool,
    Tag,
    Raw,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::Tag => "tag",
            ValueKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed tag: `name(args)=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedTag {
    pub name: String,
    /// All positional (at most one) or all named.
    pub args: Vec<Arg>,
    pub value: Option<TagValue>,
}

impl TypedTag {
    pub fn new(name: impl Into<String>) -> Self {
        TypedTag {
            name: name.into(),
            args: Vec::new(),
            value: None,
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match &self.value {
            None => ValueKind::None,
            Some(TagValue::Value(v)) => v.kind(),
            Some(TagValue::Tag(_)) => ValueKind::Tag,
            Some(TagValue::Raw(_)) => ValueKind::Raw,
        }
    }

    /// The scalar after `=`, if the value is neither a tag nor raw text.
    pub fn typed_value(&self) -> Option<&TypedValue> {
        match &self.value {
            Some(TagValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_tag(&self) -> Option<&TypedTag> {
        match &self.value {
            Some(TagValue::Tag(t)) => Some(t),
            _ => None,
        }
    }

    pub fn positional_arg(&self) -> Option<&TypedValue> {
        match self.args.as_slice() {
            [arg] if arg.is_positional() => Some(&arg.value),
            _ => None,
        }
    }

    pub fn named_arg(&self, name: &str) -> Option<&TypedValue> {
        self.args
            .iter()
            .find(|arg| !arg.is_positional() && arg.name == name)
            .map(|arg| &arg.value)
    }

    /// This tag followed by every tag linked through `=+`.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }
}

impl fmt::Display for TypedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(")")?;
        }
        match &self.value {
            None => Ok(()),
            Some(TagValue::Value(v)) => write!(f, "={}", v),
            Some(TagValue::Tag(t)) => write!(f, "=+{}", t),
            Some(TagValue::Raw(raw)) => write!(f, "={}", raw),
        }
    }
}

pub struct Chain<'a> {
    next: Option<&'a TypedTag>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a TypedTag;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.value_tag();
        Some(current)
    }
}
