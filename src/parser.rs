use std::num::IntErrorKind;

use log::trace;

use crate::ast::*;
use crate::error::{Position, TagError};
use crate::options::ParseOptions;
use crate::scanner::{is_ident_interior, is_ident_start, is_tag_name_interior, Scanner};

/// Parse one tag body (marker already stripped) with default options.
pub fn parse(input: &str) -> Result<TypedTag, TagError> {
    parse_with(input, &ParseOptions::default())
}

/// Parse one tag body (marker already stripped).
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<TypedTag, TagError> {
    let mut parser = Parser {
        scanner: Scanner::new(input.trim_end()),
        options: *options,
    };
    parser.parse_tag(0)
}

/// Parse every input in order, stopping at the first failure.
pub fn parse_all<I, S>(inputs: I) -> Result<Vec<TypedTag>, TagError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_all_with(inputs, &ParseOptions::default())
}

pub fn parse_all_with<I, S>(inputs: I, options: &ParseOptions) -> Result<Vec<TypedTag>, TagError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|input| parse_with(input.as_ref(), options))
        .collect()
}

/// Where the parser is within one `name(args)=value // comment` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    TagName,
    MaybeArgs,
    /// Just after `(`: an argument or `)`.
    ArgStart,
    /// Just after `,`: an argument is required.
    ArgNext,
    /// Just after `name:`: the argument's value is required.
    ArgValue,
    /// After an argument token: `,`, `:`, or `)`.
    ArgEnd,
    MaybeValue,
    Value,
    MaybeComment,
    TrailingSlash,
    TrailingComment,
    End,
}

/// A scalar token read from the input.
struct Scalar<'a> {
    value: TypedValue,
    /// The identifier text, when the scalar was a bare identifier. Only
    /// these can be reinterpreted as argument names.
    ident: Option<&'a str>,
}

/// The tag being assembled plus the argument currently being read.
struct TagState<'a> {
    tag: TypedTag,
    open_paren: Position,
    arg_name: Option<String>,
    arg_value: Option<Scalar<'a>>,
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn error_point(&self, message: String) -> TagError {
        let pos = self.scanner.position();
        TagError::syntax(message, pos, pos)
    }

    fn unexpected(&self, ch: char, context: &str) -> TagError {
        self.error_point(format!("Unexpected character '{}' {}", ch, context))
    }

    fn skip(&mut self) {
        self.scanner.next_char();
    }

    // ── Tag ─────────────────────────────────────────────────────────

    /// Run the state machine to the end of input. A nested tag value is
    /// parsed by a recursive call that shares this scanner, so it always
    /// consumes the rest of the text, including any trailing comment.
    fn parse_tag(&mut self, depth: usize) -> Result<TypedTag, TagError> {
        let mut st = TagState {
            tag: TypedTag::new(""),
            open_paren: self.scanner.position(),
            arg_name: None,
            arg_value: None,
        };
        let mut state = State::Begin;

        while let Some(ch) = self.scanner.peek() {
            state = match state {
                State::Begin => self.begin(ch)?,
                State::TagName => {
                    st.tag.name = self.scanner.next_ident(is_tag_name_interior)?.to_string();
                    State::MaybeArgs
                }
                State::MaybeArgs => self.maybe_args(ch, &mut st)?,
                State::ArgStart | State::ArgNext | State::ArgValue => {
                    self.arg(ch, state, &mut st)?
                }
                State::ArgEnd => self.arg_end(ch, &mut st)?,
                State::MaybeValue => match ch {
                    '=' => {
                        self.skip();
                        State::Value
                    }
                    c if c.is_whitespace() => State::MaybeComment,
                    c => return Err(self.unexpected(c, "after argument list")),
                },
                State::Value => self.value(ch, depth, &mut st)?,
                State::MaybeComment => match ch {
                    c if c.is_whitespace() => {
                        self.skip();
                        State::MaybeComment
                    }
                    '/' => {
                        self.skip();
                        State::TrailingSlash
                    }
                    c => return Err(self.unexpected(c, "after tag")),
                },
                State::TrailingSlash => match ch {
                    '/' => {
                        self.skip();
                        State::TrailingComment
                    }
                    _ => {
                        return Err(self.error_point(
                            "Expected '//' to start a trailing comment".to_string(),
                        ))
                    }
                },
                State::TrailingComment => {
                    self.scanner.take_rest();
                    State::End
                }
                State::End => return Err(self.unexpected(ch, "after end of tag")),
            };
        }

        self.finish(state, st)
    }

    /// Validate the state reached at end of input.
    fn finish(&self, state: State, st: TagState<'a>) -> Result<TypedTag, TagError> {
        match state {
            State::Begin | State::TagName => {
                Err(self.error_point("Expected a tag name".to_string()))
            }
            State::ArgStart | State::ArgNext | State::ArgValue | State::ArgEnd => {
                Err(TagError::syntax(
                    "Unterminated argument list; expected ')'".to_string(),
                    st.open_paren,
                    self.scanner.position(),
                ))
            }
            State::Value => Err(self.error_point("Expected a value after '='".to_string())),
            State::TrailingSlash => Err(self.error_point(
                "Unterminated trailing comment; expected '//'".to_string(),
            )),
            State::MaybeArgs
            | State::MaybeValue
            | State::MaybeComment
            | State::TrailingComment
            | State::End => Ok(st.tag),
        }
    }

    fn begin(&mut self, ch: char) -> Result<State, TagError> {
        if ch.is_whitespace() {
            self.skip();
            Ok(State::Begin)
        } else if is_ident_start(ch) {
            Ok(State::TagName)
        } else {
            Err(self.unexpected(ch, "at start of tag"))
        }
    }

    fn maybe_args(&mut self, ch: char, st: &mut TagState<'a>) -> Result<State, TagError> {
        match ch {
            '(' => {
                st.open_paren = self.scanner.position();
                self.skip();
                Ok(State::ArgStart)
            }
            '=' => {
                self.skip();
                Ok(State::Value)
            }
            c if c.is_whitespace() => Ok(State::MaybeComment),
            c => Err(self.unexpected(c, "after tag name")),
        }
    }

    // ── Arguments ───────────────────────────────────────────────────

    fn arg(&mut self, ch: char, state: State, st: &mut TagState<'a>) -> Result<State, TagError> {
        match ch {
            c if c.is_whitespace() => {
                self.skip();
                Ok(state)
            }
            ')' if state == State::ArgStart => self.close_args(st),
            ')' if state == State::ArgNext => {
                Err(self.error_point("Expected an argument after ','".to_string()))
            }
            ')' => Err(self.error_point(format!(
                "Expected a value for argument '{}'",
                st.arg_name.as_deref().unwrap_or_default()
            ))),
            _ => {
                st.arg_value = Some(self.scalar("in argument list")?);
                Ok(State::ArgEnd)
            }
        }
    }

    fn arg_end(&mut self, ch: char, st: &mut TagState<'a>) -> Result<State, TagError> {
        match ch {
            c if c.is_whitespace() => {
                self.skip();
                Ok(State::ArgEnd)
            }
            ',' => {
                self.push_arg(st);
                self.skip();
                Ok(State::ArgNext)
            }
            ')' => {
                self.push_arg(st);
                self.close_args(st)
            }
            ':' => {
                if st.arg_name.is_some() {
                    return Err(self.unexpected(':', "after named argument value"));
                }
                match st.arg_value.take().and_then(|scalar| scalar.ident) {
                    Some(name) => {
                        st.arg_name = Some(name.to_string());
                        self.skip();
                        Ok(State::ArgValue)
                    }
                    None => Err(self.error_point(
                        "Argument name must be an identifier".to_string(),
                    )),
                }
            }
            c => Err(self.unexpected(c, "in argument list")),
        }
    }

    fn push_arg(&self, st: &mut TagState<'a>) {
        if let Some(scalar) = st.arg_value.take() {
            st.tag.args.push(Arg {
                name: st.arg_name.take().unwrap_or_default(),
                value: scalar.value,
            });
        }
    }

    /// Consume `)` and check the finished argument list.
    fn close_args(&mut self, st: &mut TagState<'a>) -> Result<State, TagError> {
        self.skip();
        let args = &st.tag.args;
        let positional = args.iter().filter(|arg| arg.is_positional()).count();
        if positional > 0 && positional < args.len() {
            return Err(TagError::grammar(
                "Mixed positional and named arguments; name every argument".to_string(),
                st.open_paren,
                self.scanner.position(),
            ));
        }
        if positional > 1 {
            return Err(TagError::grammar(
                format!(
                    "Found {} positional arguments; multiple arguments must use name: value form",
                    positional
                ),
                st.open_paren,
                self.scanner.position(),
            ));
        }
        Ok(State::MaybeValue)
    }

    // ── Values ──────────────────────────────────────────────────────

    fn value(&mut self, ch: char, depth: usize, st: &mut TagState<'a>) -> Result<State, TagError> {
        if self.options.raw_values {
            let raw = self.scanner.take_rest();
            st.tag.value = Some(TagValue::Raw(raw.to_string()));
            return Ok(State::End);
        }

        if ch == '+' && self.scanner.peek_at(1).is_some_and(is_ident_start) {
            let begin = self.scanner.position();
            self.skip();
            if depth >= self.options.max_depth {
                return Err(TagError::grammar(
                    format!(
                        "Tag chain nested deeper than {} levels",
                        self.options.max_depth
                    ),
                    begin,
                    self.scanner.position(),
                ));
            }
            trace!("parsing chained tag value of '{}' at depth {}", st.tag.name, depth + 1);
            let inner = self.parse_tag(depth + 1)?;
            st.tag.value = Some(TagValue::Tag(Box::new(inner)));
            return Ok(State::End);
        }

        let scalar = self.scalar("in value")?;
        st.tag.value = Some(TagValue::Value(scalar.value));
        Ok(State::MaybeComment)
    }

    /// Read one int, string, bool, or bare identifier.
    fn scalar(&mut self, context: &str) -> Result<Scalar<'a>, TagError> {
        let begin = self.scanner.position();
        match self.scanner.peek() {
            Some(ch) if ch == '+' || ch == '-' || ch.is_ascii_digit() => {
                let literal = self.scanner.next_number()?;
                let value = int_value(literal).map_err(|message| {
                    TagError::lexical(message, begin, self.scanner.position())
                })?;
                Ok(Scalar {
                    value: TypedValue::Int {
                        literal: literal.to_string(),
                        value,
                    },
                    ident: None,
                })
            }
            Some('"' | '`') => Ok(Scalar {
                value: TypedValue::String(self.scanner.next_string()?),
                ident: None,
            }),
            Some(ch) if is_ident_start(ch) => {
                let ident = self.scanner.next_ident(is_ident_interior)?;
                let value = match ident {
                    "true" => TypedValue::Bool(true),
                    "false" => TypedValue::Bool(false),
                    _ => TypedValue::String(ident.to_string()),
                };
                Ok(Scalar {
                    value,
                    ident: Some(ident),
                })
            }
            Some(ch) => Err(self.unexpected(ch, context)),
            None => Err(self.error_point("Unexpected end of input".to_string())),
        }
    }
}

/// Convert an integer literal as consumed by the scanner.
///
/// `0x`, `0o`, `0b` select hex, octal, binary; a multi-digit decimal run
/// with a leading `0` is octal.
fn int_value(literal: &str) -> Result<i64, String> {
    let (sign, unsigned) = match literal.as_bytes().first() {
        Some(b'+') => ("", &literal[1..]),
        Some(b'-') => ("-", &literal[1..]),
        _ => ("", literal),
    };

    let prefixed = |lower: &str, upper: &str| {
        unsigned
            .strip_prefix(lower)
            .or_else(|| unsigned.strip_prefix(upper))
    };

    let (radix, digits) = if let Some(digits) = prefixed("0x", "0X") {
        (16, digits)
    } else if let Some(digits) = prefixed("0o", "0O") {
        (8, digits)
    } else if let Some(digits) = prefixed("0b", "0B") {
        (2, digits)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    i64::from_str_radix(&format!("{}{}", sign, digits), radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            format!("Integer literal {} is out of range", literal)
        }
        _ if radix == 8 => format!("Invalid octal literal {}", literal),
        _ => format!("Invalid integer literal {}", literal),
    })
}
