//! A JSON grammar assembled entirely out of `pegweave`'s public surface:
//! the built-in combinators for structure (`Sequence`, `FirstOf`,
//! `ZeroOrMore`) and a handful of custom `Matcher` implementors — `JsonString`,
//! `JsonNumber`, `JsonObject`, `JsonArray`, `JsonMember` — for the pieces the
//! built-ins don't cover (escaped strings, numeric literals, key/value
//! accumulation). `pegweave::Matcher` is an open trait for exactly this
//! reason: a third-party variant composes with the shipped ones without a
//! closed enum.
//!
//! Recursion (`value` may contain `value`, through `array`/`object`) is
//! closed with a `Proxy`, the same forward-reference indirection the host
//! crate uses internally for cyclic grammars.

use std::borrow::Cow;
use std::rc::Rc;

use pegweave::char_class::CharClass;
use pegweave::context::MatcherContext;
use pegweave::diagnostics::Diagnostic;
use pegweave::error::ParseFault;
use pegweave::location::{InputBuffer, InputChar, StrBuffer};
use pegweave::matcher::{build, Matcher};
use pegweave::parser::Parser;
use pegweave::tree::NodeValue;

use thiserror::Error;

/// A parsed JSON value. Grammar actions build this directly rather than
/// synthesising a generic tree-shaped AST, matching the host crate's stance
/// that value synthesis is always the grammar author's job.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

/// Failure parsing a document: either the grammar never matched (or didn't
/// consume the whole input), or the parser itself faulted.
#[derive(Debug, Error)]
pub enum JsonParseError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Fault(#[from] ParseFault),
}

/// Parses `text` as a single JSON document, failing if anything is left
/// over once the value has been read.
pub fn parse(text: &str) -> Result<JsonValue, JsonParseError> {
    let buffer = StrBuffer::new(text);
    let run = Parser::new(&buffer).parse(json_grammar())?;

    if !run.matched || !run.fully_consumed {
        let detail = run
            .errors
            .first()
            .map(|error| Diagnostic::new(error, &buffer).to_string())
            .unwrap_or_else(|| "input is not valid JSON".to_string());
        return Err(JsonParseError::Invalid(detail));
    }

    let node = run
        .node
        .expect("a matched, non-suppressed root always produces a node");
    Ok(node.value_as::<JsonValue>().cloned().unwrap_or(JsonValue::Null))
}

/// The grammar root: optional surrounding whitespace around one `value`.
pub fn json_grammar() -> Rc<dyn Matcher> {
    let value_proxy = build::proxy();
    let value_ref: Rc<dyn Matcher> = value_proxy.clone();

    let value_impl = build::first_of(vec![
        Rc::new(JsonObject::new(value_ref.clone())),
        Rc::new(JsonArray::new(value_ref.clone())),
        Rc::new(JsonString),
        Rc::new(JsonNumber),
        Rc::new(JsonLiteral::new("true", JsonValue::Bool(true))),
        Rc::new(JsonLiteral::new("false", JsonValue::Bool(false))),
        Rc::new(JsonLiteral::new("null", JsonValue::Null)),
    ]);
    value_proxy.bind(value_impl);

    build::seq(vec![whitespace(), value_ref, whitespace()])
}

fn whitespace() -> Rc<dyn Matcher> {
    build::zero_or_more(build::char_set(" \t\r\n"))
}

/// A fixed keyword (`true`/`false`/`null`) that sets its own value directly,
/// rather than going through an `Action` wrapping a `Str` terminal: the
/// keyword and the value it denotes are one unit here, not two.
#[derive(Debug)]
struct JsonLiteral {
    text: &'static str,
    value: JsonValue,
}

impl JsonLiteral {
    fn new(text: &'static str, value: JsonValue) -> Self {
        Self { text, value }
    }
}

impl Matcher for JsonLiteral {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        let mut probe = ctx.current_location();

        for expected in self.text.chars() {
            if probe.current_char(buffer) != InputChar::Char(expected) {
                return Ok(false);
            }
            probe = probe.advance(buffer);
        }

        ctx.set_current_location(probe);
        ctx.set_node_value(Rc::new(self.value.clone()) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.text)
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single(self.text.chars().next().expect("literal text is non-empty"))
    }
}

/// A JSON string literal, with the common escape sequences. Written by hand
/// rather than composed from terminals, since the escape table needs to run
/// arbitrary logic per character rather than just classify it.
#[derive(Debug)]
struct JsonString;

impl Matcher for JsonString {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        let mut probe = ctx.current_location();

        if probe.current_char(buffer) != InputChar::Char('"') {
            return Ok(false);
        }
        probe = probe.advance(buffer);

        let mut text = String::new();
        loop {
            match probe.current_char(buffer) {
                InputChar::Char('"') => {
                    probe = probe.advance(buffer);
                    break;
                }
                InputChar::Char('\\') => {
                    probe = probe.advance(buffer);
                    let escaped = match probe.current_char(buffer) {
                        InputChar::Char('"') => '"',
                        InputChar::Char('\\') => '\\',
                        InputChar::Char('/') => '/',
                        InputChar::Char('n') => '\n',
                        InputChar::Char('t') => '\t',
                        InputChar::Char('r') => '\r',
                        _ => return Ok(false),
                    };
                    text.push(escaped);
                    probe = probe.advance(buffer);
                }
                InputChar::Char(ch) => {
                    text.push(ch);
                    probe = probe.advance(buffer);
                }
                InputChar::Eoi => return Ok(false),
            }
        }

        ctx.set_current_location(probe);
        ctx.set_node_value(Rc::new(JsonValue::String(text)) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("String")
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single('"')
    }
}

/// A JSON number literal: optional sign, integer part, optional fraction,
/// optional exponent.
#[derive(Debug)]
struct JsonNumber;

impl Matcher for JsonNumber {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        let start = ctx.current_location();
        let mut probe = start.clone();

        if probe.current_char(buffer) == InputChar::Char('-') {
            probe = probe.advance(buffer);
        }

        let digits_start = probe.clone();
        while matches!(probe.current_char(buffer), InputChar::Char(ch) if ch.is_ascii_digit()) {
            probe = probe.advance(buffer);
        }
        if probe == digits_start {
            return Ok(false);
        }

        if probe.current_char(buffer) == InputChar::Char('.') {
            let mut fraction = probe.advance(buffer);
            let fraction_start = fraction.clone();
            while matches!(fraction.current_char(buffer), InputChar::Char(ch) if ch.is_ascii_digit()) {
                fraction = fraction.advance(buffer);
            }
            if fraction != fraction_start {
                probe = fraction;
            }
        }

        if matches!(probe.current_char(buffer), InputChar::Char('e') | InputChar::Char('E')) {
            let mut exponent = probe.advance(buffer);
            if matches!(exponent.current_char(buffer), InputChar::Char('+') | InputChar::Char('-')) {
                exponent = exponent.advance(buffer);
            }
            let exponent_start = exponent.clone();
            while matches!(exponent.current_char(buffer), InputChar::Char(ch) if ch.is_ascii_digit()) {
                exponent = exponent.advance(buffer);
            }
            if exponent != exponent_start {
                probe = exponent;
            }
        }

        let text: String = (start.index()..probe.index()).filter_map(|index| buffer.char_at(index)).collect();
        let value: f64 = text
            .parse()
            .map_err(|_| ParseFault::Internal(format!("malformed number literal `{text}`")))?;

        ctx.set_current_location(probe);
        ctx.set_node_value(Rc::new(JsonValue::Number(value)) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("Number")
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::range('0', '9').union(&CharClass::single('-'))
    }
}

/// One `"key": value` pair. Bound as its own sub-context so a partially
/// matched member (key and colon present, value missing) fails atomically
/// instead of leaking the consumed prefix into `JsonObject`'s cursor.
#[derive(Debug)]
struct JsonMember {
    value: Rc<dyn Matcher>,
}

impl JsonMember {
    fn new(value: Rc<dyn Matcher>) -> Self {
        Self { value }
    }
}

#[derive(Clone, Debug)]
struct Member {
    key: String,
    value: JsonValue,
}

impl Matcher for JsonMember {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let key_index = ctx.bind_sub(Rc::new(JsonString));
        if !ctx.run_sub(key_index)? {
            return Ok(false);
        }
        let key = match ctx.last_node().and_then(|node| node.value_as::<JsonValue>().cloned()) {
            Some(JsonValue::String(key)) => key,
            _ => return Ok(false),
        };

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let colon = ctx.bind_sub(build::ch(':'));
        if !ctx.run_sub(colon)? {
            return Ok(false);
        }

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let value_index = ctx.bind_sub(self.value.clone());
        if !ctx.run_sub(value_index)? {
            return Ok(false);
        }
        let value = ctx
            .last_node()
            .and_then(|node| node.value_as::<JsonValue>().cloned())
            .unwrap_or(JsonValue::Null);

        ctx.set_node_value(Rc::new(Member { key, value }) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("Member")
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single('"')
    }
}

/// `{ member (, member)* }`.
#[derive(Debug)]
struct JsonObject {
    value: Rc<dyn Matcher>,
}

impl JsonObject {
    fn new(value: Rc<dyn Matcher>) -> Self {
        Self { value }
    }
}

impl Matcher for JsonObject {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let open = ctx.bind_sub(build::ch('{'));
        if !ctx.run_sub(open)? {
            return Ok(false);
        }

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let mut members = Vec::new();

        let first_member = ctx.bind_sub(Rc::new(JsonMember::new(self.value.clone())));
        if ctx.run_sub(first_member)? {
            if let Some(member) = ctx.last_node().and_then(|node| node.value_as::<Member>().cloned()) {
                members.push((member.key, member.value));
            }

            loop {
                let ws = ctx.bind_sub(whitespace());
                ctx.run_sub(ws)?;

                let comma = ctx.bind_sub(build::ch(','));
                if !ctx.run_sub(comma)? {
                    break;
                }

                let ws = ctx.bind_sub(whitespace());
                ctx.run_sub(ws)?;

                let member_index = ctx.bind_sub(Rc::new(JsonMember::new(self.value.clone())));
                if !ctx.run_sub(member_index)? {
                    return Ok(false);
                }
                if let Some(member) = ctx.last_node().and_then(|node| node.value_as::<Member>().cloned()) {
                    members.push((member.key, member.value));
                }
            }
        }

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let close = ctx.bind_sub(build::ch('}'));
        if !ctx.run_sub(close)? {
            return Ok(false);
        }

        ctx.set_node_value(Rc::new(JsonValue::Object(members)) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("Object")
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single('{')
    }
}

/// `[ value (, value)* ]`.
#[derive(Debug)]
struct JsonArray {
    value: Rc<dyn Matcher>,
}

impl JsonArray {
    fn new(value: Rc<dyn Matcher>) -> Self {
        Self { value }
    }
}

impl Matcher for JsonArray {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let open = ctx.bind_sub(build::ch('['));
        if !ctx.run_sub(open)? {
            return Ok(false);
        }

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let mut items = Vec::new();

        let first_item = ctx.bind_sub(self.value.clone());
        if ctx.run_sub(first_item)? {
            items.push(
                ctx.last_node()
                    .and_then(|node| node.value_as::<JsonValue>().cloned())
                    .unwrap_or(JsonValue::Null),
            );

            loop {
                let ws = ctx.bind_sub(whitespace());
                ctx.run_sub(ws)?;

                let comma = ctx.bind_sub(build::ch(','));
                if !ctx.run_sub(comma)? {
                    break;
                }

                let ws = ctx.bind_sub(whitespace());
                ctx.run_sub(ws)?;

                let item_index = ctx.bind_sub(self.value.clone());
                if !ctx.run_sub(item_index)? {
                    return Ok(false);
                }
                items.push(
                    ctx.last_node()
                        .and_then(|node| node.value_as::<JsonValue>().cloned())
                        .unwrap_or(JsonValue::Null),
                );
            }
        }

        let ws = ctx.bind_sub(whitespace());
        ctx.run_sub(ws)?;

        let close = ctx.bind_sub(build::ch(']'));
        if !ctx.run_sub(close)? {
            return Ok(false);
        }

        ctx.set_node_value(Rc::new(JsonValue::Array(items)) as NodeValue);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("Array")
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single('[')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse("42").unwrap(), JsonValue::Number(42.0));
        assert_eq!(parse("-3.5").unwrap(), JsonValue::Number(-3.5));
        assert_eq!(parse("true").unwrap(), JsonValue::Bool(true));
        assert_eq!(parse("null").unwrap(), JsonValue::Null);
        assert_eq!(parse(r#""hi\n""#).unwrap(), JsonValue::String("hi\n".to_string()));
    }

    #[test]
    fn parses_an_array_of_mixed_values() {
        let value = parse(r#"[1, "two", null, false]"#).unwrap();
        assert_eq!(
            value,
            JsonValue::Array(vec![
                JsonValue::Number(1.0),
                JsonValue::String("two".to_string()),
                JsonValue::Null,
                JsonValue::Bool(false),
            ])
        );
    }

    #[test]
    fn rejects_a_member_with_a_missing_value() {
        assert!(parse(r#"{"a": }"#).is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("1 2").is_err());
    }
}
