use crate::parser::{LogRecord, number_text};
use regex::Regex;
use serde_json::Number;
use std::borrow::Cow;
use std::fmt;

/// An operand of a comparison: a literal or a reference to a record field
#[derive(Debug, Clone)]
pub enum LeafNode {
    /// `.name`
    Field(String),
    /// `"text"` or any bare word that is not another literal
    Constant(String),
    /// Integers are kept exact, other numbers as `f64`
    Number(Number),
    Boolean(bool),
    /// `/pattern/`, compiled once when the condition is parsed
    Regex(Regex),
}

impl LeafNode {
    /// Parses an operand token. Never fails: anything unrecognized is a constant.
    ///
    /// The checks run in a fixed order: field reference, quoted string, regex,
    /// boolean, number, and finally the raw token.
    pub fn parse(token: &str) -> Self {
        if let Some(name) = token.strip_prefix('.') {
            return LeafNode::Field(name.to_string());
        }

        if let Some(text) = strip_delimiters(token, '"') {
            return LeafNode::Constant(text.to_string());
        }

        if let Some(pattern) = strip_delimiters(token, '/')
            && let Ok(regex) = Regex::new(pattern)
        {
            return LeafNode::Regex(regex);
        }

        match token {
            "true" => return LeafNode::Boolean(true),
            "false" => return LeafNode::Boolean(false),
            _ => {}
        }

        if let Some(number) = parse_number(token) {
            return LeafNode::Number(number);
        }

        LeafNode::Constant(token.to_string())
    }

    /// The canonical text of this operand for the given record.
    pub fn value<'a>(&'a self, record: &LogRecord) -> Cow<'a, str> {
        match self {
            LeafNode::Field(name) => Cow::Owned(record.field(name)),
            LeafNode::Constant(text) => Cow::Borrowed(text),
            LeafNode::Number(number) => Cow::Owned(number_text(number).unwrap_or_else(|| number.to_string())),
            LeafNode::Boolean(true) => Cow::Borrowed("true"),
            LeafNode::Boolean(false) => Cow::Borrowed("false"),
            LeafNode::Regex(regex) => Cow::Borrowed(regex.as_str()),
        }
    }
}

fn parse_number(token: &str) -> Option<Number> {
    if let Ok(i) = token.parse::<i64>() {
        Some(Number::from(i))
    } else if let Ok(u) = token.parse::<u64>() {
        Some(Number::from(u))
    } else {
        token.parse::<f64>().ok().and_then(Number::from_f64)
    }
}

/// Returns the inside of `token` when it starts and ends with `delimiter`.
fn strip_delimiters(token: &str, delimiter: char) -> Option<&str> {
    token
        .strip_prefix(delimiter)
        .and_then(|rest| rest.strip_suffix(delimiter))
}

impl fmt::Display for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafNode::Field(name) => write!(f, ".{name}"),
            LeafNode::Constant(text) => write!(f, "\"{text}\""),
            LeafNode::Number(number) => f.write_str(&number_text(number).unwrap_or_else(|| number.to_string())),
            LeafNode::Boolean(value) => write!(f, "{value}"),
            LeafNode::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}
