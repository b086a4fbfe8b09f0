use crate::parser::number_text;
use serde_json::{Number, Value};
use std::fmt::Write;

/// Arrays of scalars shorter than this are written on one line.
pub const INLINE_ARRAY_LIMIT: usize = 20;

/// Prefix of values that could not be rendered.
pub const ERROR_MARKER: &str = "!!!";

/// Writes a blob value, continuing lines at `indent` columns.
///
/// Nested arrays and objects indent their members two columns deeper and
/// close at `indent`.
pub fn write_blob(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Null => out.push_str("<null>"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Value::Array(items) if is_inline(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_blob(out, item, indent);
            }
            out.push(']');
        }
        Value::Array(items) => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                push_indent(out, indent + 2);
                write_blob(out, item, indent + 2);
                out.push_str(if index + 1 < items.len() { ",\n" } else { "\n" });
            }
            push_indent(out, indent);
            out.push(']');
        }
        Value::Object(members) if members.is_empty() => out.push_str("{}"),
        Value::Object(members) => {
            out.push_str("{\n");
            for (index, (key, member)) in members.iter().enumerate() {
                push_indent(out, indent + 2);
                let _ = write!(out, "\"{key}\": ");
                write_blob(out, member, indent + 2);
                out.push_str(if index + 1 < members.len() { ",\n" } else { "\n" });
            }
            push_indent(out, indent);
            out.push('}');
        }
    }
}

/// Writes an inline field value: like a blob scalar, but strings are unquoted.
pub fn write_field_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_field_value(out, item);
            }
            out.push(']');
        }
        Value::Object(_) => {
            out.push_str(ERROR_MARKER);
            out.push_str(&value.to_string());
        }
        scalar => write_blob(out, scalar, 0),
    }
}

fn write_number(out: &mut String, n: &Number) {
    match number_text(n) {
        Some(text) => out.push_str(&text),
        None => {
            out.push_str(ERROR_MARKER);
            out.push_str(&n.to_string());
        }
    }
}

fn is_inline(items: &[Value]) -> bool {
    items.len() < INLINE_ARRAY_LIMIT && items.iter().all(|item| !item.is_array() && !item.is_object())
}

pub(super) fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}
