mod blob;
mod options;

pub use blob::{ERROR_MARKER, INLINE_ARRAY_LIMIT, write_blob, write_field_value};
pub use options::{DisplayZone, OutputOptions, UnknownTimezone};

use crate::cli::OutputMode;
use crate::parser::LogRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::{Color, Colorize};
use serde_json::{Map, Value, json};
use std::fmt::Write;

/// Indentation of the blob blocks written below a record.
const BLOB_INDENT: usize = 4;

const TOPIC_COLOR: Color = Color::Green;
const SCOPE_COLOR: Color = Color::Yellow;
const MESSAGE_COLOR: Color = Color::Cyan;

/// Renders a record as text, without a trailing newline.
///
/// Rendering never fails: values that cannot be shown are written with the
/// [`ERROR_MARKER`] prefix instead.
pub fn render_record(record: &LogRecord, options: &OutputOptions) -> String {
    match options.mode {
        OutputMode::Long | OutputMode::Short => render_text(record, options),
        OutputMode::Simple => render_simple(record, options),
        OutputMode::Json => {
            serde_json::to_string_pretty(&record_json(record)).unwrap_or_else(|_| record.raw_logline.clone())
        }
        OutputMode::Bunyan => {
            serde_json::to_string(&record_json(record)).unwrap_or_else(|_| record.raw_logline.clone())
        }
    }
}

fn render_text(record: &LogRecord, options: &OutputOptions) -> String {
    let mut out = String::new();

    write_header(&mut out, record, options);
    out.push_str(": ");
    write_topic_and_scope(&mut out, record, options);
    out.push_str(&paint(&record.message, MESSAGE_COLOR, options));
    write_fields(&mut out, record);

    for (key, value) in &record.blobs {
        out.push('\n');
        blob::push_indent(&mut out, BLOB_INDENT);
        let _ = write!(out, "{key}: ");
        write_blob(&mut out, value, BLOB_INDENT);
    }

    out
}

fn render_simple(record: &LogRecord, options: &OutputOptions) -> String {
    format!(
        "{} - {}",
        paint(&record.level.padded_label(), record.level.color(), options),
        paint(&record.message, MESSAGE_COLOR, options)
    )
}

fn write_header(out: &mut String, record: &LogRecord, options: &OutputOptions) {
    if let Some(time) = record.time {
        out.push_str(&format_timestamp(time, options));
        out.push(' ');
    }
    out.push_str(&paint(&record.level.padded_label(), record.level.color(), options));

    if options.mode == OutputMode::Short {
        if !record.name.is_empty() {
            out.push(' ');
            out.push_str(&record.name);
        }
        return;
    }

    out.push_str(": ");
    out.push_str(&record.name);
    if record.pid > 0 {
        let _ = write!(out, "/{}", record.pid);
    }
    if !record.hostname.is_empty() {
        let _ = write!(out, " on {}", record.hostname);
    }
}

/// `HH:MM:SS.mmm[Z]` in short mode, `[YYYY-MM-DDTHH:MM:SS.mmm[+hh:mm]]` otherwise.
///
/// The zone marker is only written in short mode for UTC and only in long
/// mode for other zones.
pub fn format_timestamp(time: DateTime<Utc>, options: &OutputOptions) -> String {
    let utc = options.zone.is_utc();
    match options.mode {
        OutputMode::Short if utc => options.zone.format(time, "%H:%M:%S%.3fZ"),
        OutputMode::Short => options.zone.format(time, "%H:%M:%S%.3f"),
        _ if utc => format!("[{}]", options.zone.format(time, "%Y-%m-%dT%H:%M:%S%.3f")),
        _ => format!("[{}]", options.zone.format(time, "%Y-%m-%dT%H:%M:%S%.3f%:z")),
    }
}

fn write_topic_and_scope(out: &mut String, record: &LogRecord, options: &OutputOptions) {
    if record.topic.is_empty() {
        return;
    }
    out.push_str(&paint(&record.topic, TOPIC_COLOR, options));
    if !record.scope.is_empty() {
        out.push('/');
        out.push_str(&paint(&record.scope, SCOPE_COLOR, options));
    }
    out.push(' ');
}

/// ` (key=value, ..., tid=N)`, the task id always last.
fn write_fields(out: &mut String, record: &LogRecord) {
    out.push_str(" (");
    for (key, value) in &record.fields {
        let _ = write!(out, "{key}=");
        write_field_value(out, value);
        out.push_str(", ");
    }
    let _ = write!(out, "tid={})", record.tid);
}

/// The record as a JSON object: the input line when it still parses,
/// otherwise rebuilt from the decoded fields.
fn record_json(record: &LogRecord) -> Value {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&record.raw_logline) {
        return value;
    }

    let mut object = Map::new();
    if let Some(time) = record.time {
        object.insert("time".into(), json!(time.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    object.insert("level".into(), json!(record.level.as_number()));
    for (key, value) in [
        ("name", &record.name),
        ("hostname", &record.hostname),
        ("topic", &record.topic),
        ("scope", &record.scope),
    ] {
        if !value.is_empty() {
            object.insert(key.into(), json!(value));
        }
    }
    if record.pid > 0 {
        object.insert("pid".into(), json!(record.pid));
    }
    if record.tid > 0 {
        object.insert("tid".into(), json!(record.tid));
    }
    object.insert("msg".into(), json!(record.message));
    for (key, value) in record.fields.iter().chain(&record.blobs) {
        object.insert(key.clone(), value.clone());
    }
    Value::Object(object)
}

fn paint(text: &str, color: Color, options: &OutputOptions) -> String {
    if options.use_colors {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}
