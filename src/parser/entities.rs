use crate::level::Level;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Where an extension value of a record is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalars and empty arrays, shown inline as `key=value`
    Field,
    /// Non-empty arrays and objects, shown as indented blocks below the record
    Blob,
}

/// Classifies an extension value.
///
/// A value is a field iff it is a scalar or an empty array; any other array or
/// object is a blob.
pub fn classify(value: &Value) -> FieldKind {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => FieldKind::Field,
        Value::Array(items) if items.is_empty() => FieldKind::Field,
        Value::Array(_) | Value::Object(_) => FieldKind::Blob,
    }
}

/// Main log record structure, one per decoded input line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    /// `time` or `timestamp` of the record, always held in UTC
    pub time: Option<DateTime<Utc>>,
    pub level: Level,
    pub hostname: String,
    /// Process (application) name
    pub name: String,
    pub pid: i64,
    /// Task or thread id
    pub tid: i64,
    pub topic: String,
    pub scope: String,
    /// The `msg` key
    pub message: String,
    /// Extension scalars, ordered by key
    pub fields: BTreeMap<String, Value>,
    /// Extension composites, ordered by key
    pub blobs: BTreeMap<String, Value>,
    /// The input line, unaltered
    pub raw_logline: String,
}

impl LogRecord {
    /// Stores an unrecognized key in `fields` or `blobs` according to [`classify`].
    pub fn insert_extension(&mut self, key: impl Into<String>, value: Value) {
        match classify(&value) {
            FieldKind::Field => self.fields.insert(key.into(), value),
            FieldKind::Blob => self.blobs.insert(key.into(), value),
        };
    }

    /// Resolves a field reference to its canonical text.
    ///
    /// Extension fields shadow the well-known keys; unknown names resolve to
    /// an empty string.
    pub fn field(&self, name: &str) -> String {
        if let Some(value) = self.fields.get(name) {
            return scalar_text(value);
        }
        if let Some(value) = self.blobs.get(name) {
            return serde_json::to_string(value).unwrap_or_default();
        }

        match name {
            "level" => self.level.name().to_string(),
            "hostname" => self.hostname.clone(),
            "name" => self.name.clone(),
            "pid" => self.pid.to_string(),
            "tid" => self.tid.to_string(),
            "topic" => self.topic.clone(),
            "scope" => self.scope.clone(),
            "msg" => self.message.clone(),
            "time" | "timestamp" => self
                .time
                .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Canonical text of a scalar: strings verbatim, numbers in shortest form,
/// `null` as empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n).unwrap_or_else(|| n.to_string()),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Exact text for integers, [`format_number`] for everything else. `None`
/// when the number has no finite `f64` value.
pub fn number_text(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        Some(i.to_string())
    } else if let Some(u) = n.as_u64() {
        Some(u.to_string())
    } else {
        n.as_f64().filter(|f| f.is_finite()).map(format_number)
    }
}

/// Shortest text that reads back as the same `f64`, without a trailing `.0`
/// for integral values.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i128)
    } else {
        format!("{value}")
    }
}
