use crate::level::Level;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

mod entities;

pub use entities::{FieldKind, LogRecord, classify, format_number, number_text, scalar_text};

/// Errors that make a whole line unusable as a record
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object, got: {0}")]
    NotAnObject(String),
}

/// A well-known key whose value could not be coerced.
///
/// These never reject the record: the offending field keeps its default.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Field '{field}' should be {expected}, got: {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Field '{field}' is not an RFC3339 timestamp: {value} ({reason})")]
    InvalidTime {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Field 'level' has an unknown level name: {0}")]
    UnknownLevel(String),
}

/// Parses one input line into a record plus the list of non-fatal field errors.
pub fn parse_log_record(line: &str) -> Result<(LogRecord, Vec<FieldError>), ParseError> {
    let value: Value = serde_json::from_str(line)?;
    let Value::Object(object) = value else {
        return Err(ParseError::NotAnObject(line.to_string()));
    };

    let (mut record, errors) = decode_record(object);
    record.raw_logline = line.to_string();
    Ok((record, errors))
}

/// Decodes an already parsed JSON object.
///
/// Every known key is coerced independently, so one bad key never hides
/// errors in another.
pub fn decode_record(object: Map<String, Value>) -> (LogRecord, Vec<FieldError>) {
    let mut record = LogRecord::default();
    let mut errors = Vec::new();

    for (key, value) in object {
        match key.as_str() {
            "hostname" => decode_string(&key, value, &mut record.hostname, &mut errors),
            "name" => decode_string(&key, value, &mut record.name, &mut errors),
            "topic" => decode_string(&key, value, &mut record.topic, &mut errors),
            "scope" => decode_string(&key, value, &mut record.scope, &mut errors),
            "msg" => decode_string(&key, value, &mut record.message, &mut errors),
            "pid" => decode_integer(&key, value, &mut record.pid, &mut errors),
            "tid" => decode_integer(&key, value, &mut record.tid, &mut errors),
            "level" => match value {
                Value::Number(n) => match n.as_f64() {
                    Some(number) => record.level = Level::from_number(number as i64),
                    None => errors.push(invalid_type(&key, "a number or a level name", &Value::Number(n))),
                },
                Value::String(name) => match name.parse::<Level>() {
                    Ok(level) => record.level = level,
                    Err(_) => errors.push(FieldError::UnknownLevel(name)),
                },
                other => errors.push(invalid_type(&key, "a number or a level name", &other)),
            },
            "time" | "timestamp" => match decode_time(&key, &value) {
                Ok(time) => record.time = Some(time),
                Err(e) => errors.push(e),
            },
            "severity" | "v" => {}
            _ => record.insert_extension(key, value),
        }
    }

    (record, errors)
}

fn decode_string(key: &str, value: Value, target: &mut String, errors: &mut Vec<FieldError>) {
    match value {
        Value::String(s) => *target = s,
        other => errors.push(invalid_type(key, "a string", &other)),
    }
}

fn decode_integer(key: &str, value: Value, target: &mut i64, errors: &mut Vec<FieldError>) {
    match value.as_f64() {
        Some(number) => *target = number as i64,
        None => errors.push(invalid_type(key, "a number", &value)),
    }
}

fn decode_time(key: &str, value: &Value) -> Result<DateTime<Utc>, FieldError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(|millis| DateTime::from_timestamp_millis(millis as i64))
            .ok_or_else(|| invalid_type(key, "epoch milliseconds in range", value)),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|e| FieldError::InvalidTime {
                field: key.to_string(),
                value: text.clone(),
                reason: e.to_string(),
            }),
        other => Err(invalid_type(key, "an RFC3339 string or epoch milliseconds", other)),
    }
}

fn invalid_type(key: &str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::InvalidType {
        field: key.to_string(),
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_full_record() {
        let line = r#"{"name":"api","hostname":"web-1","pid":1234,"tid":7,"level":30,"msg":"started","time":"2024-05-01T10:20:30.456Z","v":0,"topic":"http","scope":"listen","port":8080,"tags":["a"]}"#;
        let (record, errors) = parse_log_record(line).expect("valid line");

        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(record.name, "api");
        assert_eq!(record.hostname, "web-1");
        assert_eq!(record.pid, 1234);
        assert_eq!(record.tid, 7);
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.message, "started");
        assert_eq!(record.topic, "http");
        assert_eq!(record.scope, "listen");
        assert_eq!(
            record.time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap() + chrono::Duration::milliseconds(456))
        );
        assert_eq!(record.fields.get("port"), Some(&serde_json::json!(8080)));
        assert_eq!(record.blobs.get("tags"), Some(&serde_json::json!(["a"])));
        assert!(!record.fields.contains_key("v"));
        assert_eq!(record.raw_logline, line);
    }

    #[test]
    fn test_epoch_millis_and_level_names() {
        let (record, errors) =
            parse_log_record(r#"{"timestamp":1700000000123,"level":"warning"}"#).unwrap();
        assert!(errors.is_empty());
        assert_eq!(record.level, Level::Warn);
        assert_eq!(
            record.time.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_123)
        );
    }

    #[test]
    fn test_wrong_types_are_collected_not_fatal() {
        let (record, errors) = parse_log_record(
            r#"{"pid":"12","tid":true,"hostname":5,"level":"loud","time":"yesterday","msg":"still here"}"#,
        )
        .expect("record is still produced");

        assert_eq!(errors.len(), 5);
        assert_eq!(record.pid, 0);
        assert_eq!(record.tid, 0);
        assert_eq!(record.hostname, "");
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.time, None);
        assert_eq!(record.message, "still here");
        assert!(errors.contains(&FieldError::UnknownLevel("loud".to_string())));
    }

    #[test]
    fn test_invalid_json_and_non_objects() {
        assert!(matches!(parse_log_record("not json"), Err(ParseError::Json(_))));
        assert!(matches!(parse_log_record("[1,2]"), Err(ParseError::NotAnObject(_))));
        assert!(matches!(parse_log_record("42"), Err(ParseError::NotAnObject(_))));
    }
}
