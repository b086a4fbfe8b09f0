use logviewer::level::Level;
use logviewer::parser::{FieldError, FieldKind, classify, parse_log_record};
use serde_json::json;

#[test]
fn test_decoding_is_idempotent() {
    let line = r#"{"time":"2024-01-02T03:04:05.678Z","level":"warn","name":"svc","msg":"x","extra":{"k":[1,2]},"n":3}"#;
    let (first, first_errors) = parse_log_record(line).unwrap();
    let (second, second_errors) = parse_log_record(line).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_errors, second_errors);
    assert_eq!(first.level, Level::Warn);
}

#[test]
fn test_wrong_types_keep_defaults_and_report_every_field() {
    let line = r#"{"pid":"12","tid":[1],"name":5,"level":true,"time":"yesterday","msg":"still shown"}"#;
    let (record, errors) = parse_log_record(line).unwrap();

    assert_eq!(record.pid, 0);
    assert_eq!(record.tid, 0);
    assert_eq!(record.name, "");
    assert_eq!(record.level, Level::Info);
    assert_eq!(record.time, None);
    assert_eq!(record.message, "still shown");
    assert_eq!(errors.len(), 5);
    assert!(errors.iter().any(|e| matches!(e, FieldError::InvalidTime { field, .. } if field == "time")));
}

#[test]
fn test_unknown_level_name_is_reported() {
    let (record, errors) = parse_log_record(r#"{"level":"loud"}"#).unwrap();
    assert_eq!(record.level, Level::Info);
    assert_eq!(errors, vec![FieldError::UnknownLevel("loud".to_string())]);
}

#[test]
fn test_extensions_are_split_by_kind() {
    let (record, _) =
        parse_log_record(r#"{"a":1,"b":"two","c":null,"d":[],"e":[1],"f":{"g":true},"v":0,"severity":"x"}"#).unwrap();

    assert_eq!(record.fields.keys().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
    assert_eq!(record.blobs.keys().collect::<Vec<_>>(), ["e", "f"]);
    for value in record.fields.values() {
        assert_eq!(classify(value), FieldKind::Field);
    }
    for value in record.blobs.values() {
        assert_eq!(classify(value), FieldKind::Blob);
    }
}

#[test]
fn test_field_lookup_text() {
    let (record, _) = parse_log_record(
        r#"{"time":1700000000123,"level":60,"msg":"m","count":2.0,"tags":["x","y"],"pid":7}"#,
    )
    .unwrap();

    assert_eq!(record.field("time"), "2023-11-14T22:13:20.123Z");
    assert_eq!(record.field("level"), "FATAL");
    assert_eq!(record.field("count"), "2");
    assert_eq!(record.field("tags"), json!(["x", "y"]).to_string());
    assert_eq!(record.field("pid"), "7");
    assert_eq!(record.field("nope"), "");
}

#[test]
fn test_non_objects_are_rejected() {
    assert!(parse_log_record("plain text").is_err());
    assert!(parse_log_record("42").is_err());
    assert!(parse_log_record(r#"["a"]"#).is_err());
}
