use logviewer::OutputMode;
use logviewer::parser::{LogRecord, parse_log_record};
use logviewer::render::{OutputOptions, render_record};
use serde_json::json;

fn render(line: &str, options: &OutputOptions) -> String {
    let (record, _) = parse_log_record(line).expect("valid record");
    render_record(&record, options)
}

#[test]
fn test_tid_is_always_last() {
    let options = OutputOptions::new();
    let orderings = [
        r#"{"tid":42,"zeta":1,"alpha":"a","mid":true,"msg":"m"}"#,
        r#"{"alpha":"a","msg":"m","mid":true,"zeta":1,"tid":42}"#,
        r#"{"mid":true,"tid":42,"zeta":1,"msg":"m","alpha":"a"}"#,
        r#"{"zeta":1,"mid":true,"alpha":"a","tid":42,"msg":"m"}"#,
    ];

    for line in orderings {
        let out = render(line, &options);
        assert!(out.ends_with("tid=42)"), "got: {out}");
        assert_eq!(out, " INFO: : m (alpha=a, mid=true, zeta=1, tid=42)");
    }
}

#[test]
fn test_large_array_blob_is_multiline() {
    let items: Vec<i32> = (1..=25).collect();
    let mut record = LogRecord {
        message: "batch".to_string(),
        ..Default::default()
    };
    record.insert_extension("ids", json!(items));
    record.insert_extension("few", json!([1, 2, 3, 4, 5]));

    let out = render_record(&record, &OutputOptions::new());
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], " INFO: : batch (tid=0)");
    assert_eq!(lines[1], "    few: [1, 2, 3, 4, 5]");
    assert_eq!(lines[2], "    ids: [");
    assert_eq!(lines[3], "      1,");
    assert_eq!(lines[27], "      25");
    assert_eq!(lines[28], "    ]");
    assert_eq!(lines.len(), 29);
}

#[test]
fn test_object_blob() {
    let out = render(
        r#"{"msg":"req","req":{"method":"GET","headers":{"a":"b"}}}"#,
        &OutputOptions::new(),
    );
    assert_eq!(
        out,
        " INFO: : req (tid=0)\n    req: {\n      \"headers\": {\n        \"a\": \"b\"\n      },\n      \"method\": \"GET\"\n    }"
    );
}

#[test]
fn test_scalar_field_values() {
    let out = render(
        r#"{"msg":"m","s":"text","n":null,"b":false,"f":1.25,"e":[]}"#,
        &OutputOptions::new(),
    );
    assert_eq!(out, " INFO: : m (b=false, e=[], f=1.25, n=<null>, s=text, tid=0)");
}

#[test]
fn test_modes_with_timestamp() {
    let line = r#"{"time":"2024-02-29T23:59:58.250Z","level":50,"name":"api","pid":3,"hostname":"h","msg":"oops"}"#;

    assert_eq!(
        render(line, &OutputOptions::new()),
        "[2024-02-29T23:59:58.250] ERROR: api/3 on h: oops (tid=0)"
    );
    assert_eq!(
        render(line, &OutputOptions::new().mode(OutputMode::Short)),
        "23:59:58.250Z ERROR api: oops (tid=0)"
    );
    assert_eq!(
        render(line, &OutputOptions::new().mode(OutputMode::Simple)),
        "ERROR - oops"
    );
}
