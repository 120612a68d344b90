use anyhow::Result;
use batch_etl::{EtlEngine, EtlError, EventLog, PipelineConfig, PipelineEvent};
use std::sync::Arc;
use tempfile::TempDir;

fn normalized(path: &std::path::Path) -> String {
    path.to_str().unwrap().replace('\\', "/")
}

fn users_config(dir: &TempDir, source: &str, output: &str, extra: &str) -> Result<PipelineConfig> {
    let content = format!(
        r#"
[pipeline]
name = "users"

[source]
path = "{}"

[[validators]]
type = "required_fields"
fields = ["id", "name", "email"]

[[validators]]
type = "pattern"
field = "email"
pattern = "^[^@]+@[^@]+$"

{}

[load]
output_path = "{}"
"#,
        normalized(&dir.path().join(source)),
        extra,
        normalized(&dir.path().join(output)),
    );
    Ok(PipelineConfig::from_toml_str(&content)?)
}

/// CSV input is cleaned, cast, deduplicated, renamed and filtered into JSON
#[test]
fn test_end_to_end_csv_to_json() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("users.csv"),
        "id,name,email,age\n1, <b>John</b> ,john@example.com,30\n2,Jane,jane@example.com,25\n1, <b>John</b> ,john@example.com,30\n",
    )?;

    let transformers = r#"
[[transformers]]
type = "clean_text"
trim_whitespace = true
remove_html_tags = true

[[transformers]]
type = "cast_types"
fields = { id = "integer", age = "integer" }

[[transformers]]
type = "deduplicate"
fields = ["id"]

[[transformers]]
type = "rename_fields"
mapping = { id = "user_id", name = "full_name" }

[[transformers]]
type = "keep_only_fields"
fields = ["user_id", "full_name", "age"]
"#;
    let config = users_config(&dir, "users.csv", "out/users.json", transformers)?;

    let log = Arc::new(EventLog::new());
    let summary = EtlEngine::new(config).with_observer(log.clone()).run()?;

    assert!(summary.written);
    assert_eq!(summary.input_records, 3);
    assert_eq!(summary.output_records, 2);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out/users.json"))?)?;
    assert_eq!(
        written,
        serde_json::json!([
            {"user_id": 1, "full_name": "John", "age": 30},
            {"user_id": 2, "full_name": "Jane", "age": 25}
        ])
    );

    let applied = log
        .events()
        .iter()
        .filter(|event| matches!(event, PipelineEvent::TransformerApplied { .. }))
        .count();
    assert_eq!(applied, 5);
    Ok(())
}

/// Validation failures are all reported and no output file is written
#[test]
fn test_validation_failure_writes_no_output() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("users.json"),
        r#"[
            {"id": 1, "name": "A", "email": "a@x.com"},
            {"id": 2, "name": "B", "email": "not-an-email"},
            {"id": 3, "email": "c@x.com"}
        ]"#,
    )?;
    let config = users_config(&dir, "users.json", "users.csv", "")?;

    let err = EtlEngine::new(config).run().unwrap_err();

    match err {
        EtlError::ValidationError { errors } => {
            assert_eq!(errors.len(), 2);
            assert!(errors[0].starts_with("Record 1: Field 'email' does not match"));
            assert_eq!(errors[1], "Record 2: Missing required fields: name");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("users.csv").exists());
    Ok(())
}

/// A cast failure surfaces the processor message unchanged
#[test]
fn test_transformation_failure_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("users.json"),
        r#"[{"id": "one", "name": "A", "email": "a@x.com"}]"#,
    )?;
    let extra = r#"
[[transformers]]
type = "cast_types"
fields = { id = "integer" }
"#;
    let config = users_config(&dir, "users.json", "users_out.json", extra)?;

    let err = EtlEngine::new(config).run().unwrap_err();

    assert!(matches!(err, EtlError::ProcessingError { .. }));
    assert!(err
        .to_string()
        .starts_with("Transformation failed: Transformer 'TypeCaster' failed: record 0: cannot cast field 'id'"));
    assert!(!err.to_string().contains("'users'"));
    Ok(())
}

/// An empty batch bound for CSV finishes without writing a file
#[test]
fn test_empty_csv_output_is_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("users.json"), "[]")?;
    let config = users_config(&dir, "users.json", "users.csv", "")?;

    let summary = EtlEngine::new(config).run()?;

    assert!(!summary.written);
    assert_eq!(summary.output_records, 0);
    assert!(!dir.path().join("users.csv").exists());
    Ok(())
}

/// Dry runs process records but leave the output path untouched
#[test]
fn test_dry_run_does_not_write() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("users.json"),
        r#"[{"id": 1, "name": "A", "email": "a@x.com"}]"#,
    )?;
    let config = users_config(&dir, "users.json", "users.csv", "")?;

    let summary = EtlEngine::new(config).dry_run(true).run()?;

    assert!(!summary.written);
    assert_eq!(summary.output_records, 1);
    assert!(!dir.path().join("users.csv").exists());
    Ok(())
}

/// A missing source file is an I/O error
#[test]
fn test_missing_source_is_io_error() -> Result<()> {
    let dir = TempDir::new()?;
    let config = users_config(&dir, "missing.json", "users.csv", "")?;

    let err = EtlEngine::new(config).run().unwrap_err();

    assert!(matches!(err, EtlError::IoError(_)));
    Ok(())
}
