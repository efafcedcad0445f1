//! Tests for reading input rows.

use rowsmith::{BatchErrorKind, IoErrorKind, RowsmithErrorKind, parse_rows, read_rows};
use std::io::Write;

#[test]
fn test_parse_rows_stringifies_scalars() {
    let rows = parse_rows(r#"[{"name":"Bob","age":41,"vip":true,"note":null}]"#).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(rows[0]["age"], "41");
    assert_eq!(rows[0]["vip"], "true");
    assert_eq!(rows[0]["note"], "");
}

#[test]
fn test_parse_rows_keeps_order() {
    let rows = parse_rows(r#"[{"id":"1"},{"id":"2"},{"id":"3"}]"#).unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_parse_rows_rejects_non_arrays_and_non_objects() {
    for input in [r#"{"id":1}"#, r#"[1, 2]"#, "not json"] {
        let err = parse_rows(input).unwrap_err();
        let batch = err.as_batch().unwrap();
        assert!(matches!(batch.kind(), BatchErrorKind::Validation(_)), "{input}");
    }
}

#[test]
fn test_read_rows_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"[{"product":"lamp"}]"#).unwrap();

    let rows = read_rows(file.path()).unwrap();
    assert_eq!(rows[0]["product"], "lamp");

}

#[test]
fn test_read_rows_reports_missing_file_as_io() {
    let err = read_rows("/nonexistent/rows.json").unwrap_err();
    let RowsmithErrorKind::Io(io) = err.kind() else {
        panic!("expected an I/O error, got {err}");
    };
    assert!(
        matches!(io.kind(), IoErrorKind::FileRead { path, .. } if path == "/nonexistent/rows.json")
    );
    assert!(err.as_batch().is_none());
}
