//! Tests for workbook ingestion.
//!
//! Files are written to a temporary directory in each of the supported
//! single- and multi-sheet layouts, then loaded back through
//! `load_workbook`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet};
use tempfile::TempDir;

use rusty_compass::data::loader::load_workbook;
use rusty_compass::data::model::{FIELDS, X_COMPONENT, Z_COMPONENT};
use rusty_compass::{Orchestrator, RunOutcome, SurveyError};

fn csv_header() -> String {
    FIELDS.join(",")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn schema_error(path: &Path) -> (String, String) {
    let err = load_workbook(path).unwrap_err();
    match err.downcast_ref::<SurveyError>() {
        Some(SurveyError::Schema { sheet, column }) => (sheet.clone(), column.clone()),
        other => panic!("expected schema error, got {other:?} ({err:#})"),
    }
}

/// Header row followed by numeric rows.
fn fill_sheet(sheet: &mut Worksheet, headers: &[&str], rows: &[[f64; 7]]) {
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, v) in row.iter().enumerate().take(headers.len()) {
            sheet.write_number(r as u32 + 1, col as u16, *v).unwrap();
        }
    }
}

// ============================================================================
// Spreadsheets
// ============================================================================

#[test]
fn test_xlsx_two_sheets_with_text_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.xlsx");

    let mut book = XlsxWorkbook::new();
    {
        let main = book.add_worksheet().set_name("Main").unwrap();
        let mut headers: Vec<String> = FIELDS.iter().map(|f| f.to_string()).collect();
        headers[0] = format!("  {}  ", FIELDS[0]);
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
        fill_sheet(main, &headers, &[[1.0, 1.0, 0.0, 0.0, 10.0, 0.0, 0.0]]);
    }
    {
        let aux = book.add_worksheet().set_name("Aux").unwrap();
        fill_sheet(
            aux,
            &FIELDS,
            &[
                [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 10.0],
                [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ],
        );
        // Numeric text is coerced, other text is missing.
        aux.write_string(2, 6, "12").unwrap();
        aux.write_string(3, 0, "abc").unwrap();
    }
    {
        let notes = book.add_worksheet().set_name("Notes").unwrap();
        notes.write_string(0, 0, "ignored").unwrap();
    }
    book.save(&path).unwrap();

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.main_sheet, "Main");
    assert_eq!(wb.auxiliary_sheet.as_deref(), Some("Aux"));
    assert_eq!(wb.main.len(), 1);
    assert_eq!(wb.main.records[0].longitude, Some(1.0));
    assert_eq!(wb.main.records[0].x, Some(10.0));
    assert_eq!(wb.auxiliary.len(), 3);
    assert_eq!(wb.auxiliary.records[1].z, Some(12.0));
    assert_eq!(wb.auxiliary.records[2].longitude, None);
    assert!(!wb.auxiliary.records[2].is_valid());

    match Orchestrator::default().process(&wb.main, &wb.auxiliary, &mut Vec::new()) {
        RunOutcome::Completed(report) => {
            assert_eq!(report.fields.auxiliary.len(), 2);
            assert_eq!(report.corrected, vec![[0.0, 0.0, 11.0]]);
        }
        RunOutcome::Aborted { message, .. } => panic!("pipeline aborted: {message}"),
    }
}

#[test]
fn test_xlsx_single_sheet_copies_main() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("single.xlsx");

    let mut book = XlsxWorkbook::new();
    fill_sheet(
        book.add_worksheet(),
        &FIELDS,
        &[
            [116.1, 39.9, 1200.0, 45.0, 100.5, -20.0, 48000.0],
            [116.2, 39.8, 1250.0, 45.0, 101.0, -21.0, 48010.0],
        ],
    );
    book.save(&path).unwrap();

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.main_sheet, "Sheet1");
    assert_eq!(wb.auxiliary_sheet, None);
    assert_eq!(wb.main, wb.auxiliary);
    assert_eq!(wb.main.len(), 2);
    assert_eq!(wb.main.records[1].z, Some(48010.0));
}

#[test]
fn test_xlsx_auxiliary_sheet_missing_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.xlsx");

    let mut book = XlsxWorkbook::new();
    fill_sheet(
        book.add_worksheet().set_name("Main").unwrap(),
        &FIELDS,
        &[[0.0; 7]],
    );
    let headers: Vec<&str> = FIELDS.iter().copied().filter(|f| *f != Z_COMPONENT).collect();
    fill_sheet(
        book.add_worksheet().set_name("Aux").unwrap(),
        &headers,
        &[[0.0; 7]],
    );
    book.save(&path).unwrap();

    let (sheet, column) = schema_error(&path);
    assert_eq!(sheet, "auxiliary");
    assert_eq!(column, Z_COMPONENT);
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_single_sheet_copies_main() {
    let dir = TempDir::new().unwrap();
    let body = format!(
        "{}\n116.1,39.9,1200,45,100.5,-20,48000\n116.2,39.8,,45,abc,-21,48010\n",
        csv_header()
    );
    let path = write(&dir, "survey.csv", &body);

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.main_sheet, "survey");
    assert_eq!(wb.auxiliary_sheet, None);
    assert_eq!(wb.main, wb.auxiliary);
    assert_eq!(wb.main.len(), 2);
    assert_eq!(wb.main.records[0].x, Some(100.5));
    assert_eq!(wb.main.records[1].depth, None);
    assert_eq!(wb.main.records[1].x, None);
    assert!(wb.main.records[0].is_valid());
    assert!(!wb.main.records[1].is_valid());
}

#[test]
fn test_csv_extra_and_reordered_columns() {
    let dir = TempDir::new().unwrap();
    let mut headers: Vec<&str> = FIELDS.iter().rev().copied().collect();
    headers.push("Operator");
    let body = format!("{}\n7,6,5,4,3,2,1,Alice\n", headers.join(","));
    let path = write(&dir, "reordered.csv", &body);

    let record = load_workbook(&path).unwrap().main.records[0];
    assert_eq!(record.longitude, Some(1.0));
    assert_eq!(record.z, Some(7.0));
}

#[test]
fn test_csv_missing_column_names_it() {
    let dir = TempDir::new().unwrap();
    let headers: Vec<&str> = FIELDS.iter().copied().filter(|f| *f != X_COMPONENT).collect();
    let body = format!("{}\n1,2,3,4,5,6\n", headers.join(","));
    let path = write(&dir, "broken.csv", &body);

    let (sheet, column) = schema_error(&path);
    assert_eq!(sheet, "main");
    assert_eq!(column, X_COMPONENT);
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_two_sheet_workbook() {
    let dir = TempDir::new().unwrap();
    let record = |z: f64| {
        let mut obj = serde_json::Map::new();
        for (i, field) in FIELDS.iter().enumerate() {
            let value = if i == 6 { z } else { 1.0 };
            obj.insert(field.to_string(), serde_json::json!(value));
        }
        serde_json::Value::Object(obj)
    };
    let doc = serde_json::json!({
        "main": [record(5.0)],
        "auxiliary": [record(10.0), record(12.0), record(14.0)],
    });
    let path = write(&dir, "survey.json", &doc.to_string());

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.main.len(), 1);
    assert_eq!(wb.auxiliary.len(), 3);
    assert_eq!(wb.auxiliary_sheet.as_deref(), Some("auxiliary"));
    assert_eq!(wb.auxiliary.records[2].z, Some(14.0));
}

#[test]
fn test_json_nulls_and_strings() {
    let dir = TempDir::new().unwrap();
    let mut obj = serde_json::Map::new();
    for field in FIELDS {
        obj.insert(field.to_string(), serde_json::json!("2.5"));
    }
    obj.insert(X_COMPONENT.to_string(), serde_json::Value::Null);
    let doc = serde_json::Value::Array(vec![serde_json::Value::Object(obj)]);
    let path = write(&dir, "records.json", &doc.to_string());

    let record = load_workbook(&path).unwrap().main.records[0];
    assert_eq!(record.longitude, Some(2.5));
    assert_eq!(record.x, None);
}

#[test]
fn test_json_auxiliary_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let full: serde_json::Map<String, serde_json::Value> = FIELDS
        .iter()
        .map(|f| (f.to_string(), serde_json::json!(0.0)))
        .collect();
    let mut partial = full.clone();
    partial.remove(FIELDS[2]);
    let doc = serde_json::json!({ "main": [full], "auxiliary": [partial] });
    let path = write(&dir, "partial.json", &doc.to_string());

    let (sheet, column) = schema_error(&path);
    assert_eq!(sheet, "auxiliary");
    assert_eq!(column, FIELDS[2]);
}

// ============================================================================
// Parquet
// ============================================================================

#[test]
fn test_parquet_scalar_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.parquet");

    let mut fields = Vec::new();
    let mut columns: Vec<Arc<dyn arrow::array::Array>> = Vec::new();
    for (i, name) in FIELDS.iter().enumerate() {
        match i {
            // Integer depth, text latitude, float everything else.
            1 => {
                fields.push(Field::new(*name, DataType::Utf8, true));
                columns.push(Arc::new(StringArray::from(vec![Some("39.5"), None])));
            }
            2 => {
                fields.push(Field::new(*name, DataType::Int64, false));
                columns.push(Arc::new(Int64Array::from(vec![1200, 1300])));
            }
            _ => {
                fields.push(Field::new(*name, DataType::Float64, false));
                columns.push(Arc::new(Float64Array::from(vec![i as f64, i as f64 + 0.5])));
            }
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.main.len(), 2);
    assert_eq!(wb.main.records[0].latitude, Some(39.5));
    assert_eq!(wb.main.records[1].latitude, None);
    assert_eq!(wb.main.records[1].depth, Some(1300.0));
    assert_eq!(wb.main.records[1].z, Some(6.5));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SurveyError>(),
        Some(SurveyError::Io { .. })
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "survey.txt", "whatever");
    let err = load_workbook(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SurveyError>(),
        Some(SurveyError::UnsupportedFormat(ext)) if ext == "txt"
    ));
}

#[test]
fn test_corrupt_workbook_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "corrupt.xlsx", "this is not a zip archive");
    assert!(load_workbook(&path).is_err());
}
