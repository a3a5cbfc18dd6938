use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{field_indices, missing_field, CellValue, SurveyRecord, SurveyTable};
use crate::error::{Dataset, SurveyError};

// ---------------------------------------------------------------------------
// Loaded workbook
// ---------------------------------------------------------------------------

/// Main and auxiliary tables read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub main: SurveyTable,
    pub auxiliary: SurveyTable,
    pub main_sheet: String,
    /// `None` when the file had a single sheet and the auxiliary table is a
    /// copy of the main one.
    pub auxiliary_sheet: Option<String>,
}

/// One sheet before numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn check_schema(&self, dataset: Dataset) -> Result<(), SurveyError> {
        match missing_field(self.headers.as_slice()) {
            Some(column) => Err(SurveyError::Schema {
                sheet: dataset.to_string(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Keep the seven survey columns, in label order, coerced to numbers.
    pub fn to_table(&self) -> SurveyTable {
        let indices = field_indices(self.headers.as_slice());
        let records = self
            .rows
            .iter()
            .map(|row| {
                SurveyRecord::from_values(indices.map(|idx| idx.and_then(|i| row.get(i)?.as_f64())))
            })
            .collect();
        SurveyTable::new(records)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey workbook.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first sheet is the main
///   data, the second (optional) the auxiliary data
/// * `.csv`     – one sheet
/// * `.json`    – `[{record}, ...]` or `{ "main": [...], "auxiliary": [...] }`
/// * `.parquet` – one sheet of flat scalar columns
///
/// Both sheets are schema-checked before any value is coerced, so a failed
/// load never yields a partial workbook.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    std::fs::metadata(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sheets = read_sheets(path)?;
    let workbook = workbook_from_sheets(sheets)?;
    log::debug!(
        "{}: main {} rows, auxiliary {} rows",
        path.display(),
        workbook.main.len(),
        workbook.auxiliary.len()
    );
    Ok(workbook)
}

/// Read the raw sheets of a file without interpreting them.
pub fn read_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_spreadsheet(path),
        "csv" => read_csv(path).map(|s| vec![s]),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path).map(|s| vec![s]),
        other => Err(SurveyError::UnsupportedFormat(other.to_string()).into()),
    }
}

/// First sheet → main, second sheet → auxiliary (or a copy of main).
pub fn workbook_from_sheets(sheets: Vec<RawSheet>) -> Result<Workbook> {
    let mut sheets = sheets.into_iter();
    let Some(main) = sheets.next() else {
        bail!("workbook contains no sheets");
    };
    let auxiliary = sheets.next();

    main.check_schema(Dataset::Main)
        .with_context(|| format!("sheet '{}'", main.name))?;
    if let Some(aux) = &auxiliary {
        aux.check_schema(Dataset::Auxiliary)
            .with_context(|| format!("sheet '{}'", aux.name))?;
    }

    let main_table = main.to_table();
    let aux_table = match &auxiliary {
        Some(aux) => aux.to_table(),
        None => main_table.clone(),
    };

    Ok(Workbook {
        main: main_table,
        auxiliary: aux_table,
        main_sheet: main.name,
        auxiliary_sheet: auxiliary.map(|s| s.name),
    })
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Only the first two sheets are read; later ones are ignored.
fn read_spreadsheet(path: &Path) -> Result<Vec<RawSheet>> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let names: Vec<String> = workbook.sheet_names().into_iter().take(2).collect();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("reading sheet '{name}'"))?;
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.map(|r| r.iter().map(spreadsheet_cell).collect()).collect();
        sheets.push(RawSheet {
            name,
            headers,
            rows,
        });
    }
    Ok(sheets)
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line.
fn read_csv(path: &Path) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawSheet {
        name: sheet_name_from_path(path),
        headers,
        rows,
    })
}

fn text_cell(s: &str) -> CellValue {
    if s.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s.to_string())
    }
}

fn sheet_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON layout, either a single sheet:
///
/// ```json
/// [ { "Longitude(°)": 116.4, "Latitude(°)": 39.9, ... }, ... ]
/// ```
///
/// or a two-sheet workbook:
///
/// ```json
/// { "main": [ {...}, ... ], "auxiliary": [ {...}, ... ] }
/// ```
fn read_json(path: &Path) -> Result<Vec<RawSheet>> {
    let text = std::fs::read_to_string(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match &root {
        JsonValue::Array(records) => Ok(vec![json_sheet(&sheet_name_from_path(path), records)?]),
        JsonValue::Object(obj) => {
            let main = obj
                .get("main")
                .and_then(JsonValue::as_array)
                .context("JSON workbook needs a 'main' array")?;
            let mut sheets = vec![json_sheet("main", main)?];
            if let Some(aux) = obj.get("auxiliary") {
                let aux = aux
                    .as_array()
                    .context("'auxiliary' must be an array of records")?;
                sheets.push(json_sheet("auxiliary", aux)?);
            }
            Ok(sheets)
        }
        _ => bail!("Expected a JSON array or object at the top level"),
    }
}

fn json_sheet(name: &str, records: &[JsonValue]) -> Result<RawSheet> {
    let mut headers: Vec<String> = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("{name}: row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    Ok(RawSheet {
        name: name.to_string(),
        headers,
        rows,
    })
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
        JsonValue::String(s) => text_cell(s),
        JsonValue::Null | JsonValue::Bool(_) => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one survey table.
///
/// Each required label is a scalar column (Float64, Float32, Int64, Int32 or
/// Utf8). Works with files written by both **Pandas** (`df.to_parquet()`)
/// and **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawSheet> {
    let file = std::fs::File::open(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawSheet {
        name: sheet_name_from_path(path),
        headers,
        rows,
    })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Empty;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Number(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| text_cell(a.value(row))),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| text_cell(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(CellValue::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FIELDS;

    fn sheet(name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn numbers(values: [f64; 7]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Number(*v)).collect()
    }

    #[test]
    fn single_sheet_copies_main_into_auxiliary() {
        let s = sheet("Sheet1", &FIELDS, vec![numbers([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])]);
        let wb = workbook_from_sheets(vec![s]).unwrap();
        assert_eq!(wb.main, wb.auxiliary);
        assert_eq!(wb.auxiliary_sheet, None);
        assert_eq!(wb.main.records[0].z, Some(7.0));
    }

    #[test]
    fn second_sheet_is_auxiliary_and_extra_sheets_are_ignored() {
        let main = sheet("M", &FIELDS, vec![numbers([0.0; 7])]);
        let aux = sheet("A", &FIELDS, vec![numbers([1.0; 7]), numbers([2.0; 7])]);
        let notes = sheet("Notes", &["Comment"], vec![vec![CellValue::Text("x".into())]]);
        let wb = workbook_from_sheets(vec![main, aux, notes]).unwrap();
        assert_eq!(wb.main.len(), 1);
        assert_eq!(wb.auxiliary.len(), 2);
        assert_eq!(wb.auxiliary_sheet.as_deref(), Some("A"));
    }

    #[test]
    fn missing_column_in_auxiliary_sheet_fails_before_coercion() {
        let main = sheet("M", &FIELDS, vec![numbers([0.0; 7])]);
        let aux = sheet("A", &FIELDS[..6], vec![]);
        let err = workbook_from_sheets(vec![main, aux]).unwrap_err();
        match err.downcast_ref::<SurveyError>() {
            Some(SurveyError::Schema { sheet, column }) => {
                assert_eq!(sheet, "auxiliary");
                assert_eq!(column, FIELDS[6]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn text_cells_are_coerced_and_blanks_are_missing() {
        let s = sheet(
            "S",
            &FIELDS,
            vec![vec![
                CellValue::Text("1.5".into()),
                CellValue::Text("n/a".into()),
                CellValue::Empty,
                CellValue::Number(4.0),
                CellValue::Number(5.0),
                CellValue::Number(6.0),
            ]],
        );
        let record = s.to_table().records[0];
        assert_eq!(record.longitude, Some(1.5));
        assert_eq!(record.latitude, None);
        assert_eq!(record.depth, None);
        assert_eq!(record.y, Some(6.0));
        // Short row: the last column is missing.
        assert_eq!(record.z, None);
    }

    #[test]
    fn empty_workbook_is_rejected() {
        assert!(workbook_from_sheets(Vec::new()).is_err());
    }
}
