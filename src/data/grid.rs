use super::model::{field_indices, missing_field, CellValue, SurveyRecord, SurveyTable, FIELDS};
use crate::error::SurveyError;

// ---------------------------------------------------------------------------
// SurveyGrid – editable text view of a survey table
// ---------------------------------------------------------------------------

/// Rows of display strings under labelled columns.
///
/// This is what the user edits. The pipeline never reads it directly; it
/// extracts a [`SurveyTable`] snapshot with [`SurveyGrid::to_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyGrid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for SurveyGrid {
    /// The seven survey columns and one blank row.
    fn default() -> Self {
        let mut grid = Self::with_headers(FIELDS.iter().map(|f| f.to_string()).collect());
        grid.append_row();
        grid
    }
}

impl SurveyGrid {
    /// An empty grid (no rows) with the given headers.
    pub fn with_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Replace the headers; existing rows are padded or truncated to match.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        let width = headers.len();
        self.headers = headers;
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Mutable access for in-place text editing.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut String> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Returns `false` when the cell is out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    /// Append one blank row.
    pub fn append_row(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }

    /// Extract a typed snapshot. Fails if a required column is absent;
    /// blank or unparsable cells become missing values.
    pub fn to_table(&self, sheet: &str) -> Result<SurveyTable, SurveyError> {
        if let Some(column) = missing_field(self.headers.as_slice()) {
            return Err(SurveyError::Schema {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
        let indices = field_indices(self.headers.as_slice());

        let records = self
            .rows
            .iter()
            .map(|row| {
                SurveyRecord::from_values(indices.map(|idx| {
                    let text = idx.and_then(|i| row.get(i))?;
                    CellValue::Text(text.clone()).as_f64()
                }))
            })
            .collect();
        Ok(SurveyTable::new(records))
    }

    /// Render a table as display text; missing values show as blank cells.
    pub fn from_table(table: &SurveyTable) -> Self {
        let mut grid = Self::with_headers(FIELDS.iter().map(|f| f.to_string()).collect());
        grid.rows = table
            .records
            .iter()
            .map(|record| {
                record
                    .values()
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        grid
    }
}
