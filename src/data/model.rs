use std::fmt;

use serde::Serialize;

use crate::error::{Dataset, SurveyError};

// ---------------------------------------------------------------------------
// Column labels
// ---------------------------------------------------------------------------

pub const LONGITUDE: &str = "Longitude(°)";
pub const LATITUDE: &str = "Latitude(°)";
pub const VERTICAL_DEPTH: &str = "Vertical Depth(m)";
pub const WELLHEAD_ELEVATION: &str = "Wellhead Elevation(m)";
pub const X_COMPONENT: &str = "X-component(nT)";
pub const Y_COMPONENT: &str = "Y-component(nT)";
pub const Z_COMPONENT: &str = "Z-component(nT)";

/// The seven required columns, in display order.
pub const FIELDS: [&str; 7] = [
    LONGITUDE,
    LATITUDE,
    VERTICAL_DEPTH,
    WELLHEAD_ELEVATION,
    X_COMPONENT,
    Y_COMPONENT,
    Z_COMPONENT,
];

/// First required label absent from `headers`, if any.
pub fn missing_field<S: AsRef<str>>(headers: &[S]) -> Option<&'static str> {
    FIELDS
        .iter()
        .find(|field| !headers.iter().any(|h| h.as_ref().trim() == **field))
        .copied()
}

/// Position of each required label within `headers`.
///
/// Callers check [`missing_field`] first; a missing label maps to `None`.
pub fn field_indices<S: AsRef<str>>(headers: &[S]) -> [Option<usize>; 7] {
    FIELDS.map(|field| headers.iter().position(|h| h.as_ref().trim() == field))
}

// ---------------------------------------------------------------------------
// CellValue – one untyped cell of an external grid
// ---------------------------------------------------------------------------

/// A raw cell as read from a workbook, CSV or JSON sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric coercion: numbers pass through, text is parsed, anything
    /// else (including NaN) is missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty => return None,
        };
        (!v.is_nan()).then_some(v)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Empty => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// SurveyRecord – one measurement row
// ---------------------------------------------------------------------------

pub type MagneticVector = [f64; 3];

/// Plot origin of a measurement. Never transformed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
    pub elevation: f64,
}

impl GeoPosition {
    /// (longitude, latitude, depth) as flat Cartesian plot axes.
    pub fn plot_origin(&self) -> [f64; 3] {
        [self.longitude, self.latitude, self.depth]
    }
}

/// A survey row. `None` marks a blank or unparsable cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SurveyRecord {
    #[serde(rename = "Longitude(°)")]
    pub longitude: Option<f64>,
    #[serde(rename = "Latitude(°)")]
    pub latitude: Option<f64>,
    #[serde(rename = "Vertical Depth(m)")]
    pub depth: Option<f64>,
    #[serde(rename = "Wellhead Elevation(m)")]
    pub elevation: Option<f64>,
    #[serde(rename = "X-component(nT)")]
    pub x: Option<f64>,
    #[serde(rename = "Y-component(nT)")]
    pub y: Option<f64>,
    #[serde(rename = "Z-component(nT)")]
    pub z: Option<f64>,
}

impl SurveyRecord {
    /// Build from values in [`FIELDS`] order.
    pub fn from_values(values: [Option<f64>; 7]) -> Self {
        let [longitude, latitude, depth, elevation, x, y, z] = values;
        Self {
            longitude,
            latitude,
            depth,
            elevation,
            x,
            y,
            z,
        }
    }

    /// Values in [`FIELDS`] order.
    pub fn values(&self) -> [Option<f64>; 7] {
        [
            self.longitude,
            self.latitude,
            self.depth,
            self.elevation,
            self.x,
            self.y,
            self.z,
        ]
    }

    pub fn position(&self) -> Option<GeoPosition> {
        Some(GeoPosition {
            longitude: self.longitude?,
            latitude: self.latitude?,
            depth: self.depth?,
            elevation: self.elevation?,
        })
    }

    pub fn vector(&self) -> Option<MagneticVector> {
        Some([self.x?, self.y?, self.z?])
    }

    /// A row takes part in computation only when all seven fields are present.
    pub fn is_valid(&self) -> bool {
        self.values().iter().all(Option::is_some)
    }
}

// ---------------------------------------------------------------------------
// SurveyTable
// ---------------------------------------------------------------------------

/// An immutable snapshot of one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    pub records: Vec<SurveyRecord>,
}

/// The complete rows of a table, split into index-aligned columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidRows {
    pub positions: Vec<GeoPosition>,
    pub vectors: Vec<MagneticVector>,
    /// Row index in the source table for each entry.
    pub source_rows: Vec<usize>,
}

impl ValidRows {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Keep the entries at `indices`, in the given order. Out-of-range
    /// indices are skipped.
    pub fn select(&self, indices: &[usize]) -> ValidRows {
        let mut out = ValidRows::default();
        for &i in indices {
            if i < self.len() {
                out.positions.push(self.positions[i]);
                out.vectors.push(self.vectors[i]);
                out.source_rows.push(self.source_rows[i]);
            }
        }
        out
    }
}

impl SurveyTable {
    pub fn new(records: Vec<SurveyRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Extract the complete rows. Incomplete rows are skipped silently; a
    /// present but non-finite value is a [`SurveyError::Parse`].
    pub fn valid_rows(&self, dataset: Dataset) -> Result<ValidRows, SurveyError> {
        let mut rows = ValidRows::default();
        for (row, record) in self.records.iter().enumerate() {
            if let Some((col, value)) = record
                .values()
                .iter()
                .enumerate()
                .find_map(|(c, v)| v.filter(|v| !v.is_finite()).map(|v| (c, v)))
            {
                return Err(SurveyError::Parse {
                    dataset,
                    row,
                    column: FIELDS[col].to_string(),
                    value: value.to_string(),
                });
            }
            if let (Some(position), Some(vector)) = (record.position(), record.vector()) {
                rows.positions.push(position);
                rows.vectors.push(vector);
                rows.source_rows.push(row);
            }
        }
        Ok(rows)
    }
}
