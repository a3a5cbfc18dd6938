use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two survey tables an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Main,
    Auxiliary,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Main => write!(f, "main"),
            Dataset::Auxiliary => write!(f, "auxiliary"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("{sheet} sheet is missing column: {column}")]
    Schema { sheet: String, column: String },

    #[error("{dataset} data, row {row}, column {column}: '{value}' is not a finite number")]
    Parse {
        dataset: Dataset,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{dataset} data has no complete rows")]
    EmptyDataset { dataset: Dataset },

    #[error("{0}")]
    Domain(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

impl SurveyError {
    /// Recoverable anomalies are reported as warnings, everything else as errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, SurveyError::EmptyDataset { .. } | SurveyError::Domain(_))
    }
}
