use crate::config::PipelineConfig;
use crate::data::filter::{detect_outliers, inlier_indices};
use crate::data::model::{MagneticVector, SurveyTable, ValidRows};
use crate::data::stats::{correct_vectors, weighted_average};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::error::{Dataset, SurveyError};

// ---------------------------------------------------------------------------
// Vector fields handed to the renderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Auxiliary,
    Main,
    Corrected,
}

impl FieldRole {
    pub fn label(self) -> &'static str {
        match self {
            FieldRole::Auxiliary => "Auxiliary (outliers removed)",
            FieldRole::Main => "Main",
            FieldRole::Corrected => "Corrected main",
        }
    }
}

/// Arrows of one dataset: `origins[i]` is (longitude, latitude, depth).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub role: FieldRole,
    pub origins: Vec<[f64; 3]>,
    pub vectors: Vec<MagneticVector>,
}

impl VectorField {
    fn from_rows(role: FieldRole, rows: &ValidRows, vectors: Vec<MagneticVector>) -> Self {
        Self {
            role,
            origins: rows.positions.iter().map(|p| p.plot_origin()).collect(),
            vectors,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn arrows(&self) -> impl Iterator<Item = (&[f64; 3], &MagneticVector)> {
        self.origins.iter().zip(&self.vectors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorFields {
    pub auxiliary: VectorField,
    pub main: VectorField,
    pub corrected: VectorField,
}

impl VectorFields {
    pub fn iter(&self) -> impl Iterator<Item = &VectorField> {
        [&self.auxiliary, &self.main, &self.corrected].into_iter()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Which branch produced the auxiliary reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryState {
    /// One complete row: used as-is, no filtering.
    Singleton,
    /// Outlier filter applied, `rejected` rows dropped.
    Filtered { rejected: usize },
    /// Every row was flagged; the unfiltered set was used instead.
    Unfiltered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReport {
    pub auxiliary_mean: MagneticVector,
    pub auxiliary_state: AuxiliaryState,
    /// Corrected vectors, index-aligned with the main table's valid rows.
    pub corrected: Vec<MagneticVector>,
    pub fields: VectorFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(CorrectionReport),
    Aborted { severity: Severity, message: String },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&CorrectionReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Aborted { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline and convert every failure into an
    /// [`RunOutcome::Aborted`] after reporting it to `sink`.
    pub fn process(
        &self,
        main: &SurveyTable,
        auxiliary: &SurveyTable,
        sink: &mut dyn DiagnosticSink,
    ) -> RunOutcome {
        match self.run(main, auxiliary, sink) {
            Ok(report) => RunOutcome::Completed(report),
            Err(e) => {
                let (severity, message) = match &e {
                    SurveyError::EmptyDataset { .. } => (
                        Severity::Warn,
                        format!("incomplete data, cannot compute: {e}"),
                    ),
                    SurveyError::Parse { .. } => {
                        (Severity::Error, format!("data format error: {e}"))
                    }
                    _ if e.is_warning() => (Severity::Warn, e.to_string()),
                    _ => (Severity::Error, format!("correction failed: {e}")),
                };
                match severity {
                    Severity::Warn => sink.warn(&message),
                    _ => sink.error(&message),
                }
                RunOutcome::Aborted { severity, message }
            }
        }
    }

    /// The pipeline proper: extract, reduce the auxiliary set, correct.
    pub fn run(
        &self,
        main: &SurveyTable,
        auxiliary: &SurveyTable,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CorrectionReport, SurveyError> {
        self.config.validate()?;

        let main_rows = main.valid_rows(Dataset::Main)?;
        let aux_rows = auxiliary.valid_rows(Dataset::Auxiliary)?;
        if main_rows.is_empty() {
            return Err(SurveyError::EmptyDataset {
                dataset: Dataset::Main,
            });
        }
        if aux_rows.is_empty() {
            return Err(SurveyError::EmptyDataset {
                dataset: Dataset::Auxiliary,
            });
        }

        let (aux_used, auxiliary_mean, auxiliary_state) =
            reduce_auxiliary(&aux_rows, self.config.outlier_threshold, sink)?;

        sink.info(&format!("valid auxiliary rows: {}", aux_used.len()));
        sink.info(&format!(
            "auxiliary mean: {}",
            format_vector(&auxiliary_mean)
        ));

        let corrected = correct_vectors(
            &main_rows.vectors,
            auxiliary_mean,
            self.config.blend_factor,
        )?;
        if let Some(first) = corrected.first() {
            sink.info(&format!("corrected main first row: {}", format_vector(first)));
        }

        let fields = VectorFields {
            auxiliary: VectorField::from_rows(
                FieldRole::Auxiliary,
                &aux_used,
                aux_used.vectors.clone(),
            ),
            main: VectorField::from_rows(FieldRole::Main, &main_rows, main_rows.vectors.clone()),
            corrected: VectorField::from_rows(FieldRole::Corrected, &main_rows, corrected.clone()),
        };
        log::debug!(
            "pipeline done: {} main, {} auxiliary arrows",
            fields.main.len(),
            fields.auxiliary.len()
        );

        Ok(CorrectionReport {
            auxiliary_mean,
            auxiliary_state,
            corrected,
            fields,
        })
    }
}

/// Reduce the auxiliary rows to the set used for the reference and its mean.
///
/// * 0 rows: [`SurveyError::EmptyDataset`]
/// * 1 row: that row is the mean
/// * 2+ rows: z-score filter, falling back to every row if all are flagged
pub fn reduce_auxiliary(
    rows: &ValidRows,
    threshold: f64,
    sink: &mut dyn DiagnosticSink,
) -> Result<(ValidRows, MagneticVector, AuxiliaryState), SurveyError> {
    match rows.len() {
        0 => Err(SurveyError::EmptyDataset {
            dataset: Dataset::Auxiliary,
        }),
        1 => Ok((rows.clone(), rows.vectors[0], AuxiliaryState::Singleton)),
        n => {
            let mask = detect_outliers(&rows.vectors, threshold);
            let rejected = mask.iter().filter(|&&o| o).count();
            let (used, state) = if rejected == n {
                sink.warn(&format!(
                    "every auxiliary row exceeded |z| > {threshold}; using all {n} rows"
                ));
                (rows.clone(), AuxiliaryState::Unfiltered)
            } else {
                sink.info(&format!(
                    "rejected {rejected} auxiliary outlier(s) with |z| > {threshold}"
                ));
                (rows.select(&inlier_indices(&mask)), AuxiliaryState::Filtered { rejected })
            };
            let mean = weighted_average(&used.vectors, None)?;
            Ok((used, mean, state))
        }
    }
}

pub fn format_vector(v: &MagneticVector) -> String {
    format!("[{:.3}, {:.3}, {:.3}]", v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SurveyRecord;
    use approx::assert_relative_eq;
    use crate::diagnostics::Diagnostic;

    fn rows(vectors: &[MagneticVector]) -> ValidRows {
        let table = SurveyTable::new(
            vectors
                .iter()
                .map(|v| {
                    SurveyRecord::from_values([0.0, 0.0, 0.0, 0.0, v[0], v[1], v[2]].map(Some))
                })
                .collect(),
        );
        table.valid_rows(Dataset::Auxiliary).unwrap()
    }

    #[test]
    fn singleton_skips_filtering() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let (used, mean, state) =
            reduce_auxiliary(&rows(&[[1.5, -2.0, 9.0]]), 3.0, &mut sink).unwrap();
        assert_eq!(mean, [1.5, -2.0, 9.0]);
        assert_eq!(used.len(), 1);
        assert_eq!(state, AuxiliaryState::Singleton);
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_auxiliary_is_rejected() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert!(matches!(
            reduce_auxiliary(&ValidRows::default(), 3.0, &mut sink),
            Err(SurveyError::EmptyDataset { dataset: Dataset::Auxiliary })
        ));
    }

    #[test]
    fn outlier_is_dropped_before_averaging() {
        let mut data = vec![[10.0, 20.0, 30.0]; 15];
        data.push([10.0, 20.0, 9000.0]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let (used, mean, state) = reduce_auxiliary(&rows(&data), 3.0, &mut sink).unwrap();
        assert_eq!(used.len(), 15);
        assert_relative_eq!(mean[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(mean[2], 30.0, epsilon = 1e-9);
        assert_eq!(state, AuxiliaryState::Filtered { rejected: 1 });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].severity, Severity::Info);
    }

    #[test]
    fn all_flagged_falls_back_to_full_set() {
        // Tiny threshold: every non-central row is flagged, and no row sits
        // exactly on the mean.
        let data = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let mut sink: Vec<Diagnostic> = Vec::new();
        let (used, mean, state) = reduce_auxiliary(&rows(&data), 0.5, &mut sink).unwrap();
        assert_eq!(state, AuxiliaryState::Unfiltered);
        assert_eq!(used.len(), 2);
        assert_eq!(mean, [5.0, 0.0, 0.0]);
        assert_eq!(sink[0].severity, Severity::Warn);
    }

    #[test]
    fn format_vector_uses_three_decimals() {
        assert_eq!(format_vector(&[0.0, 1.25, -11.0]), "[0.000, 1.250, -11.000]");
    }
}
