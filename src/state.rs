use std::path::{Path, PathBuf};

use rusty_compass::data::grid::SurveyGrid;
use rusty_compass::data::loader::{self, Workbook};
use rusty_compass::pipeline::format_vector;
use rusty_compass::{CorrectionReport, DiagnosticSink, Orchestrator, PipelineConfig, RunOutcome};

use crate::console::Console;

// ---------------------------------------------------------------------------
// Sheets and view settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Main,
    Auxiliary,
}

impl Sheet {
    pub fn label(self) -> &'static str {
        match self {
            Sheet::Main => "Main data",
            Sheet::Auxiliary => "Auxiliary data",
        }
    }
}

/// Orthographic camera and arrow scale of the 3-D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSettings {
    /// Rotation about the depth axis, radians.
    pub yaw: f64,
    /// Tilt toward the viewer, radians.
    pub pitch: f64,
    /// Arrow length as a fraction of the normalised scene half-width.
    pub arrow_length: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.5,
            arrow_length: 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Editable views of the two datasets.
    pub main_grid: SurveyGrid,
    pub aux_grid: SurveyGrid,

    /// Which grid the side panel shows.
    pub active_sheet: Sheet,

    pub config: PipelineConfig,
    pub plot: PlotSettings,

    /// Result of the last successful run; drives the plot.
    pub report: Option<CorrectionReport>,

    pub console: Console,

    /// Status line shown under the tables.
    pub status_message: String,
    /// Whether the status line reports a failure.
    pub status_is_error: bool,

    /// File the grids were last loaded from.
    pub source_path: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            main_grid: SurveyGrid::default(),
            aux_grid: SurveyGrid::default(),
            active_sheet: Sheet::Main,
            config: PipelineConfig::default(),
            plot: PlotSettings::default(),
            report: None,
            console: Console::default(),
            status_message: String::from(
                "Type values into the tables or load a workbook (File → Open…).",
            ),
            status_is_error: false,
            source_path: None,
        }
    }
}

impl AppState {
    pub fn grid(&self, sheet: Sheet) -> &SurveyGrid {
        match sheet {
            Sheet::Main => &self.main_grid,
            Sheet::Auxiliary => &self.aux_grid,
        }
    }

    pub fn grid_mut(&mut self, sheet: Sheet) -> &mut SurveyGrid {
        match sheet {
            Sheet::Main => &mut self.main_grid,
            Sheet::Auxiliary => &mut self.aux_grid,
        }
    }

    /// Append one blank row to a grid.
    pub fn append_row(&mut self, sheet: Sheet) {
        self.grid_mut(sheet).append_row();
    }

    fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.status_message = message.into();
        self.status_is_error = is_error;
    }

    /// Load a workbook into both grids. On failure nothing but the console
    /// and status line changes.
    pub fn load_workbook(&mut self, path: &Path) -> bool {
        self.console.show();
        match loader::load_workbook(path) {
            Ok(workbook) => {
                self.set_workbook(workbook, path);
                true
            }
            Err(e) => {
                self.console
                    .error(&format!("failed to read workbook {}: {e:#}", path.display()));
                self.set_status(format!("Error: {e:#}"), true);
                false
            }
        }
    }

    /// Replace both grids wholesale.
    pub fn set_workbook(&mut self, workbook: Workbook, path: &Path) {
        self.main_grid = SurveyGrid::from_table(&workbook.main);
        self.aux_grid = SurveyGrid::from_table(&workbook.auxiliary);
        if workbook.auxiliary_sheet.is_none() {
            self.console.info(&format!(
                "'{}' has a single sheet; auxiliary data is a copy of the main data",
                workbook.main_sheet
            ));
        }
        self.console
            .info(&format!("workbook loaded: {}", path.display()));
        self.set_status(
            format!(
                "Loaded {}: main {} rows, auxiliary {} rows",
                path.display(),
                workbook.main.len(),
                workbook.auxiliary.len()
            ),
            false,
        );
        self.source_path = Some(path.to_path_buf());
    }

    /// Extract both grids, run the correction and, on success, replace the
    /// plotted result. A failed run leaves the previous plot in place.
    pub fn process(&mut self) {
        self.console.show();

        let tables = self
            .main_grid
            .to_table("main")
            .and_then(|main| Ok((main, self.aux_grid.to_table("auxiliary")?)));
        let (main, aux) = match tables {
            Ok(tables) => tables,
            Err(e) => {
                self.console.error(&format!("cannot read tables: {e}"));
                self.set_status(format!("Error: {e}"), true);
                return;
            }
        };

        let orchestrator = Orchestrator::new(self.config);
        match orchestrator.process(&main, &aux, &mut self.console) {
            RunOutcome::Completed(report) => {
                self.console.info("plot updated");
                self.set_status(
                    format!(
                        "Correction complete. Auxiliary reference {}",
                        format_vector(&report.auxiliary_mean)
                    ),
                    false,
                );
                self.report = Some(report);
            }
            RunOutcome::Aborted { message, .. } => {
                self.set_status(message, true);
            }
        }
    }
}
