use eframe::egui::{self, Color32, RichText, Ui};

use rusty_compass::data::model::FIELDS;

use crate::state::{AppState, Sheet};
use crate::ui::table::survey_table;

// ---------------------------------------------------------------------------
// Left side panel – data tables
// ---------------------------------------------------------------------------

/// Render the left panel: sheet tabs, the active editable table and the
/// status line.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for sheet in [Sheet::Main, Sheet::Auxiliary] {
            let rows = state.grid(sheet).row_count();
            ui.selectable_value(
                &mut state.active_sheet,
                sheet,
                format!("{} ({rows})", sheet.label()),
            );
        }
    });
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Add main row").clicked() {
            state.append_row(Sheet::Main);
        }
        if ui.button("Add auxiliary row").clicked() {
            state.append_row(Sheet::Auxiliary);
        }
    });

    // Status line at the bottom, table fills the rest.
    egui::TopBottomPanel::bottom("status_bar")
        .resizable(false)
        .show_inside(ui, |ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Columns: {}", FIELDS.join(", ")))
                    .small()
                    .weak(),
            );
            let mut text = RichText::new(&state.status_message);
            if state.status_is_error {
                text = text.color(Color32::RED);
            }
            ui.add(egui::Label::new(text).wrap());
        });

    let sheet = state.active_sheet;
    ui.push_id(sheet, |ui: &mut Ui| {
        survey_table(ui, state.grid_mut(sheet));
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(RichText::new("Correct & plot").strong())
            .clicked()
        {
            state.process();
        }

        ui.separator();

        ui.add(
            egui::Slider::new(&mut state.config.blend_factor, 0.0..=1.0)
                .text("Blend factor"),
        )
        .on_hover_text("0 keeps the main vectors, 1 replaces them by the auxiliary reference");

        ui.separator();

        let label = if state.console.visible {
            "Hide console"
        } else {
            "Show console"
        };
        if ui.selectable_label(state.console.visible, label).clicked() {
            state.console.toggle();
        }

        if let Some(path) = &state.source_path {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey workbook")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if state.load_workbook(&path) {
            log::info!(
                "Loaded {} main and {} auxiliary rows from {}",
                state.main_grid.row_count(),
                state.aux_grid.row_count(),
                path.display()
            );
        }
    }
}
