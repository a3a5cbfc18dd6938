use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_compass::data::grid::SurveyGrid;

// ---------------------------------------------------------------------------
// Editable survey grid
// ---------------------------------------------------------------------------

/// Render `grid` as a spreadsheet-like table with a text field per cell.
pub fn survey_table(ui: &mut Ui, grid: &mut SurveyGrid) {
    let headers = grid.headers().to_vec();
    let n_rows = grid.row_count();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(32.0))
            .columns(Column::initial(110.0).at_least(60.0).clip(true), headers.len())
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for h in &headers {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(22.0, n_rows, |mut row| {
                    let r = row.index();
                    row.col(|ui| {
                        ui.label((r + 1).to_string());
                    });
                    for c in 0..headers.len() {
                        row.col(|ui| {
                            if let Some(cell) = grid.cell_mut(r, c) {
                                ui.add(
                                    egui::TextEdit::singleline(cell)
                                        .desired_width(f32::INFINITY),
                                );
                            }
                        });
                    }
                });
            });
    });
}
