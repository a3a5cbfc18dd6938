use eframe::egui;

use crate::state::AppState;
use crate::ui::{console, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyCompassApp {
    pub state: AppState,
}

impl eframe::App for RustyCompassApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: console ----
        if self.state.console.visible {
            egui::TopBottomPanel::bottom("console")
                .resizable(true)
                .default_height(160.0)
                .show(ctx, |ui| {
                    console::console_panel(ui, &mut self.state.console);
                });
        }

        // ---- Left side panel: data tables ----
        egui::SidePanel::left("data_panel")
            .default_width(520.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: 3-D vector plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::vector_plot(ui, &mut self.state);
        });
    }
}
