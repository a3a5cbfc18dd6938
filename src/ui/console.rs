use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::severity_style;
use crate::console::Console;

// ---------------------------------------------------------------------------
// Console panel (bottom)
// ---------------------------------------------------------------------------

/// Render the diagnostic console, newest line at the bottom.
pub fn console_panel(ui: &mut Ui, console: &mut Console) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Console ({} lines)", console.len()));
        if ui.small_button("Clear").clicked() {
            console.clear();
        }
        if ui.small_button("Hide").clicked() {
            console.visible = false;
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for line in console.lines() {
                let (fg, bg) = severity_style(line.severity);
                let mut text = RichText::new(line.to_string()).monospace();
                if let Some(c) = fg {
                    text = text.color(c);
                }
                if let Some(c) = bg {
                    text = text.background_color(c);
                }
                ui.add(egui::Label::new(text).wrap());
            }
        });
}
