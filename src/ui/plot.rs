use std::f64::consts::PI;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Arrows, Legend, Line, Plot, PlotPoint, PlotPoints, Text};

use rusty_compass::data::model::MagneticVector;
use rusty_compass::pipeline::VectorFields;

use crate::color::role_color;
use crate::state::{AppState, PlotSettings};

// ---------------------------------------------------------------------------
// Scene geometry
// ---------------------------------------------------------------------------

/// Axis-aligned bounds of every arrow origin in (longitude, latitude, depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    min: [f64; 3],
    max: [f64; 3],
}

impl SceneBounds {
    pub fn from_fields(fields: &VectorFields) -> Option<Self> {
        let mut origins = fields.iter().flat_map(|f| f.origins.iter());
        let first = *origins.next()?;
        let mut bounds = SceneBounds {
            min: first,
            max: first,
        };
        for p in origins {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }

    /// Map a point into `[-1, 1]` per axis. A flat axis maps to 0.
    pub fn normalize(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for axis in 0..3 {
            let span = self.max[axis] - self.min[axis];
            if span > 0.0 {
                let mid = 0.5 * (self.max[axis] + self.min[axis]);
                out[axis] = 2.0 * (p[axis] - mid) / span;
            }
        }
        out
    }
}

/// Orthographic projection: rotate by `yaw` about the depth axis, tilt by
/// `pitch`, keep the two screen coordinates.
pub fn project(p: [f64; 3], yaw: f64, pitch: f64) -> [f64; 2] {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let x = p[0] * cy - p[1] * sy;
    let y = p[0] * sy + p[1] * cy;
    [x, p[2] * cp + y * sp]
}

/// Tip of a fixed-length arrow along `v` from `origin` (normalised space).
/// Zero or non-finite vectors have no direction and are skipped.
pub fn arrow_tip(origin: [f64; 3], v: &MagneticVector, length: f64) -> Option<[f64; 3]> {
    let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if !(norm.is_finite() && norm > 0.0) {
        return None;
    }
    let k = length / norm;
    Some([
        origin[0] + v[0] * k,
        origin[1] + v[1] * k,
        origin[2] + v[2] * k,
    ])
}

// ---------------------------------------------------------------------------
// Vector plot (central panel)
// ---------------------------------------------------------------------------

const AXES: [(&str, [f64; 3]); 3] = [
    ("Longitude", [1.0, 0.0, 0.0]),
    ("Latitude", [0.0, 1.0, 0.0]),
    ("Depth", [0.0, 0.0, 1.0]),
];

/// Render the three vector fields of the last run in the central panel.
pub fn vector_plot(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Fill in the tables or open a workbook, then press \"Correct & plot\"");
        });
        return;
    };
    let fields = &report.fields;
    let Some(bounds) = SceneBounds::from_fields(fields) else {
        return;
    };

    camera_controls(ui, &mut state.plot);
    let view = state.plot;

    let response = Plot::new("vector_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_boxed_zoom(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, dir) in AXES {
                let from = project([-1.0, -1.0, -1.0], view.yaw, view.pitch);
                let end = [
                    -1.0 + 2.0 * dir[0],
                    -1.0 + 2.0 * dir[1],
                    -1.0 + 2.0 * dir[2],
                ];
                let to = project(end, view.yaw, view.pitch);
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![from, to]))
                        .color(Color32::GRAY)
                        .width(1.0),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new(to[0], to[1]),
                    RichText::new(name).color(Color32::GRAY),
                ));
            }

            for field in fields.iter() {
                let mut origins = Vec::with_capacity(field.len());
                let mut tips = Vec::with_capacity(field.len());
                for (origin, v) in field.arrows() {
                    let o = bounds.normalize(*origin);
                    let Some(tip) = arrow_tip(o, v, view.arrow_length) else {
                        continue;
                    };
                    origins.push(project(o, view.yaw, view.pitch));
                    tips.push(project(tip, view.yaw, view.pitch));
                }
                plot_ui.arrows(
                    Arrows::new(PlotPoints::from(origins), PlotPoints::from(tips))
                        .name(field.role.label())
                        .color(role_color(field.role))
                        .tip_length(8.0),
                );
            }
        });

    // Drag to rotate.
    if response.response.dragged() {
        let delta = response.response.drag_delta();
        state.plot.yaw += f64::from(delta.x) * 0.01;
        state.plot.pitch = (state.plot.pitch + f64::from(delta.y) * 0.01).clamp(-1.5, 1.5);
    }
}

fn camera_controls(ui: &mut Ui, plot: &mut PlotSettings) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::Slider::new(&mut plot.yaw, -PI..=PI).text("Yaw"));
        ui.add(egui::Slider::new(&mut plot.pitch, -1.5..=1.5).text("Pitch"));
        ui.add(egui::Slider::new(&mut plot.arrow_length, 0.02..=0.6).text("Arrow length"));
        if ui.button("Reset view").clicked() {
            *plot = PlotSettings::default();
        }
    });
}
