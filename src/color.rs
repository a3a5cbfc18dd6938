use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use rusty_compass::pipeline::FieldRole;
use rusty_compass::Severity;

// ---------------------------------------------------------------------------
// HSL → Color32
// ---------------------------------------------------------------------------

fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Fixed colours per dataset role
// ---------------------------------------------------------------------------

/// Auxiliary green, main blue, corrected red.
pub fn role_color(role: FieldRole) -> Color32 {
    match role {
        FieldRole::Auxiliary => hsl(120.0, 0.70, 0.40),
        FieldRole::Main => hsl(220.0, 0.80, 0.55),
        FieldRole::Corrected => hsl(0.0, 0.80, 0.55),
    }
}

// ---------------------------------------------------------------------------
// Console line styling
// ---------------------------------------------------------------------------

/// Foreground and optional background for a console line.
///
/// `None` foreground means the theme's default text colour.
pub fn severity_style(severity: Severity) -> (Option<Color32>, Option<Color32>) {
    match severity {
        Severity::Info => (None, None),
        Severity::Warn => (Some(hsl(51.0, 1.0, 0.50)), Some(hsl(120.0, 1.0, 0.10))),
        Severity::Error => (Some(hsl(0.0, 1.0, 0.50)), None),
    }
}
