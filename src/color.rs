use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::Origin;

// ---------------------------------------------------------------------------
// Categorical colours
// ---------------------------------------------------------------------------

/// Fixed colour per origin, shared by the pie and the scatter legend.
pub fn origin_color(origin: Origin) -> Color32 {
    match origin {
        Origin::American => Color32::from_rgb(0x1f, 0x77, 0xb4),
        Origin::European => Color32::from_rgb(0xff, 0x7f, 0x0e),
        Origin::Japanese => Color32::from_rgb(0x2c, 0xa0, 0x2c),
    }
}

/// Line and marker colours of the line chart, and the bar fill.
pub const LINE_COLOR: Color32 = Color32::from_rgb(0x90, 0xca, 0xf9);
pub const MARKER_COLOR: Color32 = Color32::from_rgb(0xfa, 0xcc, 0x15);
pub const BAR_COLOR: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);

// ---------------------------------------------------------------------------
// Sequential scale for the heatmap
// ---------------------------------------------------------------------------

/// Maps `[0, max]` onto a light-to-dark blue ramp, interpolated in linear RGB.
#[derive(Debug, Clone, Copy)]
pub struct SequentialBlues {
    max: f64,
}

impl SequentialBlues {
    const LOW: (u8, u8, u8) = (0xf7, 0xfb, 0xff);
    const HIGH: (u8, u8, u8) = (0x08, 0x30, 0x6b);

    pub fn new(max: f64) -> Self {
        Self { max }
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = if self.max > 0.0 {
            (value / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let low: LinSrgb = Srgb::<u8>::from(Self::LOW).into_format::<f32>().into_linear();
        let high: LinSrgb = Srgb::<u8>::from(Self::HIGH).into_format::<f32>().into_linear();
        let rgb = Srgb::<f32>::from_linear(low.mix(high, t as f32)).into_format::<u8>();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}
