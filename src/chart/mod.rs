//! Terminal chart widgets drawn with braille dots and coloured cells.

mod area;
mod heatmap;
mod line;

pub use area::StackedAreaChart;
pub use heatmap::{ylorrd, Heatmap};
pub use line::LineChart;

use crate::braille::BrailleCanvas;
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Series colours, cycled when there are more series than entries
pub const SERIES_COLORS: [Color; 10] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::Blue,
    Color::LightCyan,
    Color::LightYellow,
    Color::LightMagenta,
    Color::LightGreen,
];

pub fn series_color(idx: usize) -> Color {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

/// Compact number for axis labels: 1.2M, 45.0K, 812
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

/// Linear map from a data range onto `0..=pixels-1`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scale {
    min: f64,
    max: f64,
    pixels: usize,
}

impl Scale {
    /// A zero-width range is widened so a single value lands mid-axis
    pub fn new(min: f64, max: f64, pixels: usize) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self { min, max, pixels }
    }

    pub fn to_px(&self, value: f64) -> i32 {
        let span = self.pixels.saturating_sub(1) as f64;
        ((value - self.min) / (self.max - self.min) * span).round() as i32
    }

    /// Same mapping with the axis flipped, for screen y
    pub fn to_px_inverted(&self, value: f64) -> i32 {
        self.pixels.saturating_sub(1) as i32 - self.to_px(value)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Copy the set dots of a canvas layer into the buffer in one colour
pub(crate) fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for row in 0..area.height {
        for col in 0..area.width {
            if let Some(ch) = canvas.glyph(col as usize, row as usize) {
                buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
            }
        }
    }
}

/// Split a chart area into y-axis labels, plot and x-axis labels
pub(crate) struct ChartLayout {
    pub y_axis: Rect,
    pub plot: Rect,
    pub x_axis: Rect,
}

impl ChartLayout {
    pub fn new(area: Rect, y_label_width: u16) -> Option<Self> {
        let label_w = y_label_width + 1;
        if area.width <= label_w + 2 || area.height < 3 {
            return None;
        }
        let plot = Rect::new(area.x + label_w, area.y, area.width - label_w, area.height - 1);
        Some(Self {
            y_axis: Rect::new(area.x, area.y, label_w, area.height - 1),
            plot,
            x_axis: Rect::new(plot.x, area.y + area.height - 1, plot.width, 1),
        })
    }
}
