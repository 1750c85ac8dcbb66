use super::{format_compact, render_layer, series_color, ChartLayout, Scale};
use crate::braille::BrailleCanvas;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Stacked area chart. `stacks[layer][i]` is the cumulative top of `layer` at `xs[i]`;
/// each layer is filled down to the one below it and drawn in its own colour.
pub struct StackedAreaChart<'a> {
    xs: &'a [f64],
    stacks: &'a [Vec<f64>],
}

impl<'a> StackedAreaChart<'a> {
    pub fn new(xs: &'a [f64], stacks: &'a [Vec<f64>]) -> Self {
        Self { xs, stacks }
    }

    /// Linear interpolation of a layer at x; `xs` ascend
    fn value_at(&self, layer: &[f64], x: f64) -> f64 {
        let Some(seg) = self.xs.windows(2).position(|w| x <= w[1]) else {
            return layer.last().copied().unwrap_or(0.0);
        };
        let (x0, x1) = (self.xs[seg], self.xs[seg + 1]);
        let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
        layer[seg] + (layer[seg + 1] - layer[seg]) * t.clamp(0.0, 1.0)
    }
}

impl Widget for StackedAreaChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (Some(&x_min), Some(&x_max)) = (self.xs.first(), self.xs.last()) else {
            return;
        };
        let y_max = self
            .stacks
            .last()
            .map(|top| top.iter().copied().fold(0.0, f64::max))
            .unwrap_or(0.0);
        let y_labels = [format_compact(y_max), format_compact(0.0)];
        let label_width = y_labels.iter().map(|l| l.len()).max().unwrap_or(0) as u16;
        let Some(layout) = ChartLayout::new(area, label_width) else {
            return;
        };

        let plot = layout.plot;
        let (cols, rows) = (plot.width as usize, plot.height as usize);
        let width_px = cols * 2;
        let ys = Scale::new(0.0, y_max, rows * 4);
        let xs = Scale::new(x_min, x_max, width_px);

        let mut below = vec![0.0; width_px];
        for (idx, layer) in self.stacks.iter().enumerate() {
            let mut canvas = BrailleCanvas::new(cols, rows);
            for (px, floor) in below.iter_mut().enumerate() {
                let x = if self.xs.len() == 1 {
                    x_min
                } else {
                    xs.min() + (xs.max() - xs.min()) * px as f64 / (width_px.max(2) - 1) as f64
                };
                let top = self.value_at(layer, x);
                // Skip empty bands so lower layers stay visible
                if top > *floor {
                    canvas.fill_span(px as i32, ys.to_px_inverted(top), ys.to_px_inverted(*floor));
                }
                *floor = top;
            }
            render_layer(&canvas, series_color(idx), plot, buf);
        }

        let label_style = Style::default().fg(Color::DarkGray);
        let y_axis = layout.y_axis;
        buf.set_string(y_axis.x, y_axis.y, &y_labels[0], label_style);
        buf.set_string(y_axis.x, y_axis.y + y_axis.height - 1, &y_labels[1], label_style);

        let x_axis = layout.x_axis;
        let left = format!("{x_min:.0}");
        let right = format!("{x_max:.0}");
        buf.set_string(x_axis.x, x_axis.y, &left, label_style);
        if x_max > x_min && x_axis.width as usize > left.len() + right.len() + 1 {
            let right_x = x_axis.x + x_axis.width - right.len() as u16;
            buf.set_string(right_x, x_axis.y, &right, label_style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_interpolates() {
        let xs = [2020.0, 2022.0];
        let stacks = vec![vec![10.0, 30.0]];
        let chart = StackedAreaChart::new(&xs, &stacks);
        assert_eq!(chart.value_at(&stacks[0], 2020.0), 10.0);
        assert_eq!(chart.value_at(&stacks[0], 2021.0), 20.0);
        assert_eq!(chart.value_at(&stacks[0], 2022.0), 30.0);
    }

    #[test]
    fn test_layers_use_series_colours() {
        let xs = [2020.0, 2021.0];
        let stacks = vec![vec![50.0, 50.0], vec![100.0, 100.0]];
        let area = Rect::new(0, 0, 20, 9);
        let mut buf = Buffer::empty(area);
        StackedAreaChart::new(&xs, &stacks).render(area, &mut buf);

        let plot = ChartLayout::new(area, 3).unwrap().plot;
        // Top rows belong to the upper layer, bottom rows to the first
        let top = &buf[(plot.x + 2, plot.y)];
        let bottom = &buf[(plot.x + 2, plot.y + plot.height - 1)];
        assert_eq!(top.fg, series_color(1));
        assert_eq!(bottom.fg, series_color(0));
    }

    #[test]
    fn test_single_year_fills_width() {
        let xs = [2020.0];
        let stacks = vec![vec![5.0]];
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        StackedAreaChart::new(&xs, &stacks).render(area, &mut buf);

        let plot = ChartLayout::new(area, 1).unwrap().plot;
        let last_col = plot.x + plot.width - 1;
        assert_eq!(buf[(last_col, plot.y + plot.height - 1)].fg, series_color(0));
    }
}
