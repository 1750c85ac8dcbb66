use super::{format_compact, render_layer, ChartLayout, Scale};
use crate::braille::BrailleCanvas;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Braille line chart with point markers, horizontal grid and min/max axis labels
pub struct LineChart<'a> {
    points: &'a [(f64, f64)],
    grid: bool,
}

impl<'a> LineChart<'a> {
    pub fn new(points: &'a [(f64, f64)]) -> Self {
        Self { points, grid: true }
    }

    pub fn grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            ((first.0, first.0), (first.1, first.1)),
            |((x0, x1), (y0, y1)), &(x, y)| ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y))),
        ))
    }
}

impl Widget for LineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(((x_min, x_max), (y_min, y_max))) = self.bounds() else {
            return;
        };
        let y_labels = [format_compact(y_max), format_compact(y_min)];
        let label_width = y_labels.iter().map(|l| l.len()).max().unwrap_or(0) as u16;
        let Some(layout) = ChartLayout::new(area, label_width) else {
            return;
        };

        let plot = layout.plot;
        let mut canvas = BrailleCanvas::new(plot.width as usize, plot.height as usize);
        let xs = Scale::new(x_min, x_max, canvas.pixel_width());
        let ys = Scale::new(y_min, y_max, canvas.pixel_height());

        if self.grid {
            let mut grid = BrailleCanvas::new(plot.width as usize, plot.height as usize);
            let h = canvas.pixel_height() as i32;
            for quarter in 0..=4 {
                grid.dotted_hline((h - 1) * quarter / 4, 4);
            }
            render_layer(&grid, Color::DarkGray, plot, buf);
        }

        let pixels: Vec<(i32, i32)> = self
            .points
            .iter()
            .map(|&(x, y)| (xs.to_px(x), ys.to_px_inverted(y)))
            .collect();
        for pair in pixels.windows(2) {
            canvas.draw_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
        }
        for &(px, py) in &pixels {
            canvas.draw_marker(px, py);
        }
        render_layer(&canvas, Color::Cyan, plot, buf);

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

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn test_renders_axis_labels() {
        let points = [(2020.0, 300.0), (2021.0, 330.0), (2022.0, 310.0)];
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        LineChart::new(&points).render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with("330"));
        assert!(row_text(&buf, 4).starts_with("300"));
        let bottom = row_text(&buf, 5);
        assert!(bottom.contains("2020"));
        assert!(bottom.trim_end().ends_with("2022"));
    }

    #[test]
    fn test_draws_dots_in_plot() {
        let points = [(0.0, 0.0), (1.0, 1.0)];
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        LineChart::new(&points).grid(false).render(area, &mut buf);

        let braille = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                buf[(x, y)]
                    .symbol()
                    .chars()
                    .next()
                    .is_some_and(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
            })
            .count();
        assert!(braille > 0);
    }

    #[test]
    fn test_empty_points_draw_nothing() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        LineChart::new(&[]).render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
