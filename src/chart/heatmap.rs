use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Yellow-orange-red colour stops, light to dark
const YLORRD: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Colour for `t` in `0.0..=1.0` on the yellow-orange-red ramp
pub fn ylorrd(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (YLORRD.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(YLORRD.len() - 1);
    let frac = pos - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (YLORRD[lo], YLORRD[hi]);
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Annotated heatmap: one row per `row_labels` entry, one column per `col_labels` entry.
/// Rows starting at `row_offset` are drawn; columns that do not fit are dropped.
pub struct Heatmap<'a> {
    row_labels: Vec<String>,
    col_labels: &'a [String],
    cells: &'a [Vec<Option<f64>>],
    row_offset: usize,
}

impl<'a> Heatmap<'a> {
    pub fn new(row_labels: Vec<String>, col_labels: &'a [String], cells: &'a [Vec<Option<f64>>]) -> Self {
        Self {
            row_labels,
            col_labels,
            cells,
            row_offset: 0,
        }
    }

    pub fn row_offset(mut self, offset: usize) -> Self {
        self.row_offset = offset;
        self
    }

    fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Width of each value column: widest annotation or label, padded by one
    fn cell_width(&self) -> usize {
        let values = self
            .cells
            .iter()
            .flatten()
            .flatten()
            .map(|v| format!("{v:.0}").len());
        let labels = self.col_labels.iter().map(|l| l.chars().count());
        values.chain(labels).max().unwrap_or(0).clamp(4, 12) + 1
    }
}

impl Widget for Heatmap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || self.col_labels.is_empty() {
            return;
        }
        let label_w = self.row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 1;
        let cell_w = self.cell_width();
        let fit = (area.width as usize).saturating_sub(label_w) / cell_w;
        let visible_cols = fit.min(self.col_labels.len());
        let (lo, hi) = self.value_range().unwrap_or((0.0, 0.0));
        let span = hi - lo;

        let header_style = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
        for (c, label) in self.col_labels.iter().take(visible_cols).enumerate() {
            let x = area.x + (label_w + c * cell_w) as u16;
            let text: String = label.chars().take(cell_w - 1).collect();
            buf.set_string(x, area.y, text, header_style);
        }

        let body_rows = (area.height - 1) as usize;
        let rows = self
            .row_labels
            .iter()
            .zip(self.cells)
            .skip(self.row_offset)
            .take(body_rows);
        for (r, (label, values)) in rows.enumerate() {
            let y = area.y + 1 + r as u16;
            buf.set_stringn(area.x, y, label, label_w, Style::default().fg(Color::Gray));

            for (c, value) in values.iter().take(visible_cols).enumerate() {
                let x = area.x + (label_w + c * cell_w) as u16;
                let Some(v) = value else {
                    continue;
                };
                let t = if span > 0.0 { (v - lo) / span } else { 0.5 };
                let fg = if t > 0.55 { Color::White } else { Color::Black };
                let text = format!("{:>width$}", format!("{v:.0}"), width = cell_w - 1);
                let style = Style::default().bg(ylorrd(t)).fg(fg);
                buf.set_stringn(x, y, format!("{text} "), cell_w, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ylorrd(0.0), Color::Rgb(0xff, 0xff, 0xcc));
        assert_eq!(ylorrd(1.0), Color::Rgb(0x80, 0x00, 0x26));
        assert_eq!(ylorrd(7.0), ylorrd(1.0));
        assert_eq!(ylorrd(f64::NAN), ylorrd(0.0));
    }

    #[test]
    fn test_renders_annotated_cells() {
        let regions = vec!["A".to_string(), "B".to_string()];
        let cells = vec![vec![Some(100.0), Some(200.0)], vec![None, Some(150.0)]];
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        Heatmap::new(vec!["2020".into(), "2021".into()], &regions, &cells).render(area, &mut buf);

        let row = |y: u16| -> String { (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect() };
        assert!(row(0).contains('A') && row(0).contains('B'));
        assert!(row(1).starts_with("2020"));
        assert!(row(1).contains("100") && row(1).contains("200"));
        assert!(row(2).contains("150"));

        // Lowest value is the lightest colour, highest the darkest
        let first_cell_x = 5;
        assert_eq!(buf[(first_cell_x, 1)].bg, ylorrd(0.0));
        assert_eq!(buf[(first_cell_x + 5, 1)].bg, ylorrd(1.0));
    }

    #[test]
    fn test_row_offset_skips_rows() {
        let regions = vec!["A".to_string()];
        let cells = vec![vec![Some(1.0)], vec![Some(2.0)]];
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        Heatmap::new(vec!["2020".into(), "2021".into()], &regions, &cells)
            .row_offset(1)
            .render(area, &mut buf);
        let row: String = (0..area.width).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.starts_with("2021"));
    }
}
