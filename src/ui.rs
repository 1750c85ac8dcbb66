use crate::app::{App, Loaded, Prompt, PromptMessage, Screen, Tab};
use pop_trends::chart::{format_compact, series_color, Heatmap, LineChart, StackedAreaChart};
use pop_trends::report::{
    BasicStats, ChangeAnalysis, ChangeRow, RegionalAnalysis, ReportError, Visualization, YearlyTrend,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    match &app.screen {
        Screen::Prompt(prompt) => render_prompt(frame, prompt),
        Screen::Report(loaded) => render_report(frame, app, loaded),
    }
}

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Whole numbers without decimals, everything else to two places
fn fmt_num(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn fmt_change(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{v:+.0}"),
        Some(v) => format!("{v:+.2}"),
    }
}

fn render_error(frame: &mut Frame, area: Rect, title: &str, err: &ReportError) {
    let text = Paragraph::new(Line::from(vec![
        Span::styled("⚠ ", Style::default().fg(Color::Red)),
        Span::styled(err.to_string(), Style::default().fg(Color::Red)),
    ]))
    .wrap(Wrap { trim: true })
    .block(titled_block(title));
    frame.render_widget(text, area);
}

fn render_prompt(frame: &mut Frame, prompt: &Prompt) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Prompt
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let block = titled_block("Population Trends Analysis");
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let message = match &prompt.message {
        PromptMessage::Info(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Gray)),
        PromptMessage::Error(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Red)),
    };
    let lines = vec![
        Line::from(""),
        Line::from(message),
        Line::from(""),
        Line::from(vec![
            Span::styled("CSV path: ", Style::default().fg(Color::Yellow)),
            Span::raw(prompt.input.as_str()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    let status = Paragraph::new(Line::from(Span::styled(
        " Enter:open Esc:quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(status, chunks[1]);
}

fn render_report(frame: &mut Frame, app: &App, loaded: &Loaded) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(3),    // Section
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let file_name = loaded
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| loaded.path.display().to_string());
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider(Span::styled("|", Style::default().fg(Color::DarkGray)))
        .block(titled_block(&file_name));
    frame.render_widget(tabs, chunks[0]);

    let report = &loaded.report;
    let body = chunks[1];
    let scroll = app.scroll as usize;
    match app.tab {
        Tab::BasicStats => render_basic_stats(frame, &report.basic, body, scroll),
        Tab::YearlyTrend => match &report.trend {
            Ok(trend) => render_trend(frame, trend, body, scroll),
            Err(e) => render_error(frame, body, "Yearly trend", e),
        },
        Tab::Regional => match &report.regional {
            Ok(regional) => render_regional(frame, regional, body, scroll),
            Err(e) => render_error(frame, body, "Regional analysis", e),
        },
        Tab::Changes => match &report.changes {
            Ok(changes) => render_changes(frame, changes, body, scroll),
            Err(e) => render_error(frame, body, "Change analysis", e),
        },
        Tab::Visualization => match &report.visualization {
            Ok(vis) => render_visualization(frame, vis, body, scroll),
            Err(e) => render_error(frame, body, "Visualization", e),
        },
    }

    render_status_bar(frame, loaded, chunks[2]);
}

fn render_basic_stats(frame: &mut Frame, stats: &BasicStats, area: Rect, scroll: usize) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    // Structure (dataframe info)
    let info_rows: Vec<Row> = stats
        .columns
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(idx, c)| {
            Row::new(vec![
                idx.to_string(),
                c.name.clone(),
                c.non_null.to_string(),
                c.nulls.to_string(),
                c.dtype.to_string(),
            ])
        })
        .collect();
    let title = format!(
        "Structure: {} rows x {} columns, {} duplicate rows",
        stats.rows,
        stats.columns.len(),
        stats.duplicate_rows
    );
    let info = Table::new(
        info_rows,
        [
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(vec!["#", "Column", "Non-Null", "Null", "Dtype"]).style(header_style()))
    .block(titled_block(&title));
    frame.render_widget(info, top[0]);

    // Missing values per column
    let bars: Vec<Bar> = stats
        .columns
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.nulls as u64)
                .label(Line::from(c.name.clone()))
                .style(Style::default().fg(Color::LightRed))
        })
        .collect();
    let missing = BarChart::default()
        .block(titled_block(&format!("Missing values ({} total)", stats.total_nulls())))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(top[1].width.saturating_sub(2), bars.len()))
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(Color::LightRed));
    frame.render_widget(missing, top[1]);

    // Descriptive statistics, one column per numeric field
    if stats.describe.is_empty() {
        let empty = Paragraph::new("No numeric columns").block(titled_block("Descriptive statistics"));
        frame.render_widget(empty, rows[1]);
        return;
    }
    let columns: Vec<_> = stats.describe.iter().map(|d| d.rows()).collect();
    let describe_rows: Vec<Row> = columns[0]
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            let mut cells = vec![label.to_string()];
            cells.extend(columns.iter().map(|rows| fmt_num(rows[i].1)));
            Row::new(cells)
        })
        .collect();
    let mut header = vec![String::new()];
    header.extend(stats.describe.iter().map(|d| d.column.clone()));
    let mut widths = vec![Constraint::Length(6)];
    widths.extend(stats.describe.iter().map(|_| Constraint::Min(12)));
    let describe = Table::new(describe_rows, widths)
        .header(Row::new(header).style(header_style()))
        .block(titled_block("Descriptive statistics"));
    frame.render_widget(describe, rows[1]);
}

/// Bar width that fits `count` bars with one-column gaps
fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let per_bar = width as usize / count;
    per_bar.saturating_sub(1).clamp(1, 12) as u16
}

fn render_trend(frame: &mut Frame, trend: &YearlyTrend, area: Rect, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(4)])
        .split(area);

    let block = titled_block("Total population by year");
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    let points = trend.points();
    frame.render_widget(LineChart::new(&points), inner);

    let rows: Vec<Row> = trend
        .stats
        .iter()
        .skip(scroll)
        .map(|s| {
            Row::new(vec![
                s.year.to_string(),
                fmt_num(s.mean),
                fmt_num(s.min),
                fmt_num(s.max),
                s.std.map(fmt_num).unwrap_or_else(|| "NaN".to_string()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Min(12),
            Constraint::Min(12),
            Constraint::Min(12),
        ],
    )
    .header(Row::new(vec!["Year", "Mean", "Min", "Max", "Std"]).style(header_style()))
    .block(titled_block("Population statistics by year"));
    frame.render_widget(table, chunks[1]);
}

fn render_regional(frame: &mut Frame, regional: &RegionalAnalysis, area: Rect, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(4)])
        .split(area);

    let bars: Vec<Bar> = regional
        .means
        .iter()
        .map(|m| {
            Bar::default()
                .value(m.mean.max(0.0).round() as u64)
                .text_value(format_compact(m.mean))
                .label(Line::from(m.region.clone()))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();
    let chart = BarChart::default()
        .block(titled_block("Mean population by region"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(chunks[0].width.saturating_sub(2), bars.len()))
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, chunks[0]);

    let rows: Vec<Row> = regional
        .ranges
        .iter()
        .skip(scroll)
        .map(|r| Row::new(vec![r.region.clone(), fmt_num(r.max), fmt_num(r.min)]))
        .collect();
    let table = Table::new(
        rows,
        [Constraint::Min(12), Constraint::Min(12), Constraint::Min(12)],
    )
    .header(Row::new(vec!["Region", "Max", "Min"]).style(header_style()))
    .block(titled_block("Max / min population by region"));
    frame.render_widget(table, chunks[1]);
}

fn change_table<'a>(
    title: &str,
    rows: &[ChangeRow],
    value: fn(&ChangeRow) -> String,
    label: &'a str,
    scroll: usize,
) -> Table<'a> {
    let body: Vec<Row> = rows
        .iter()
        .skip(scroll)
        .map(|r| {
            let style = match r.change {
                Some(c) if c < 0.0 => Style::default().fg(Color::LightRed),
                _ => Style::default().fg(Color::LightGreen),
            };
            Row::new(vec![r.region.clone(), r.year.to_string(), value(r)]).style(style)
        })
        .collect();
    Table::new(
        body,
        [Constraint::Min(12), Constraint::Length(6), Constraint::Min(12)],
    )
    .header(Row::new(vec!["Region", "Year", label]).style(header_style()))
    .block(titled_block(title))
}

fn render_changes(frame: &mut Frame, changes: &ChangeAnalysis, area: Rect, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let by_change = change_table(
        "Largest population change",
        &changes.top_changes,
        |r| fmt_change(r.change),
        "Change",
        scroll,
    );
    frame.render_widget(by_change, chunks[0]);

    let by_rate = change_table(
        "Largest change rate",
        &changes.top_rates,
        |r| r.rate.to_string(),
        "Rate",
        scroll,
    );
    frame.render_widget(by_rate, chunks[1]);
}

fn render_visualization(frame: &mut Frame, vis: &Visualization, area: Rect, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    match &vis.area {
        Ok(matrix) => {
            let legend_width = matrix
                .regions()
                .iter()
                .map(|r| r.chars().count())
                .max()
                .unwrap_or(0)
                .clamp(6, 24) as u16
                + 4;
            let block = titled_block("Cumulative population by region");
            let inner = block.inner(chunks[0]);
            frame.render_widget(block, chunks[0]);
            let parts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(10), Constraint::Length(legend_width)])
                .split(inner);

            let xs: Vec<f64> = matrix.years().iter().map(|&y| y as f64).collect();
            let stacks = matrix.stacked();
            frame.render_widget(StackedAreaChart::new(&xs, &stacks), parts[0]);

            // Legend lists the top layer first, matching the stack order on screen
            let legend: Vec<Line> = matrix
                .regions()
                .iter()
                .enumerate()
                .rev()
                .map(|(idx, region)| {
                    Line::from(vec![
                        Span::styled("■ ", Style::default().fg(series_color(idx))),
                        Span::raw(region.as_str()),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(legend), parts[1]);
        }
        Err(e) => render_error(frame, chunks[0], "Cumulative population by region", e),
    }

    let heat = &vis.heatmap;
    let block = titled_block("Population heatmap (year x region)");
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);
    let years: Vec<String> = heat.years().iter().map(|y| y.to_string()).collect();
    frame.render_widget(
        Heatmap::new(years, heat.regions(), heat.rows()).row_offset(scroll),
        inner,
    );
}

fn render_status_bar(frame: &mut Frame, loaded: &Loaded, area: Rect) {
    let report = &loaded.report;
    let failed = report.failed_sections();

    let status = Line::from(vec![
        Span::styled(" Rows: ", Style::default().fg(Color::DarkGray)),
        Span::styled(report.basic.rows.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" Columns: ", Style::default().fg(Color::DarkGray)),
        Span::styled(report.basic.columns.len().to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" Failed sections: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            failed.to_string(),
            Style::default().fg(if failed > 0 { Color::Red } else { Color::Green }),
        ),
        Span::styled(
            " | 1-5/tab:section jk:scroll o:open r:reload q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pop_trends::data::read_csv;
    use pop_trends::report::{ReportBuilder, ReportOptions};
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    fn app_with(csv: &str) -> App {
        let table = read_csv(csv.as_bytes()).unwrap();
        let report = ReportBuilder::new(&table, ReportOptions::default()).build();
        let mut app = App::new(ReportOptions::default());
        app.screen = Screen::Report(Box::new(Loaded {
            path: PathBuf::from("population_trends.csv"),
            report,
        }));
        app
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    const SAMPLE: &str = "region,year,population\nA,2020,100\nA,2021,150\nB,2020,200\nB,2021,180\n";

    #[test]
    fn test_fmt_helpers() {
        assert_eq!(fmt_num(300.0), "300");
        assert_eq!(fmt_num(200.333), "200.33");
        assert_eq!(fmt_num(f64::NAN), "NaN");
        assert_eq!(fmt_change(Some(50.0)), "+50");
        assert_eq!(fmt_change(Some(-20.5)), "-20.50");
        assert_eq!(fmt_change(None), "-");
        assert_eq!(bar_width(40, 4), 9);
        assert_eq!(bar_width(10, 40), 1);
    }

    #[test]
    fn test_prompt_screen() {
        let app = App::new(ReportOptions::default());
        let screen = draw(&app);
        assert!(screen.contains("Population Trends Analysis"));
        assert!(screen.contains("CSV path:"));
    }

    #[test]
    fn test_every_tab_renders() {
        let mut app = app_with(SAMPLE);
        for tab in Tab::ALL {
            app.select_tab(tab);
            let screen = draw(&app);
            assert!(screen.contains("population_trends.csv"));
            assert!(!screen.contains("error"), "tab {tab:?} showed an error");
        }
    }

    #[test]
    fn test_describe_table_labels() {
        let app = app_with(SAMPLE);
        let screen = draw(&app);
        assert!(screen.contains("Descriptive statistics"));
        for label in ["count", "std", "25%", "75%", "max"] {
            assert!(screen.contains(label), "missing {label}");
        }
        assert!(screen.contains("2020.5"));
    }

    #[test]
    fn test_change_tab_contents() {
        let mut app = app_with(SAMPLE);
        app.select_tab(Tab::Changes);
        let screen = draw(&app);
        assert!(screen.contains("+50.00%"));
        assert!(screen.contains("-10.00%"));
    }

    #[test]
    fn test_section_error_is_inline() {
        let mut app = app_with("region,population\nA,1\n");
        app.select_tab(Tab::YearlyTrend);
        assert!(draw(&app).contains("Schema error: missing column(s): year"));

        // Basic stats still render for the same file
        app.select_tab(Tab::BasicStats);
        let screen = draw(&app);
        assert!(screen.contains("Structure: 1 rows x 2 columns"));
    }

    #[test]
    fn test_duplicate_pair_fails_area_only() {
        let mut app = app_with("region,year,population\nA,2020,100\nA,2020,300\n");
        app.select_tab(Tab::Visualization);
        let screen = draw(&app);
        assert!(screen.contains("Ambiguity error"));
        assert!(screen.contains("Population heatmap"));
        assert!(screen.contains("200"));
    }
}
