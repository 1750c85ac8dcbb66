mod app;
mod ui;

use anyhow::Result;
use app::{App, Tab};
use clap::Parser;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use pop_trends::config::Config;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Interactive terminal report for population-by-region-by-year CSV files
#[derive(Parser, Debug)]
#[command(name = "pop-trends", version, about)]
struct Cli {
    /// CSV file with region, year and population columns; prompts when omitted
    path: Option<PathBuf>,

    /// Configuration file (default: .pop-trends.toml in this or a parent directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rows in the top change and top rate tables
    #[arg(long, value_name = "N")]
    top_n: Option<usize>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Config file values overridden by command line flags
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load_from_standard_locations(),
        };
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Log to a file since the terminal belongs to the UI. Logging stays off if the file can't be opened.
fn init_logging(path: &Path) {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.log_path());
    info!(?config, "startup");

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Pasted paths arrive as one event instead of keystrokes
    execute!(std::io::stdout(), EnableBracketedPaste)?;

    let result = run(&mut terminal, cli.path.as_deref(), &config);

    // Disable paste mode and restore terminal
    let _ = execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, path: Option<&Path>, config: &Config) -> Result<()> {
    let mut app = App::new(config.report_options());

    // A file given on the command line skips the prompt; on failure the prompt shows why
    if let Some(path) = path {
        app.open_or_prompt(path);
    }

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(config.tick_rate())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.is_prompt() {
                        handle_prompt_key(&mut app, key);
                    } else {
                        handle_report_key(&mut app, key);
                    }
                }
                Event::Paste(text) if app.is_prompt() => {
                    text.chars().filter(|c| !c.is_control()).for_each(|c| app.push_char(c));
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_prompt_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Esc => app.quit(),
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_report_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Section tabs
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.select_tab(Tab::ALL[idx]);
        }
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_tab(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_tab(),

        // Table scrolling
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),

        KeyCode::Char('o') => app.reopen(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pop_trends::report::ReportOptions;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["pop-trends", "data.csv", "--top-n", "3", "--log-file", "out.log"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("data.csv")));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.log_path(), PathBuf::from("out.log"));
    }

    #[test]
    fn test_cli_rejects_zero_top_n() {
        let cli = Cli::parse_from(["pop-trends", "--top-n", "0"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let cli = Cli::parse_from(["pop-trends", "--config", "/no/such/config.toml"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_prompt_keys_type_q() {
        let mut app = App::new(ReportOptions::default());
        handle_prompt_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.should_quit);
        handle_prompt_key(&mut app, press(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_report_keys() {
        let mut app = App::new(ReportOptions::default());
        handle_report_key(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.tab, Tab::Changes);
        handle_report_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Visualization);
        handle_report_key(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.scroll, 1);
        handle_report_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
