use anyhow::Result;
use pop_trends::data;
use pop_trends::report::{Report, ReportBuilder, ReportOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Report tabs, one per section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    BasicStats,
    YearlyTrend,
    Regional,
    Changes,
    Visualization,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::BasicStats,
        Tab::YearlyTrend,
        Tab::Regional,
        Tab::Changes,
        Tab::Visualization,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::BasicStats => "1. Basic stats",
            Tab::YearlyTrend => "2. Yearly trend",
            Tab::Regional => "3. Regional",
            Tab::Changes => "4. Changes",
            Tab::Visualization => "5. Visualization",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Message under the path input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMessage {
    Info(String),
    Error(String),
}

/// Path entry screen, shown until a file loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub input: String,
    pub message: PromptMessage,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            input: String::new(),
            message: PromptMessage::Info("Enter the path of a population trends CSV (region, year, population)".into()),
        }
    }
}

/// A loaded file and its computed report
pub struct Loaded {
    pub path: PathBuf,
    pub report: Report,
}

pub enum Screen {
    Prompt(Prompt),
    Report(Box<Loaded>),
}

/// Application state
pub struct App {
    pub screen: Screen,
    pub tab: Tab,
    /// Row offset for the current tab's tables
    pub scroll: u16,
    pub should_quit: bool,
    options: ReportOptions,
}

impl App {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            screen: Screen::Prompt(Prompt::default()),
            tab: Tab::BasicStats,
            scroll: 0,
            should_quit: false,
            options,
        }
    }

    /// Load a CSV and compute its report; the current screen is kept on failure
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let table = data::load_csv(path)?;
        let report = ReportBuilder::new(&table, self.options).build();
        info!(path = %path.display(), "report ready");
        self.screen = Screen::Report(Box::new(Loaded {
            path: path.to_path_buf(),
            report,
        }));
        self.tab = Tab::BasicStats;
        self.scroll = 0;
        Ok(())
    }

    /// Try to open the path typed into the prompt
    pub fn submit_prompt(&mut self) {
        let Screen::Prompt(prompt) = &mut self.screen else {
            return;
        };
        let input = prompt.input.trim().to_string();
        if input.is_empty() {
            prompt.message = Prompt::default().message;
            return;
        }
        self.open_or_prompt(Path::new(&input));
    }

    /// Open `path`, or show the failure on the prompt with the path filled in
    pub fn open_or_prompt(&mut self, path: &Path) {
        if let Err(e) = self.open(path) {
            error!(path = %path.display(), error = %format!("{e:#}"), "failed to open csv");
            self.screen = Screen::Prompt(Prompt {
                input: path.display().to_string(),
                message: PromptMessage::Error(format!("{e:#}")),
            });
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Screen::Prompt(prompt) = &mut self.screen {
            prompt.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Screen::Prompt(prompt) = &mut self.screen {
            prompt.input.pop();
        }
    }

    /// Go back to the path prompt, pre-filled with the current file
    pub fn reopen(&mut self) {
        let input = match &self.screen {
            Screen::Report(loaded) => loaded.path.display().to_string(),
            Screen::Prompt(prompt) => prompt.input.clone(),
        };
        self.screen = Screen::Prompt(Prompt {
            input,
            ..Prompt::default()
        });
    }

    /// Re-read the current file from disk. On failure the old report stays visible.
    pub fn reload(&mut self) {
        let Screen::Report(loaded) = &self.screen else {
            return;
        };
        let path = loaded.path.clone();
        let tab = self.tab;
        match self.open(&path) {
            Ok(()) => self.tab = tab,
            Err(e) => error!(path = %path.display(), error = %format!("{e:#}"), "reload failed"),
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.tab.next());
    }

    pub fn prev_tab(&mut self) {
        self.select_tab(self.tab.prev());
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self.screen, Screen::Prompt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::BasicStats.next(), Tab::YearlyTrend);
        assert_eq!(Tab::Visualization.next(), Tab::BasicStats);
        assert_eq!(Tab::BasicStats.prev(), Tab::Visualization);
        assert_eq!(Tab::Changes.index(), 3);
    }

    #[test]
    fn test_select_tab_resets_scroll() {
        let mut app = App::new(ReportOptions::default());
        app.scroll_down();
        app.scroll_down();
        app.select_tab(Tab::BasicStats);
        assert_eq!(app.scroll, 2);
        app.next_tab();
        assert_eq!(app.scroll, 0);
        app.scroll_up();
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_empty_prompt_is_noop() {
        let mut app = App::new(ReportOptions::default());
        app.push_char(' ');
        app.submit_prompt();
        assert!(app.is_prompt());
        let Screen::Prompt(prompt) = &app.screen else { unreachable!() };
        assert!(matches!(prompt.message, PromptMessage::Info(_)));
    }

    #[test]
    fn test_missing_file_shows_error() {
        let mut app = App::new(ReportOptions::default());
        for c in "/no/such/file.csv".chars() {
            app.push_char(c);
        }
        app.submit_prompt();
        let Screen::Prompt(prompt) = &app.screen else { panic!("expected prompt") };
        match &prompt.message {
            PromptMessage::Error(msg) => assert!(msg.contains("Failed to open file")),
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(prompt.input, "/no/such/file.csv");
    }

    #[test]
    fn test_open_then_reopen() {
        let file = csv_file("region,year,population\nA,2020,100\nA,2021,150\n");
        let mut app = App::new(ReportOptions::default());
        for c in file.path().display().to_string().chars() {
            app.push_char(c);
        }
        app.submit_prompt();

        let Screen::Report(loaded) = &app.screen else { panic!("expected report") };
        assert_eq!(loaded.report.basic.rows, 2);
        assert_eq!(loaded.report.failed_sections(), 0);

        app.select_tab(Tab::Changes);
        app.reload();
        assert_eq!(app.tab, Tab::Changes);

        app.reopen();
        let Screen::Prompt(prompt) = &app.screen else { panic!("expected prompt") };
        assert_eq!(prompt.input, file.path().display().to_string());
    }

    #[test]
    fn test_open_or_prompt() {
        let mut app = App::new(ReportOptions::default());
        app.open_or_prompt(Path::new("/no/such/start.csv"));
        let Screen::Prompt(prompt) = &app.screen else { panic!("expected prompt") };
        assert_eq!(prompt.input, "/no/such/start.csv");
        assert!(matches!(&prompt.message, PromptMessage::Error(msg) if msg.contains("Failed to open file")));

        let file = csv_file("region,year,population\nA,2020,1\n");
        app.open_or_prompt(file.path());
        assert!(!app.is_prompt());
    }

    #[test]
    fn test_backspace() {
        let mut app = App::new(ReportOptions::default());
        app.push_char('a');
        app.push_char('b');
        app.pop_char();
        let Screen::Prompt(prompt) = &app.screen else { unreachable!() };
        assert_eq!(prompt.input, "a");
    }
}
