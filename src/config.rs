use crate::report::{ReportOptions, DEFAULT_TOP_N};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// File name searched for in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = ".pop-trends.toml";

/// How many parent directories are searched after the working directory
const PARENT_SEARCH_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rows kept in the top change and top rate tables
    pub top_n: usize,

    /// Log file; defaults to `pop-trends.log` in the temp directory
    pub log_file: Option<PathBuf>,

    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            log_file: None,
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// First readable config in the working directory or its parents, else defaults.
    /// Broken files are logged and skipped.
    pub fn load_from_standard_locations() -> Self {
        let Ok(cwd) = env::current_dir() else {
            return Self::default();
        };
        Self::search_from(&cwd)
    }

    fn search_from(start: &Path) -> Self {
        for dir in start.ancestors().take(PARENT_SEARCH_DEPTH + 1) {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return config,
                Err(e) => warn!(path = %candidate.display(), error = %format!("{e:#}"), "ignoring config"),
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.tick_rate_ms == 0 {
            bail!("tick_rate_ms must be at least 1");
        }
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("pop-trends.log"))
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions { top_n: self.top_n }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.tick_rate(), Duration::from_millis(100));
        assert!(config.log_path().ends_with("pop-trends.log"));
        assert_eq!(config.report_options(), ReportOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "top_n = 5").unwrap();
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "top_n = 0").unwrap();
        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "colour = \"red\"").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_search_walks_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join(CONFIG_FILE_NAME), "top_n = 3\nlog_file = \"x.log\"\n").unwrap();

        let config = Config::search_from(&nested);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.log_path(), PathBuf::from("x.log"));
    }

    #[test]
    fn test_search_skips_broken_file() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "top_n = \"many\"").unwrap();
        fs::write(root.path().join(CONFIG_FILE_NAME), "top_n = 4").unwrap();

        assert_eq!(Config::search_from(&nested).top_n, 4);
    }
}
