use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capture::engine::{DEFAULT_LOOP_ITERATION_LIMIT, DEFAULT_RECURSION_LIMIT};
use crate::error::{PlaygroundError, Result};

pub const APP_DIR: &str = "codepad";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PlaygroundError::Settings(format!("unknown theme '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wall-clock budget for one run
    pub run_timeout_ms: u64,

    pub loop_iteration_limit: u64,

    pub recursion_limit: usize,

    /// Overrides the platform data directory for snippet storage
    pub data_dir: Option<PathBuf>,

    /// Base URL that share links are built on
    pub share_base_url: String,

    pub theme: Theme,

    /// Directory for log files written while the TUI owns the terminal
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_timeout_ms: 5_000,
            loop_iteration_limit: DEFAULT_LOOP_ITERATION_LIMIT,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            data_dir: None,
            share_base_url: "https://codepad.local/".to_string(),
            theme: Theme::Light,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Default location: `<config dir>/codepad/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings from the default location, apply environment overrides,
    /// and fall back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let mut settings = match Self::default_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.display(), "ignoring unreadable settings");
                Self::default()
            }),
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()
            .ok_or_else(|| PlaygroundError::Settings("no config directory available".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `CODEPAD_*` overrides. Unparseable values are logged and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CODEPAD_TIMEOUT_MS") {
            match raw.trim().parse() {
                Ok(ms) => self.run_timeout_ms = ms,
                Err(_) => warn!(value = %raw, "CODEPAD_TIMEOUT_MS is not a number"),
            }
        }
        if let Some(raw) = lookup("CODEPAD_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("CODEPAD_SHARE_URL") {
            self.share_base_url = raw;
        }
        if let Some(raw) = lookup("CODEPAD_THEME") {
            match raw.parse() {
                Ok(theme) => self.theme = theme,
                Err(e) => warn!(error = %e, "ignoring CODEPAD_THEME"),
            }
        }
    }

    /// Directory holding `snippets.json`.
    pub fn snippet_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".codepad"))
    }
}
