use anyhow::{Context, Result};
use galleria_core::artic::{self, ArticConfig};
use galleria_core::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// tracing filter used when GALLERIA_LOG is unset (e.g. "info", "galleria_core=debug")
    pub log_level: Option<String>,
    pub source: Option<Source>,
    pub tui: Option<Tui>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Source {
    pub base_url: Option<String>,
    /// Rows per page; shared by the fetcher and the pager offsets (default 12)
    pub page_size: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tui {
    /// Whether to use the alternate screen
    pub alt_screen: Option<bool>,
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub page_size: Option<usize>,
}

/// Source settings after defaults and overrides are applied.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedSource {
    pub base_url: String,
    pub page_size: usize,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl ResolvedSource {
    pub fn artic_config(&self) -> ArticConfig {
        ArticConfig {
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Settings {
    pub fn resolve_source(&self, overrides: &Overrides) -> ResolvedSource {
        let src = self.source.clone().unwrap_or_default();
        ResolvedSource {
            base_url: overrides
                .base_url
                .clone()
                .or(src.base_url)
                .unwrap_or_else(|| artic::DEFAULT_BASE_URL.to_string()),
            page_size: overrides
                .page_size
                .filter(|n| *n > 0)
                .or(src.page_size.filter(|n| *n > 0))
                .unwrap_or(DEFAULT_PAGE_SIZE),
            timeout_ms: src
                .timeout_ms
                .unwrap_or(artic::DEFAULT_TIMEOUT.as_millis() as u64),
            user_agent: src
                .user_agent
                .unwrap_or_else(|| artic::DEFAULT_USER_AGENT.to_string()),
        }
    }

    pub fn alt_screen(&self) -> bool {
        self.tui.as_ref().and_then(|t| t.alt_screen).unwrap_or(true)
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("galleria")
    } else {
        PathBuf::from("./.config/galleria")
    }
}

pub fn state_dir() -> PathBuf {
    // Prefer XDG state dir when available; fall back to config dir
    if let Some(bd) = directories::BaseDirs::new() {
        if let Some(sd) = bd.state_dir() {
            return sd.join("galleria");
        }
    }
    config_dir()
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn log_path() -> PathBuf {
    state_dir().join("galleria.log")
}

/// `Ok(None)` when the file does not exist.
pub fn read_settings(path: &Path) -> Result<Option<Settings>> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let settings =
        toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(settings))
}
