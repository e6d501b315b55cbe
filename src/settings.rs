//! User settings, loaded from `~/.config/metalinks/settings.toml`.
//!
//! ```toml
//! render = "html"            # or "markdown"
//! replace_on_render = false  # append below the selection by default
//! escape_html = true
//! undo_requires_match = false
//! timeout_secs = 30
//! ```
//!
//! Every key is optional; missing keys take their defaults. Settings are
//! passed into each operation explicitly, never read from a global.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::{RenderMode, RenderOptions};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0 Safari/537.36";

/// Per-invocation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output representation.
    pub render: RenderMode,
    /// Replace the selection instead of appending below it.
    pub replace_on_render: bool,
    /// Escape HTML-sensitive characters in card output.
    pub escape_html: bool,
    /// Skip the undo replacement when no link was recognised.
    pub undo_requires_match: bool,
    /// Whole-request HTTP timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render: RenderMode::Html,
            replace_on_render: false,
            escape_html: true,
            undo_requires_match: false,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            escape_html: self.escape_html,
        }
    }

    /// Set one key from its textual form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "render" => self.render = value.parse().map_err(anyhow::Error::msg)?,
            "replace_on_render" => self.replace_on_render = parse_bool(key, value)?,
            "escape_html" => self.escape_html = parse_bool(key, value)?,
            "undo_requires_match" => self.undo_requires_match = parse_bool(key, value)?,
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .with_context(|| format!("{key} expects a number of seconds"))?;
            }
            "user_agent" => self.user_agent = value.to_string(),
            other => bail!("unknown setting '{other}'"),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{key} expects true or false, got '{value}'"),
    }
}

/// Host-owned persistence for [`Settings`].
pub trait SettingsStore {
    /// Stored settings merged over the defaults.
    fn load(&self) -> Result<Settings>;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// TOML file store.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory.
    pub fn default_location() -> Self {
        Self::new(config_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    /// Returns defaults if the file doesn't exist (settings are optional).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", self.path.display()))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(settings).context("failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Return the path to the settings file.
fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("metalinks")
        .join("settings.toml")
}
