use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::ToolKind;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for Gemini
    pub gemini_api_key: Option<String>,

    /// Base URL of the generateContent API
    pub gemini_api_url: String,

    /// Model identifier placed in the request path
    pub gemini_model: String,

    /// Transport timeout for one request
    pub request_timeout_secs: u64,

    /// Tool the chat loop opens with
    pub default_tool: ToolKind,

    /// Reveal pacing per tool
    pub reveal: RevealConfig,

    /// aitools home directory
    #[serde(skip)]
    pub aitools_home: PathBuf,
}

/// Milliseconds between revealed characters, per tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub calorie_ms: u64,
    pub translator_ms: u64,
    pub pdf_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            calorie_ms: 20,
            translator_ms: 20,
            pdf_ms: 15,
        }
    }
}

impl RevealConfig {
    pub fn interval_for(&self, tool: ToolKind) -> Duration {
        let ms = match tool {
            ToolKind::Calorie => self.calorie_ms,
            ToolKind::Translator => self.translator_ms,
            ToolKind::Pdf => self.pdf_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            gemini_api_key: None,
            gemini_api_url: DEFAULT_API_URL.to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 60,
            default_tool: ToolKind::Calorie,
            reveal: RevealConfig::default(),
            aitools_home: home.join(".aitools"),
        }
    }
}

impl Config {
    /// Load `~/.aitools/config.toml` and apply environment overrides
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let aitools_home = home.join(".aitools");

        fs::create_dir_all(&aitools_home).context("Failed to create .aitools directory")?;

        let mut config = Self::load_from(&aitools_home.join("config.toml"))?;
        config.aitools_home = aitools_home;
        Ok(config)
    }

    /// Load configuration from an explicit file and apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it is absent
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Config::default()
        };

        if let Some(parent) = path.parent() {
            config.aitools_home = parent.to_path_buf();
        }
        Ok(config)
    }

    /// Save configuration to `config.toml` in the aitools home
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.aitools_home).context("Failed to create .aitools directory")?;
        let config_path = self.config_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.aitools_home.join("config.toml")
    }

    /// Environment values win over the file. The `VITE_` names are accepted
    /// so an existing web `.env` can be exported as-is.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .or_else(|| lookup(&format!("VITE_{name}")))
                .filter(|value| !value.trim().is_empty())
        };

        if let Some(key) = read("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = read("GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if let Some(url) = read("GEMINI_API_URL") {
            self.gemini_api_url = url;
        }
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Update API key
    pub fn set_api_key(&mut self, key: String) {
        self.gemini_api_key = Some(key);
    }

    /// `generateContent` endpoint for the configured model, key included
    pub fn endpoint_url(&self) -> Option<String> {
        let key = self.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(format!(
            "{}/models/{}:generateContent?key={}",
            self.gemini_api_url.trim_end_matches('/'),
            self.gemini_model,
            key
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match self.gemini_api_key.as_deref() {
            Some(key) if key.chars().count() > 4 => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{tail}")
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}
