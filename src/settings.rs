use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sources: SourceSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceSettings {
    pub vaccination_url: Option<String>,
    pub population_url: Option<String>,
    pub locations: Option<PathBuf>,
    pub borders: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputSettings {
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Settings from the default location. Problems fall back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                debug!(path = %path.display(), "settings loaded");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), "ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    /// Settings from an explicit file; unreadable or invalid files are errors.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid settings: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaxmap")
            .join("config.toml")
    }
}
