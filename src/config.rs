use std::path::{Path, PathBuf};

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::services::acquisition::AcquisitionSource;

const DEFAULT_CONFIG: &str = r#"# mix-follower configuration
#
# Each generator command is an executable invoked with no arguments that
# prints {"name": "...", "songs": [{"title": "...", "artist": "..."}]} on
# stdout. One playlist is rebuilt per command.
generator_commands = []

# Acquisition sources tried, in order, for tracks the library does not have.
# ${title} and ${artist} are substituted as quoted arguments.
# Sources starting with "https" are reserved and skipped.
acquisition_sources = []
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    generator_commands: Vec<String>,
    #[serde(default)]
    acquisition_sources: Vec<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("mix-follower").join("config.toml"))
    }

    /// Load config from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("No config directory found")?;
        Self::from_file(&config_path)
    }

    /// Write a commented default config file, unless one already exists
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory found")?;
        if path.exists() {
            log::info!("Config file already exists at {}", path.display());
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn generator_commands(&self) -> &[String] {
        &self.generator_commands
    }

    /// Classified acquisition sources, in configured order.
    pub fn acquisition_sources(&self) -> Vec<AcquisitionSource> {
        self.acquisition_sources
            .iter()
            .map(|raw| AcquisitionSource::from_config(raw))
            .collect()
    }

    #[cfg(test)]
    pub fn for_tests(generator_commands: Vec<String>, acquisition_sources: Vec<String>) -> Self {
        Self {
            generator_commands,
            acquisition_sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            generator_commands = ["/usr/local/bin/fetch-top50"]
            acquisition_sources = [
                "https://stream.example.com/mix",
                "yt-fetch ${title} ${artist}",
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.generator_commands(), ["/usr/local/bin/fetch-top50"]);
        assert_eq!(
            config.acquisition_sources(),
            vec![
                AcquisitionSource::RemoteLink("https://stream.example.com/mix".to_string()),
                AcquisitionSource::Command("yt-fetch ${title} ${artist}".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.generator_commands().is_empty());
        assert!(config.acquisition_sources().is_empty());
    }

    #[test]
    fn test_default_config_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.generator_commands().is_empty());
    }
}
