use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the remote generative-image service.
///
/// Holds the API key and the model identifiers for the two request paths.
/// Service credentials are external setup: the key may come from the config
/// file or the `GEMINI_API_KEY` environment variable.
///
/// # Loading
///
/// ```rust,no_run
/// use pixgen::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.api_key = "AIza...".into();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the generative-image service. May be left empty if the
    /// `GEMINI_API_KEY` environment variable is set.
    pub api_key: String,
    /// Model used by the text-to-image path.
    pub generate_model: String,
    /// Multimodal model used by the image-edit path.
    pub edit_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            generate_model: "imagen-4.0-generate-001".to_string(),
            edit_model: "gemini-2.5-flash-image".to_string(),
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// The effective API key: config value, falling back to the
    /// `GEMINI_API_KEY` environment variable. `None` if neither is set.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert!(config.api_key.is_empty());
        assert_eq!(config.generate_model, "imagen-4.0-generate-001");
        assert_eq!(config.edit_model, "gemini-2.5-flash-image");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.api_key = "test-key".into();
        config.edit_model = "other-model".into();
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.api_key, "test-key");
        assert_eq!(loaded.edit_model, "other-model");
    }

    #[test]
    fn load_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn resolved_key_prefers_config_value() {
        let mut config = Config::default();
        config.api_key = "from-config".into();
        assert_eq!(config.resolved_api_key().as_deref(), Some("from-config"));
    }
}
