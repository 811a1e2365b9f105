//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub widget: WidgetConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file. Defaults to the user data
    /// directory so the CLI and the widget server read the same store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Local model server used for capture and generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the Ollama-compatible server.
    #[serde(default = "default_model_url")]
    pub base_url: String,

    /// Model name to request.
    #[serde(default = "default_model_name")]
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_url(),
            model: default_model_name(),
        }
    }
}

/// Widget snapshot server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_widget_port")]
    pub port: u16,

    /// Snapshot refresh interval in seconds.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            port: default_widget_port(),
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("ticklist").join("checklists.db"))
        .unwrap_or_else(|| PathBuf::from(".ticklist/checklists.db"))
}

fn default_model_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_name() -> String {
    "llama3.2".to_string()
}

fn default_widget_port() -> u16 {
    8319
}

fn default_refresh_seconds() -> u64 {
    900 // the widget's 15 minute timeline
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location or return defaults with
    /// environment overrides applied.
    pub fn load_or_default() -> Self {
        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("ticklist").join("config.yaml");
            if let Ok(config) = Self::load(path) {
                return config;
            }
        }

        let mut config = Self::default();

        if let Ok(db_path) = std::env::var("TICKLIST_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Ok(url) = std::env::var("TICKLIST_MODEL_URL") {
            config.model.base_url = url;
        }

        if let Ok(model) = std::env::var("TICKLIST_MODEL") {
            config.model.model = model;
        }

        if let Ok(port) = std::env::var("TICKLIST_WIDGET_PORT") {
            if let Ok(port) = port.parse() {
                config.widget.port = port;
            }
        }

        config
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert!(config.server.db_path.ends_with("checklists.db"));
        assert_eq!(config.widget.refresh_seconds, 900);
        assert!(config.model.base_url.starts_with("http"));
    }

    #[test]
    fn load_parses_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  db_path: /tmp/lists.db\nmodel:\n  model: mistral"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.db_path, PathBuf::from("/tmp/lists.db"));
        assert_eq!(config.model.model, "mistral");
        // untouched sections keep their defaults
        assert_eq!(config.widget.port, default_widget_port());
    }
}
