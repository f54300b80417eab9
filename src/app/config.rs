//! Configuration for the terminal host

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::terminal::DEFAULT_TAB_WIDTH;

/// Terminal host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial width in columns
    pub cols: usize,
    /// Initial height in rows
    pub rows: usize,
    /// History limit handed to the terminal (retention is the renderer's)
    pub max_history: usize,
    /// Distance between tab stops
    pub tab_width: usize,
    /// Program to run; `None` uses `$SHELL`, then `/bin/sh`
    pub shell: Option<String>,
    /// Arguments passed to the program
    pub shell_args: Vec<String>,
    /// Largest chunk read from the PTY per loop iteration
    pub read_chunk_size: usize,
    /// How long one poll waits for input, in milliseconds
    pub poll_timeout_ms: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            max_history: 10000,
            tab_width: DEFAULT_TAB_WIDTH,
            shell: None,
            shell_args: Vec::new(),
            read_chunk_size: 64 * 1024,
            poll_timeout_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/vtgrid/config.json
        if let Some(config_path) = default_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring config file");
                    }
                }
            }
        }
        Self::default()
    }

    /// Reject settings the host cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid("cols and rows must be non-zero"));
        }
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be non-zero"));
        }
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid("read_chunk_size must be non-zero"));
        }
        Ok(())
    }

    /// The program to run: the configured shell, `$SHELL` or `/bin/sh`
    pub fn program(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
}

/// Path of the default configuration file
pub fn default_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("vtgrid")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!((config.cols, config.rows), (80, 24));
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.read_chunk_size, 65536);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            cols: 132,
            shell: Some("/bin/zsh".to_string()),
            shell_args: vec!["-l".to_string()],
            ..Config::default()
        };
        config.save(&path).unwrap();

        let restored = Config::load(&path).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "rows": 50 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.rows, 50);
        assert_eq!(config.cols, 80);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tab_width": 0 }"#).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_explicit_shell_wins() {
        let config = Config {
            shell: Some("/bin/dash".to_string()),
            ..Config::default()
        };
        assert_eq!(config.program(), "/bin/dash");
    }
}
