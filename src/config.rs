use crate::entities::package_record::DEFAULT_REGISTRY;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Virtual environment used when none is given on the command line
    pub venv: Option<PathBuf>,
    /// Registry host for project links
    pub registry: String,
    pub case_sensitive_search: bool,
    pub status_timeout_secs: u64,
    /// Log records go here instead of the default log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            venv: None,
            registry: DEFAULT_REGISTRY.to_string(),
            case_sensitive_search: true,
            status_timeout_secs: 10,
            log_file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/pip-explorer/config.toml")
    }

    /// Where log records are written. Never the terminal, which the UI owns.
    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".cache/pip-explorer/pip-explorer.log")
            }
        }
    }

    /// Reads the config file, falling back to defaults when there is none
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path(),
        };

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(dir.path().join("config.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.registry, "pypi.org");
        assert!(config.case_sensitive_search);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "venv = \"/home/me/.venv\"\ncase_sensitive_search = false\n",
        )
        .unwrap();

        let config = Config::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.venv, Some(PathBuf::from("/home/me/.venv")));
        assert!(!config.case_sensitive_search);
        assert_eq!(config.registry, "pypi.org");
        assert_eq!(config.status_timeout_secs, 10);
    }

    #[test]
    fn test_log_path() {
        let config = Config::default();
        assert!(config.log_path().ends_with(".cache/pip-explorer/pip-explorer.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/pip-explorer.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/pip-explorer.log"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "status_timeout_secs = \"soon\"").unwrap();

        let err = Config::load_or_default(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
    }
}
