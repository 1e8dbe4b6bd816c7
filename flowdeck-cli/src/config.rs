//! Config file and its merge with command-line flags.
//!
//! The file is JSON and every field is optional:
//!
//! ```json
//! {
//!   "base_url": "https://cloud.example.com/api",
//!   "token": "…",
//!   "project_id": "proj-1",
//!   "page_size": 10,
//!   "timeout_secs": 30
//! }
//! ```
//!
//! Flags and `FLOWDECK_*` environment variables take precedence over the file.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use flowdeck_lib::table::DEFAULT_PAGE_SIZE;

use crate::cli::Connection;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing {0}; pass --{1} or set it in the config file")]
    Missing(&'static str, &'static str),

    #[error("Page size must be at least 1")]
    ZeroPageSize,
}

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub project_id: Option<String>,
    pub page_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Reads `path`. A missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub project_id: Option<String>,
    pub page_size: usize,
    pub timeout: Duration,
}

impl Settings {
    /// Merges flags over the file.
    pub fn resolve(flags: &Connection, file: ConfigFile) -> Result<Self, ConfigError> {
        let base_url = flags
            .url
            .clone()
            .or(file.base_url)
            .ok_or(ConfigError::Missing("API base URL", "url"))?;
        let page_size = flags
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        let timeout_secs = flags
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url,
            token: flags.token.clone().or(file.token),
            project_id: flags.project.clone().or(file.project_id),
            page_size,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn require_project(&self) -> Result<&str, ConfigError> {
        self.project_id
            .as_deref()
            .ok_or(ConfigError::Missing("project id", "project"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> Connection {
        Connection {
            url: None,
            token: None,
            project: None,
            page_size: None,
            timeout: None,
            config: None,
        }
    }

    fn file() -> ConfigFile {
        serde_json::from_str(
            r#"{"base_url": "https://file.example.com", "project_id": "p-file", "page_size": 25}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_file_values_used_when_no_flags() {
        let settings = Settings::resolve(&flags(), file()).unwrap();
        assert_eq!(settings.base_url, "https://file.example.com");
        assert_eq!(settings.project_id.as_deref(), Some("p-file"));
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.token, None);
    }

    #[test]
    fn test_flags_override_file() {
        let mut flags = flags();
        flags.url = Some("https://flag.example.com".into());
        flags.page_size = Some(5);
        flags.timeout = Some(3);
        let settings = Settings::resolve(&flags, file()).unwrap();
        assert_eq!(settings.base_url, "https://flag.example.com");
        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_url_and_zero_page_size() {
        let err = Settings::resolve(&flags(), ConfigFile::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_, "url")));

        let mut flags = flags();
        flags.page_size = Some(0);
        let err = Settings::resolve(&flags, file()).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPageSize));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let path = std::env::temp_dir().join("flowdeck-no-such-config.json");
        assert_eq!(ConfigFile::load(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_require_project() {
        let settings = Settings::resolve(&flags(), file()).unwrap();
        assert_eq!(settings.require_project().unwrap(), "p-file");
    }
}
