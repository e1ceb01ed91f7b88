//! Configuration loading
//!
//! Server URL resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `GROCERYLY_SERVER` environment variable
//! 3. `[server] url` in the user config file
//! 4. Compiled default (fallback)
//!
//! Timeouts and search tuning come from the same TOML file when present.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub const SERVER_ENV_VAR: &str = "GROCERYLY_SERVER";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the list store / recipe proxy server
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Quiet period before a recipe search is dispatched
    pub search_debounce_ms: u64,
    /// Maximum number of search results requested
    pub search_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    search: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchSection {
    debounce_ms: Option<u64>,
    limit: Option<u32>,
}

impl AppConfig {
    /// Resolve configuration from all sources
    ///
    /// An unreadable or malformed config file is logged and skipped, not
    /// fatal.
    pub fn resolve(cli_url: Option<&str>) -> Self {
        let file = match default_config_path() {
            Some(path) if path.exists() => match load_file(&path) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring config file");
                    None
                }
            },
            _ => None,
        };

        Self::resolve_from(cli_url, std::env::var(SERVER_ENV_VAR).ok(), file)
    }

    fn resolve_from(
        cli_url: Option<&str>,
        env_url: Option<String>,
        file: Option<FileConfig>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let server_url = cli_url
            .map(str::to_string)
            .or(env_url)
            .or(file.server.url)
            .unwrap_or(defaults.server_url);

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            request_timeout_secs: file
                .server
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            search_debounce_ms: file.search.debounce_ms.unwrap_or(defaults.search_debounce_ms),
            search_limit: file.search.limit.unwrap_or(defaults.search_limit),
        }
    }
}

/// Per-user config file location, `~/.config/groceryly/config.toml` on
/// Linux and the platform equivalent elsewhere
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("groceryly").join("config.toml"))
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let config = AppConfig::resolve_from(None, None, None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn cli_argument_beats_env_and_file() {
        let file = load_file(
            write_config("[server]\nurl = \"http://file:1\"\n").path(),
        )
        .unwrap();

        let config = AppConfig::resolve_from(
            Some("http://cli:1"),
            Some("http://env:1".to_string()),
            Some(file),
        );
        assert_eq!(config.server_url, "http://cli:1");
    }

    #[test]
    fn env_beats_file() {
        let file = load_file(
            write_config("[server]\nurl = \"http://file:1\"\n").path(),
        )
        .unwrap();

        let config =
            AppConfig::resolve_from(None, Some("http://env:1".to_string()), Some(file));
        assert_eq!(config.server_url, "http://env:1");
    }

    #[test]
    fn file_supplies_url_and_tuning() {
        let file = load_file(
            write_config(
                "[server]\nurl = \"http://file:1\"\nrequest_timeout_secs = 5\n\n\
                 [search]\ndebounce_ms = 250\nlimit = 3\n",
            )
            .path(),
        )
        .unwrap();

        let config = AppConfig::resolve_from(None, None, Some(file));
        assert_eq!(config.server_url, "http://file:1");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.search_limit, 3);
    }

    #[test]
    fn trailing_slash_is_stripped_from_server_url() {
        let config =
            AppConfig::resolve_from(Some("http://localhost:8080/"), None, None);
        assert_eq!(config.server_url, "http://localhost:8080");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = write_config("server = \"not a table\"\n[server]\n");
        assert!(matches!(load_file(file.path()), Err(ConfigError::Parse(_))));
    }
}
