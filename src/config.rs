//! TOML configuration file.
//!
//! Looked up at `--config <PATH>` or `<config_dir>/bookinfo/config.toml`
//! (`~/.config/bookinfo/config.toml` on Linux). A missing default file means
//! defaults; every section and key is optional.
//!
//! ```toml
//! [database]
//! path = "bookinfo.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [http]
//! connect_timeout_secs = 10
//! read_timeout_secs = 30
//!
//! [http.headers]
//! User-Agent = "bookinfo/0.1"
//!
//! [catalog]
//! base_url = "https://www.dushu.com/"
//! search_url = "https://www.dushu.com/search.aspx?wd={isbn}"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::crawler::{CatalogEndpoints, DEFAULT_BASE_URL, DEFAULT_SEARCH_URL};
use crate::db::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_MAX_CONNECTIONS, DatabaseOptions};
use crate::fetch::{CONNECT_TIMEOUT_SECS, HttpTimeouts, READ_TIMEOUT_SECS, build_header_map};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "bookinfo.db";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file {path}: {source}\n  Suggestion: Check the TOML syntax and key names")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid config value for `{key}`: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `SQLite` file path.
    pub path: PathBuf,
    /// Pool size (1..=20).
    pub max_connections: u32,
    /// Lock wait in milliseconds (0..=120000).
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Replaces or extends the default browser header set.
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            headers: BTreeMap::new(),
        }
    }
}

/// `[catalog]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Must contain `{isbn}`.
    pub search_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

impl Config {
    /// Parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|e| match e {
            FromTomlError::Parse(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            FromTomlError::Invalid(err) => err,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Loads the default config file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an existing file is unreadable or invalid.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => {
                debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn from_toml(raw: &str) -> Result<Self, FromTomlError> {
        let config: Self = toml::from_str(raw).map_err(FromTomlError::Parse)?;
        config.validate().map_err(FromTomlError::Invalid)?;
        Ok(config)
    }

    /// Checks ranges, header names and catalog URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=20).contains(&self.database.max_connections) {
            return Err(out_of_range(
                "database.max_connections",
                self.database.max_connections,
                "1..=20",
            ));
        }
        if self.database.busy_timeout_ms > 120_000 {
            return Err(out_of_range(
                "database.busy_timeout_ms",
                self.database.busy_timeout_ms,
                "0..=120000",
            ));
        }
        validate_timeout_secs("http.connect_timeout_secs", self.http.connect_timeout_secs)?;
        validate_timeout_secs("http.read_timeout_secs", self.http.read_timeout_secs)?;
        build_header_map(&self.http.headers).map_err(|e| ConfigError::Invalid {
            key: "http.headers",
            reason: e.to_string(),
        })?;
        self.endpoints()?;
        Ok(())
    }

    /// Catalog endpoints from the `[catalog]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a malformed URL or template.
    pub fn endpoints(&self) -> Result<CatalogEndpoints, ConfigError> {
        CatalogEndpoints::new(&self.catalog.base_url, self.catalog.search_url.clone()).map_err(
            |e| ConfigError::Invalid {
                key: "catalog",
                reason: e.to_string(),
            },
        )
    }

    /// HTTP timeouts from the `[http]` section.
    #[must_use]
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect_secs: self.http.connect_timeout_secs,
            read_secs: self.http.read_timeout_secs,
        }
    }

    /// Pool options from the `[database]` section.
    #[must_use]
    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            max_connections: self.database.max_connections,
            busy_timeout_ms: self.database.busy_timeout_ms,
        }
    }
}

enum FromTomlError {
    Parse(toml::de::Error),
    Invalid(ConfigError),
}

/// Resolves `<config_dir>/bookinfo/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bookinfo").join("config.toml"))
}

fn validate_timeout_secs(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=3600).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(key, value, "1..=3600"))
    }
}

fn out_of_range(key: &'static str, value: impl std::fmt::Display, range: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: format!("{value}. Expected range: {range}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.timeouts(), HttpTimeouts::default());
        assert_eq!(config.database_options(), DatabaseOptions::default());
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let file = write_config(
            r#"
[database]
max_connections = 2

[http.headers]
User-Agent = "bookinfo-test"

[catalog]
search_url = "https://mirror.example/find?q={isbn}"
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.http.headers["User-Agent"], "bookinfo-test");

        let url = config.endpoints().unwrap().search_url_for("1").unwrap();
        assert_eq!(url.as_str(), "https://mirror.example/find?q=1");
    }

    #[test]
    fn test_out_of_range_pool_size_rejected() {
        let file = write_config("[database]\nmax_connections = 0\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "database.max_connections",
                ..
            }
        ));
        assert!(err.to_string().contains("1..=20"));
    }

    #[test]
    fn test_timeout_out_of_range_rejected() {
        let mut config = Config::default();
        config.http.read_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "http.read_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_search_template_without_placeholder_rejected() {
        let mut config = Config::default();
        config.catalog.search_url = "https://www.dushu.com/search.aspx".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "catalog", .. })
        ));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let mut config = Config::default();
        config
            .http
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "http.headers",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let file = write_config("[database]\npool = 3\n");
        assert!(matches!(
            Config::load(file.path()).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_default_config_path_ends_with_app_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("bookinfo/config.toml"));
        }
    }
}
