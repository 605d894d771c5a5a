//! Settings loader.
//!
//! This module loads probe settings from JSON files or default locations,
//! and parses nameserver lists given on the command line.

use crate::config::limits::{EXAMPLE_DOMAIN, PING_MAX_TIMEOUT, RESOLVE_MAX_TIMEOUT};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Default number of probes in flight at once.
const DEFAULT_CONCURRENCY: usize = 16;

/// Default timeout for public IP lookups in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Probe settings.
///
/// Every field has a default, so a partial (or empty) JSON object is a
/// valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Domain resolved when none is given on the command line
    pub domain: String,
    /// Resolution timeout in seconds (clamped to 0.1..=8.0)
    pub resolve_timeout_secs: f64,
    /// Ping timeout in whole seconds (clamped to 1..=8)
    pub ping_timeout_secs: u64,
    /// Per-request timeout for public IP services
    pub http_timeout_secs: u64,
    /// Maximum number of probes in flight
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: EXAMPLE_DOMAIN.to_string(),
            resolve_timeout_secs: RESOLVE_MAX_TIMEOUT,
            ping_timeout_secs: PING_MAX_TIMEOUT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Settings {
    fn validate(self) -> Result<Self> {
        if self.domain.trim().is_empty() {
            return Err(Error::config("domain must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::config("http_timeout_secs must be at least 1"));
        }
        Ok(self)
    }
}

/// Settings loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// invalid values.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = ConfigLoader::load_from_file("netter.json")?;
    /// println!("probing {}", settings.domain);
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()
    }

    /// Load settings from the default locations.
    ///
    /// Searches in the following order:
    /// 1. `$CONFIG_DIR/netter/config.json`
    /// 2. `netter.json` in current directory
    ///
    /// Falls back to [`Settings::default`] when neither file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be parsed.
    pub fn load_default() -> Result<Settings> {
        let candidates = [Self::config_dir().join("config.json"), PathBuf::from("netter.json")];
        for path in candidates {
            if path.is_file() {
                tracing::debug!("loading settings from {}", path.display());
                return Self::load_from_file(path);
            }
        }
        Ok(Settings::default())
    }

    /// Load from `path` when given, otherwise from the default locations.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load_from_file`] and [`ConfigLoader::load_default`].
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netter")
    }

    /// Parse nameserver addresses given on the command line.
    ///
    /// Order and duplicates are preserved.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the first invalid address.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let args = vec!["8.8.8.8".to_string(), "2001:4860:4860::8888".to_string()];
    /// let nameservers = ConfigLoader::nameservers_from_args(&args)?;
    /// ```
    pub fn nameservers_from_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<IpAddr>> {
        args.iter()
            .map(|s| {
                let s = s.as_ref().trim();
                s.parse::<IpAddr>()
                    .map_err(|_| Error::parse(format!("Invalid IP address: {s}")))
            })
            .collect()
    }
}
