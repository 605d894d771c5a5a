//! Error types module.
//!
//! This module defines the structural errors of netter. Individual probe
//! failures (NXDOMAIN, timeouts, unreachable hosts, a lookup service that
//! returned garbage) are never errors: they are captured as data in the
//! result types. Only precondition failures end up here.

use thiserror::Error;

/// A specialized `Result` type for netter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for netter.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading resolv.conf, config files, ...)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver could not be constructed
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// HTTP client could not be constructed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network-related setup error (ICMP socket creation, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (invalid config, missing files)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid address, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation is not available on the running operating system
    #[error("Unsupported OS: {current}{}", allowed_suffix(.allowed))]
    UnsupportedPlatform {
        current: String,
        allowed: Vec<String>,
    },
}

fn allowed_suffix(allowed: &[String]) -> String {
    if allowed.len() > 1 {
        format!(" not in {}", allowed.join(", "))
    } else {
        String::new()
    }
}

impl Error {
    /// Create a new network error with a message.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new HTTP error with a message.
    #[must_use]
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = Error::UnsupportedPlatform {
            current: "freebsd".into(),
            allowed: vec!["linux".into(), "macos".into()],
        };
        assert_eq!(err.to_string(), "Unsupported OS: freebsd not in linux, macos");

        let err = Error::UnsupportedPlatform {
            current: "linux".into(),
            allowed: vec!["windows".into()],
        };
        assert_eq!(err.to_string(), "Unsupported OS: linux");
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(Error::parse("x"), Error::Parse(m) if m == "x"));
        assert!(matches!(Error::config("x"), Error::Config(_)));
        assert!(matches!(Error::network("x"), Error::Network(_)));
        assert!(matches!(Error::http("x"), Error::Http(_)));
    }
}
