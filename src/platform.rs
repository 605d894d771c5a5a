//! Platform capability descriptor.
//!
//! The running OS is detected once at process start and handed to the
//! collaborators that branch on it, instead of being queried ad hoc.

use crate::error::{Error, Result};
use serde::Serialize;

/// Operating system family relevant to nameserver discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Anything else, carrying `std::env::consts::OS`.
    Other(String),
}

impl Platform {
    /// Detect the platform this binary is running on.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`.
    #[must_use]
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    /// The OS name as reported by `std::env::consts::OS`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }

    /// Linux and macOS.
    #[must_use]
    pub fn is_unix(&self) -> bool {
        matches!(self, Self::Linux | Self::MacOs)
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Fail unless running on a Unix flavour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] on any other OS.
    pub fn require_unix(&self) -> Result<()> {
        if self.is_unix() {
            Ok(())
        } else {
            Err(self.unsupported(&["linux", "macos"]))
        }
    }

    /// Fail unless running on Windows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] on any other OS.
    pub fn require_windows(&self) -> Result<()> {
        if self.is_windows() {
            Ok(())
        } else {
            Err(self.unsupported(&["windows"]))
        }
    }

    pub(crate) fn unsupported(&self, allowed: &[&str]) -> Error {
        Error::UnsupportedPlatform {
            current: self.name().to_string(),
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
