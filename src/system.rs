//! Local nameserver discovery.
//!
//! Unix hosts list their nameservers in `/etc/resolv.conf`; Windows keeps a
//! DNS search order per network adapter. Which source applies is decided by
//! the [`Platform`] handed in by the caller.

use crate::error::Result;
use crate::platform::Platform;
use serde::Serialize;
use std::net::IpAddr;
use std::path::Path;

/// System resolver configuration on Unix.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Nameservers configured on this host, in configuration order.
///
/// Entries are kept as listed, repeats included, so each one is probed.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, or
/// [`crate::Error::UnsupportedPlatform`] on an OS with no known source.
pub fn local_nameservers(platform: &Platform) -> Result<Vec<IpAddr>> {
    match platform {
        Platform::Linux | Platform::MacOs => read_resolv_conf(RESOLV_CONF),
        Platform::Windows => Ok(adapter_nameservers(platform)?
            .into_iter()
            .flat_map(|adapter| adapter.nameservers)
            .collect()),
        Platform::Other(_) => Err(platform.unsupported(&["linux", "macos", "windows"])),
    }
}

/// Read nameservers from a resolv.conf-style file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_resolv_conf<P: AsRef<Path>>(path: P) -> Result<Vec<IpAddr>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_resolv_conf(&content))
}

/// Extract `nameserver <addr>` entries in file order.
///
/// Comments and malformed entries are skipped; a zone index (`fe80::1%eth0`)
/// is dropped.
#[must_use]
pub fn parse_resolv_conf(content: &str) -> Vec<IpAddr> {
    let mut nameservers = Vec::new();
    for line in content.lines() {
        let line = line.split(['#', ';']).next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        if fields.next() != Some("nameserver") {
            continue;
        }
        let Some(value) = fields.next() else {
            continue;
        };
        let addr = value.split('%').next().unwrap_or(value);
        match addr.parse::<IpAddr>() {
            Ok(ip) => nameservers.push(ip),
            Err(_) => tracing::warn!("ignoring nameserver entry: {value}"),
        }
    }
    nameservers
}

/// DNS search order of one network adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterNameservers {
    pub name: String,
    pub description: String,
    pub nameservers: Vec<IpAddr>,
}

impl std::fmt::Display for AdapterNameservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let servers: Vec<String> = self.nameservers.iter().map(ToString::to_string).collect();
        write!(f, "{}({}): {}", self.name, self.description, servers.join(", "))
    }
}

/// Nameservers per network adapter, skipping adapters without any.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedPlatform`] outside Windows, or an error
/// if the adapter table cannot be read.
pub fn adapter_nameservers(platform: &Platform) -> Result<Vec<AdapterNameservers>> {
    platform.require_windows()?;
    read_adapters()
}

#[cfg(windows)]
fn read_adapters() -> Result<Vec<AdapterNameservers>> {
    let adapters = ipconfig::get_adapters().map_err(|e| crate::Error::network(e.to_string()))?;
    Ok(adapters
        .iter()
        .filter(|adapter| !adapter.dns_servers().is_empty())
        .map(|adapter| AdapterNameservers {
            name: adapter.friendly_name().to_string(),
            description: adapter.description().to_string(),
            nameservers: adapter.dns_servers().to_vec(),
        })
        .collect())
}

#[cfg(not(windows))]
fn read_adapters() -> Result<Vec<AdapterNameservers>> {
    // Adapter enumeration only exists in Windows builds.
    Err(Platform::detect().unsupported(&["windows"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn test_parse_resolv_conf() {
        let content = "\
# Generated by NetworkManager
search lan
nameserver 192.168.1.1
nameserver 2001:4860:4860::8888 # google
; nameserver 9.9.9.9
options edns0
nameserver fe80::1%eth0
nameserver not-an-ip
nameserver
nameserver 192.168.1.1
";
        let nameservers = parse_resolv_conf(content);
        assert_eq!(
            nameservers,
            vec![
                "192.168.1.1".parse::<IpAddr>().unwrap(),
                "2001:4860:4860::8888".parse().unwrap(),
                "fe80::1".parse().unwrap(),
                "192.168.1.1".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_repeated_entries() {
        let nameservers = parse_resolv_conf("nameserver 1.1.1.1\nnameserver 1.1.1.1\n");
        assert_eq!(nameservers.len(), 2);
        assert_eq!(nameservers[0], nameservers[1]);
    }

    #[test]
    fn test_adapter_display() {
        let adapter = AdapterNameservers {
            name: "Ethernet".into(),
            description: "Intel(R) Ethernet Connection".into(),
            nameservers: vec!["192.168.1.1".parse().unwrap(), "8.8.8.8".parse().unwrap()],
        };
        assert_eq!(
            adapter.to_string(),
            "Ethernet(Intel(R) Ethernet Connection): 192.168.1.1, 8.8.8.8"
        );
    }

    #[test]
    fn test_adapters_need_windows() {
        let err = adapter_nameservers(&Platform::Linux).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform { ref current, .. } if current == "linux"));
    }

    #[test]
    fn test_parse_ignores_similar_keywords() {
        assert!(parse_resolv_conf("nameservers 1.1.1.1\n# nameserver 1.1.1.1\n").is_empty());
    }

    #[test]
    fn test_read_resolv_conf_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nameserver 1.1.1.1\nnameserver 8.8.8.8").unwrap();
        let nameservers = read_resolv_conf(file.path()).unwrap();
        assert_eq!(nameservers.len(), 2);
    }

    #[test]
    fn test_unsupported_platform() {
        let err = local_nameservers(&Platform::Other("plan9".into())).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform { ref current, .. } if current == "plan9"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_windows_source_outside_windows() {
        assert!(local_nameservers(&Platform::Windows).is_err());
    }
}
