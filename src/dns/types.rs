//! DNS probing types and data structures.
//!
//! This module provides the value types produced by nameserver probing:
//! per-query outcomes, result rows, the address → nameservers inversion and
//! latency measurements.

use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;
use std::time::Duration;
use trust_dns_resolver::proto::rr::RecordType;

/// Terminal state of a single DNS query.
///
/// Every query ends in exactly one of these; nothing is raised past the
/// prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "records", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Address records returned by the nameserver. Never empty.
    Answer(Vec<IpAddr>),
    /// The name does not exist.
    NxDomain,
    /// The name exists but has no records of the queried type.
    NoAnswer,
    /// The nameserver failed to answer (SERVFAIL, REFUSED, connection error).
    NoNameservers,
    /// No response within the timeout.
    Timeout,
}

impl QueryOutcome {
    /// Answered addresses, if any.
    #[must_use]
    pub fn addresses(&self) -> Option<&[IpAddr]> {
        match self {
            Self::Answer(addrs) => Some(addrs),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Status text shown in place of addresses.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Answer(_) => "Answer",
            Self::NxDomain => "NXDOMAIN",
            Self::NoAnswer => "No Answer",
            Self::NoNameservers => "No Nameservers",
            Self::Timeout => "Timeout",
        }
    }
}

impl std::fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Answer(addrs) => {
                let joined: Vec<String> = addrs.iter().map(ToString::to_string).collect();
                write!(f, "{}", joined.join("\n"))
            }
            other => write!(f, "{}", other.status()),
        }
    }
}

/// Whether a record type carries IP addresses.
#[must_use]
pub fn is_address_type(record_type: RecordType) -> bool {
    matches!(record_type, RecordType::A | RecordType::AAAA)
}

/// One query against one nameserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRow {
    pub nameserver: IpAddr,
    #[serde(rename = "type", serialize_with = "serialize_display")]
    pub record_type: RecordType,
    pub outcome: QueryOutcome,
}

impl ProbeRow {
    #[must_use]
    pub fn new(nameserver: IpAddr, record_type: RecordType, outcome: QueryOutcome) -> Self {
        Self {
            nameserver,
            record_type,
            outcome,
        }
    }
}

/// Resolved address → nameservers that returned it.
///
/// Keys iterate in order of first discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressGroup {
    entries: Vec<(IpAddr, BTreeSet<IpAddr>)>,
    index: HashMap<IpAddr, usize>,
}

impl AddressGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute `address` to `nameserver`. Repeated attributions collapse.
    pub fn insert(&mut self, address: IpAddr, nameserver: IpAddr) {
        let slot = match self.index.get(&address) {
            Some(&slot) => slot,
            None => {
                self.entries.push((address, BTreeSet::new()));
                self.index.insert(address, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.insert(nameserver);
    }

    /// Nameservers that returned `address`.
    #[must_use]
    pub fn get(&self, address: &IpAddr) -> Option<&BTreeSet<IpAddr>> {
        self.index.get(address).map(|&slot| &self.entries[slot].1)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &IpAddr> {
        self.entries.iter().map(|(addr, _)| addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IpAddr, &BTreeSet<IpAddr>)> {
        self.entries.iter().map(|(addr, ns)| (addr, ns))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AddressGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (addr, nameservers) in &self.entries {
            map.serialize_entry(addr, nameservers)?;
        }
        map.end()
    }
}

/// Outcome of a timed probe (ICMP echo or timed resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LatencyResult {
    /// Round trip completed.
    Measured {
        #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
        elapsed: Duration,
    },
    /// The target could not be reached (no route, send failure, ...).
    Unreachable,
    /// No reply within the timeout.
    Timeout,
}

impl LatencyResult {
    #[must_use]
    pub fn measured(elapsed: Duration) -> Self {
        Self::Measured { elapsed }
    }

    /// Elapsed time, if measured.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::Measured { elapsed } => Some(*elapsed),
            _ => None,
        }
    }

    /// Elapsed time in milliseconds, if measured.
    #[must_use]
    pub fn millis(&self) -> Option<f64> {
        self.elapsed().map(|d| d.as_secs_f64() * 1000.0)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl std::fmt::Display for LatencyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured { elapsed } => {
                write!(f, "{:.2}ms", elapsed.as_secs_f64() * 1000.0)
            }
            Self::Unreachable => write!(f, "Unreachable"),
            Self::Timeout => write!(f, "Timeout"),
        }
    }
}

/// Reachability of one resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressReachability {
    pub address: IpAddr,
    pub latency: LatencyResult,
    /// Nameservers that returned this address.
    pub nameservers: BTreeSet<IpAddr>,
}

/// Ping and resolution timing of one nameserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameserverProbe {
    pub nameserver: IpAddr,
    pub ping: LatencyResult,
    pub resolve: LatencyResult,
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64() * 1000.0)
}
