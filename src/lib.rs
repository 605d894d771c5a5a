//! netter - a small network diagnostics toolkit.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Discovering the host's public IP address via several lookup services
//! - Listing the nameservers configured on this host
//! - Resolving a domain against each nameserver separately
//! - Measuring nameserver ping and resolution latency
//!
//! # Library Usage
//!
//! ```ignore
//! use netter::{IcmpPinger, IsolatedResolverFactory, ProbeAggregator, PublicIpProber, Selector};
//!
//! // Public IP from every service
//! let prober = PublicIpProber::from_settings(&Settings::default())?;
//! let report = prober.query(&Selector::all()).await;
//!
//! // Which addresses does each nameserver hand out?
//! let aggregator = ProbeAggregator::new(Arc::new(IsolatedResolverFactory), Arc::new(IcmpPinger::new()?));
//! let rows = aggregator.probe_domain("example.com", &nameservers, true).await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Public IP from a random service, or all of them
//! netter public-ip
//! netter public-ip --all --sites
//!
//! # Local nameservers
//! netter nameserver
//!
//! # Ping and time each nameserver
//! netter nameserver probe 8.8.8.8 1.1.1.1
//!
//! # Resolve a domain through each nameserver, then ping the answers
//! netter nameserver query --domain rust-lang.org -6 --ping
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod ping;
pub mod platform;
pub mod public_ip;
pub mod report;
pub mod system;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, Settings};
pub use dns::types::{
    AddressGroup, AddressReachability, LatencyResult, NameserverProbe, ProbeRow, QueryOutcome,
};
pub use dns::{IsolatedResolverFactory, NameProber, ProbeAggregator, ResolverBinding};
pub use error::{Error, Result};
pub use ping::{IcmpPinger, Reachability};
pub use platform::Platform;
pub use public_ip::{PublicIpProber, PublicIpReport, Selector, ServiceName};
