//! Single-nameserver prober.
//!
//! A [`NameProber`] wraps one nameserver and answers three questions about
//! it: what does it return for a name, is it reachable, and how long does a
//! resolution take.

use crate::config::limits::{clamp_ping_timeout, clamp_resolve_timeout};
use crate::dns::resolver::{Resolve, ResolverFactory};
use crate::dns::types::{LatencyResult, QueryOutcome};
use crate::error::Result;
use crate::ping::Reachability;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use trust_dns_resolver::proto::rr::RecordType;

/// Prober for one nameserver.
///
/// Owns a resolver bound exclusively to that nameserver, so many probers can
/// run side by side without sharing state.
///
/// # Example
///
/// ```ignore
/// let prober = NameProber::bind(ns, &IsolatedResolverFactory, pinger)?;
/// let outcome = prober.resolve_record("example.com", RecordType::A, 2.0).await;
/// let ping = prober.test_reachability(1).await;
/// ```
#[derive(Clone)]
pub struct NameProber {
    nameserver: IpAddr,
    resolver: Arc<dyn Resolve>,
    pinger: Arc<dyn Reachability>,
}

impl NameProber {
    /// Create a prober from an already bound resolver.
    pub fn new(
        nameserver: IpAddr,
        resolver: Arc<dyn Resolve>,
        pinger: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            nameserver,
            resolver,
            pinger,
        }
    }

    /// Bind a fresh resolver to `nameserver` through `factory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be constructed.
    pub fn bind(
        nameserver: IpAddr,
        factory: &dyn ResolverFactory,
        pinger: Arc<dyn Reachability>,
    ) -> Result<Self> {
        Ok(Self::new(nameserver, factory.bind(nameserver)?, pinger))
    }

    #[must_use]
    pub fn nameserver(&self) -> IpAddr {
        self.nameserver
    }

    /// Issue one query for `name`, `timeout_secs` clamped to 0.1..=8.0.
    /// Timeouts come back as [`QueryOutcome::Timeout`].
    pub async fn resolve_record(
        &self,
        name: &str,
        record_type: RecordType,
        timeout_secs: f64,
    ) -> QueryOutcome {
        let limit = clamp_resolve_timeout(timeout_secs);
        self.resolver.lookup(name, record_type, limit).await
    }

    /// Ping the nameserver itself, `timeout_secs` clamped to 1..=8.
    pub async fn test_reachability(&self, timeout_secs: u64) -> LatencyResult {
        let limit = clamp_ping_timeout(timeout_secs);
        self.pinger.probe(self.nameserver, limit).await
    }

    /// Time one A resolution of `name`.
    ///
    /// Any completed exchange counts, NXDOMAIN and empty answers included;
    /// only a timeout is reported as such.
    pub async fn test_resolution(&self, name: &str, timeout_secs: f64) -> LatencyResult {
        let start = Instant::now();
        let outcome = self.resolve_record(name, RecordType::A, timeout_secs).await;
        let elapsed = start.elapsed();
        match outcome {
            QueryOutcome::Timeout => LatencyResult::Timeout,
            _ => LatencyResult::measured(elapsed),
        }
    }
}

impl std::fmt::Debug for NameProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameProber")
            .field("nameserver", &self.nameserver)
            .finish_non_exhaustive()
    }
}
