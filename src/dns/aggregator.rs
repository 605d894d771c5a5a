//! Multi-nameserver probing and aggregation.
//!
//! This module drives one [`NameProber`] per nameserver, inverts the
//! answers into an address → nameservers table, and measures reachability
//! of every distinct resolved address.
//!
//! Probes run concurrently with bounded parallelism. Results are collected
//! with `buffered`, which yields them in submission order, so the reported
//! tables never depend on which probe finished first.

use crate::config::limits::{clamp_ping_timeout, PING_MAX_TIMEOUT, RESOLVE_MAX_TIMEOUT};
use crate::config::Settings;
use crate::dns::prober::NameProber;
use crate::dns::resolver::ResolverFactory;
use crate::dns::types::{
    is_address_type, AddressGroup, AddressReachability, NameserverProbe, ProbeRow,
};
use crate::error::Result;
use crate::ping::Reachability;
use futures::stream::{self, StreamExt};
use std::net::IpAddr;
use std::sync::Arc;
use trust_dns_resolver::proto::rr::RecordType;

/// Default number of probes in flight.
const DEFAULT_CONCURRENCY: usize = 16;

/// Probe driver over a list of nameservers.
///
/// # Example
///
/// ```ignore
/// let aggregator = ProbeAggregator::new(Arc::new(IsolatedResolverFactory), pinger);
/// let rows = aggregator.probe_domain("example.com", &nameservers, true).await?;
/// let groups = ProbeAggregator::build_address_groups(&rows);
/// let reachability = aggregator.probe_reachability(&groups).await;
/// ```
pub struct ProbeAggregator {
    factory: Arc<dyn ResolverFactory>,
    pinger: Arc<dyn Reachability>,
    concurrency: usize,
    resolve_timeout: f64,
    ping_timeout: u64,
}

impl ProbeAggregator {
    /// Create an aggregator with the widest timeouts.
    pub fn new(factory: Arc<dyn ResolverFactory>, pinger: Arc<dyn Reachability>) -> Self {
        Self {
            factory,
            pinger,
            concurrency: DEFAULT_CONCURRENCY,
            resolve_timeout: RESOLVE_MAX_TIMEOUT,
            ping_timeout: PING_MAX_TIMEOUT,
        }
    }

    /// Create an aggregator configured from `settings`.
    pub fn from_settings(
        factory: Arc<dyn ResolverFactory>,
        pinger: Arc<dyn Reachability>,
        settings: &Settings,
    ) -> Self {
        Self::new(factory, pinger)
            .concurrency(settings.concurrency)
            .resolve_timeout(settings.resolve_timeout_secs)
            .ping_timeout(settings.ping_timeout_secs)
    }

    /// Maximum probes in flight (at least 1).
    #[must_use]
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Resolution timeout in seconds, clamped per query.
    #[must_use]
    pub fn resolve_timeout(mut self, secs: f64) -> Self {
        self.resolve_timeout = secs;
        self
    }

    /// Ping timeout in seconds, clamped per probe.
    #[must_use]
    pub fn ping_timeout(mut self, secs: u64) -> Self {
        self.ping_timeout = secs;
        self
    }

    fn bind_all(&self, nameservers: &[IpAddr]) -> Result<Vec<NameProber>> {
        nameservers
            .iter()
            .map(|ns| NameProber::bind(*ns, self.factory.as_ref(), Arc::clone(&self.pinger)))
            .collect()
    }

    /// Resolve `domain` against every nameserver.
    ///
    /// Rows come back one per `(nameserver, record type)` in request order:
    /// nameservers as given (duplicates included), A before AAAA.
    ///
    /// # Errors
    ///
    /// Returns an error if a resolver cannot be bound; no query is sent in
    /// that case.
    pub async fn probe_domain(
        &self,
        domain: &str,
        nameservers: &[IpAddr],
        include_ipv6: bool,
    ) -> Result<Vec<ProbeRow>> {
        let probers = self.bind_all(nameservers)?;
        let record_types: &[RecordType] = if include_ipv6 {
            &[RecordType::A, RecordType::AAAA]
        } else {
            &[RecordType::A]
        };

        let jobs = probers
            .into_iter()
            .flat_map(|prober| record_types.iter().map(move |rt| (prober.clone(), *rt)));

        let timeout = self.resolve_timeout;
        let rows = stream::iter(jobs)
            .map(|(prober, record_type)| async move {
                let outcome = prober.resolve_record(domain, record_type, timeout).await;
                ProbeRow::new(prober.nameserver(), record_type, outcome)
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        tracing::debug!("{domain}: {} rows from {} nameservers", rows.len(), nameservers.len());
        Ok(rows)
    }

    /// Invert rows into resolved address → nameservers.
    ///
    /// Only answered A/AAAA rows contribute.
    #[must_use]
    pub fn build_address_groups(rows: &[ProbeRow]) -> AddressGroup {
        let mut group = AddressGroup::new();
        for row in rows.iter().filter(|r| is_address_type(r.record_type)) {
            if let Some(addrs) = row.outcome.addresses() {
                for addr in addrs {
                    group.insert(*addr, row.nameserver);
                }
            }
        }
        group
    }

    /// Ping every distinct address in `group`, in discovery order.
    pub async fn probe_reachability(&self, group: &AddressGroup) -> Vec<AddressReachability> {
        let timeout = clamp_ping_timeout(self.ping_timeout);
        stream::iter(group.iter())
            .map(|(address, nameservers)| {
                let pinger = Arc::clone(&self.pinger);
                async move {
                    let latency = pinger.probe(*address, timeout).await;
                    AddressReachability {
                        address: *address,
                        latency,
                        nameservers: nameservers.clone(),
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Ping each nameserver and time one resolution of `domain` through it.
    ///
    /// Both measurements run concurrently and are reported independently.
    ///
    /// # Errors
    ///
    /// Returns an error if a resolver cannot be bound.
    pub async fn probe_and_ping(
        &self,
        domain: &str,
        nameservers: &[IpAddr],
    ) -> Result<Vec<NameserverProbe>> {
        let probers = self.bind_all(nameservers)?;
        let (resolve_timeout, ping_timeout) = (self.resolve_timeout, self.ping_timeout);

        let probes = stream::iter(probers)
            .map(|prober| async move {
                let (ping, resolve) = tokio::join!(
                    prober.test_reachability(ping_timeout),
                    prober.test_resolution(domain, resolve_timeout),
                );
                NameserverProbe {
                    nameserver: prober.nameserver(),
                    ping,
                    resolve,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        Ok(probes)
    }
}
