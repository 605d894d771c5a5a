//! Resolver bound to a single nameserver.
//!
//! A [`ResolverBinding`] only ever talks to the nameserver it was built for:
//! no system configuration, no search list, no hosts file and no cache. This
//! is what lets every answer be attributed to exactly one nameserver.

#![allow(clippy::missing_errors_doc)]

use crate::config::limits::RESOLVE_MAX_TIMEOUT;
use crate::dns::types::QueryOutcome;
use crate::error::Result;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::error::ProtoErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::proto::rr::{RData, RecordType};
use trust_dns_resolver::TokioAsyncResolver;

/// Standard DNS port.
const DNS_PORT: u16 = 53;

/// DNS resolution primitive.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Issue exactly one query and classify its result, giving up after
    /// `limit`.
    async fn lookup(&self, name: &str, record_type: RecordType, limit: Duration) -> QueryOutcome;
}

/// Creates resolvers bound to one nameserver each.
pub trait ResolverFactory: Send + Sync {
    fn bind(&self, nameserver: IpAddr) -> Result<Arc<dyn Resolve>>;
}

/// Builder for [`ResolverBinding`].
#[derive(Debug, Clone)]
pub struct ResolverBindingBuilder {
    nameserver: IpAddr,
    port: u16,
}

impl ResolverBindingBuilder {
    /// Nameserver port (default 53).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Build the binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be constructed.
    pub fn build(self) -> Result<ResolverBinding> {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[self.nameserver], self.port, true),
        );

        let mut opts = ResolverOpts::default();
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        // Per-call limits are enforced around each lookup.
        opts.timeout = Duration::from_secs_f64(RESOLVE_MAX_TIMEOUT);

        let resolver = TokioAsyncResolver::tokio(config, opts)?;
        Ok(ResolverBinding {
            nameserver: self.nameserver,
            resolver,
        })
    }
}

/// A `trust-dns` resolver that queries exactly one nameserver.
///
/// Immutable once built.
///
/// # Example
///
/// ```ignore
/// let binding = ResolverBinding::builder("8.8.8.8".parse()?).build()?;
/// let outcome = binding.lookup("example.com", RecordType::A, Duration::from_secs(2)).await;
/// ```
pub struct ResolverBinding {
    nameserver: IpAddr,
    resolver: TokioAsyncResolver,
}

impl ResolverBinding {
    #[must_use]
    pub fn builder(nameserver: IpAddr) -> ResolverBindingBuilder {
        ResolverBindingBuilder {
            nameserver,
            port: DNS_PORT,
        }
    }

    #[must_use]
    pub fn nameserver(&self) -> IpAddr {
        self.nameserver
    }
}

#[async_trait]
impl Resolve for ResolverBinding {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        limit: Duration,
    ) -> QueryOutcome {
        let fqdn = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{name}.")
        };

        let result =
            tokio::time::timeout(limit, self.resolver.lookup(fqdn.as_str(), record_type)).await;
        let outcome = match result {
            Ok(Ok(lookup)) => classify_records(lookup.iter()),
            Ok(Err(e)) => {
                tracing::debug!("{} {record_type} @{}: {e}", name, self.nameserver);
                classify_error(&e)
            }
            Err(_) => QueryOutcome::Timeout,
        };
        tracing::debug!(
            "{} {record_type} @{} -> {}",
            name,
            self.nameserver,
            outcome.status()
        );
        outcome
    }
}

/// Factory producing [`ResolverBinding`]s on port 53.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatedResolverFactory;

impl ResolverFactory for IsolatedResolverFactory {
    fn bind(&self, nameserver: IpAddr) -> Result<Arc<dyn Resolve>> {
        Ok(Arc::new(ResolverBinding::builder(nameserver).build()?))
    }
}

/// Keep the address records of a successful lookup.
fn classify_records<'a>(records: impl Iterator<Item = &'a RData>) -> QueryOutcome {
    let addrs: Vec<IpAddr> = records
        .filter_map(|r| {
            if let Some(ip) = r.as_a() {
                Some(IpAddr::V4(*ip))
            } else if let Some(ip) = r.as_aaaa() {
                Some(IpAddr::V6(*ip))
            } else {
                None
            }
        })
        .collect();

    if addrs.is_empty() {
        QueryOutcome::NoAnswer
    } else {
        QueryOutcome::Answer(addrs)
    }
}

fn classify_error(err: &ResolveError) -> QueryOutcome {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => classify_rcode(*response_code),
        ResolveErrorKind::Timeout => QueryOutcome::Timeout,
        ResolveErrorKind::Proto(e) if matches!(e.kind(), ProtoErrorKind::Timeout) => {
            QueryOutcome::Timeout
        }
        _ => QueryOutcome::NoNameservers,
    }
}

fn classify_rcode(code: ResponseCode) -> QueryOutcome {
    match code {
        ResponseCode::NXDomain => QueryOutcome::NxDomain,
        ResponseCode::NoError => QueryOutcome::NoAnswer,
        _ => QueryOutcome::NoNameservers,
    }
}
