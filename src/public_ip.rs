//! Public IP discovery.
//!
//! This module asks independent "what is my IP" services for the host's
//! public address and merges their answers by address. A service that fails
//! or returns something unparsable simply contributes nothing.

use crate::config::Settings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::future::join_all;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// A public IP lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    Ident,
    Ipify,
    Ipinfo,
    Cloudflare,
}

impl ServiceName {
    /// Every known service.
    pub const ALL: [Self; 4] = [Self::Ident, Self::Ipify, Self::Ipinfo, Self::Cloudflare];

    /// URL queried for this service.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Ident => "https://ident.me",
            Self::Ipify => "https://api64.ipify.org?format=json",
            Self::Ipinfo => "https://ipinfo.io/ip",
            Self::Cloudflare => "https://www.cloudflare.com/cdn-cgi/trace",
        }
    }

    /// Human-readable site name used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ident => "https://ident.me",
            Self::Ipify => "https://api64.ipify.org",
            Self::Ipinfo => "https://ipinfo.io/ip",
            Self::Cloudflare => "https://radar.cloudflare.com/ip",
        }
    }

    /// Pull the address out of a successful response body.
    #[must_use]
    pub fn extract(self, body: &str) -> Option<IpAddr> {
        let text = match self {
            Self::Ident | Self::Ipinfo => body.trim().to_string(),
            Self::Ipify => serde_json::from_str::<IpifyResponse>(body).ok()?.ip,
            Self::Cloudflare => body
                .split_whitespace()
                .find(|line| line.starts_with("ip="))?
                .split('=')
                .nth(1)?
                .to_string(),
        };
        text.trim().parse().ok()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ident => "ident",
            Self::Ipify => "ipify",
            Self::Ipinfo => "ipinfo",
            Self::Cloudflare => "cloudflare",
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ServiceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|svc| svc.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::parse(format!("Unknown public IP service: {s}")))
    }
}

#[derive(Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Which services to query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Exactly these services.
    Specific(BTreeSet<ServiceName>),
    /// One service picked uniformly at random.
    #[default]
    Random,
}

impl Selector {
    /// Every service.
    #[must_use]
    pub fn all() -> Self {
        Self::Specific(ServiceName::ALL.into_iter().collect())
    }

    /// A single service.
    #[must_use]
    pub fn only(service: ServiceName) -> Self {
        Self::Specific(BTreeSet::from([service]))
    }

    /// Turn the selector into a concrete service set.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeSet<ServiceName> {
        match self {
            Self::Specific(services) => services.clone(),
            Self::Random => ServiceName::ALL.choose(rng).copied().into_iter().collect(),
        }
    }
}

/// One service's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceResult {
    pub address: IpAddr,
    pub source: ServiceName,
}

/// Public addresses and the services that reported them.
///
/// Every address present was returned by at least one service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PublicIpReport {
    addresses: BTreeMap<IpAddr, BTreeSet<ServiceName>>,
}

impl PublicIpReport {
    /// Services that reported `address`.
    #[must_use]
    pub fn get(&self, address: &IpAddr) -> Option<&BTreeSet<ServiceName>> {
        self.addresses.get(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &IpAddr> {
        self.addresses.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IpAddr, &BTreeSet<ServiceName>)> {
        self.addresses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// `"<address> from <site>, <site>"` per address.
    #[must_use]
    pub fn verbose_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(addr, services)| {
                let sites: Vec<_> = services.iter().map(|s| s.label()).collect();
                format!("{addr} from {}", sites.join(", "))
            })
            .collect()
    }
}

impl FromIterator<ServiceResult> for PublicIpReport {
    fn from_iter<I: IntoIterator<Item = ServiceResult>>(iter: I) -> Self {
        let mut addresses: BTreeMap<IpAddr, BTreeSet<ServiceName>> = BTreeMap::new();
        for result in iter {
            addresses.entry(result.address).or_default().insert(result.source);
        }
        Self { addresses }
    }
}

impl std::fmt::Display for PublicIpReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addrs: Vec<String> = self.addresses().map(ToString::to_string).collect();
        write!(f, "{}", addrs.join(", "))
    }
}

/// Status and body of an HTTP GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client primitive.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issue one GET.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpFetch`] backed by `reqwest`.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Public IP prober.
///
/// # Example
///
/// ```ignore
/// let prober = PublicIpProber::from_settings(&Settings::default())?;
/// let report = prober.query(&Selector::all()).await;
/// println!("{report}");
/// ```
pub struct PublicIpProber {
    fetcher: Arc<dyn HttpFetch>,
}

impl PublicIpProber {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    /// Create a prober using `reqwest` with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(Duration::from_secs(settings.http_timeout_secs))?;
        Ok(Self::new(Arc::new(fetcher)))
    }

    /// Query the services chosen by `selector`.
    pub async fn query(&self, selector: &Selector) -> PublicIpReport {
        let services = selector.resolve(&mut rand::rng());
        self.query_services(&services).await
    }

    /// Query exactly `services`, one request each, concurrently.
    pub async fn query_services(&self, services: &BTreeSet<ServiceName>) -> PublicIpReport {
        let results = join_all(services.iter().map(|svc| self.query_one(*svc))).await;
        results.into_iter().flatten().collect()
    }

    async fn query_one(&self, service: ServiceName) -> Option<ServiceResult> {
        let response = match self.fetcher.get(service.endpoint()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("{service}: request failed: {e}");
                return None;
            }
        };
        if !response.is_success() {
            tracing::debug!("{service}: HTTP {}", response.status);
            return None;
        }
        let address = service.extract(&response.body);
        if address.is_none() {
            tracing::debug!("{service}: no address in response");
        }
        address.map(|address| ServiceResult {
            address,
            source: service,
        })
    }
}
