//! Reachability probing using ICMP echo.
//!
//! This module sends single ICMP echo requests and reports the round trip
//! as a [`LatencyResult`]. Failures never surface as errors: a lost reply is
//! `Timeout`, a failed send is `Unreachable`.

#![allow(clippy::missing_errors_doc)]

use crate::dns::types::LatencyResult;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use surge_ping::{Client, Config, IcmpPacket, PingIdentifier, PingSequence, SurgeError, ICMP};
use tokio::time::timeout;

/// Payload size for echo requests in bytes.
const PAYLOAD_SIZE: usize = 32;

/// Range echo sequence numbers are drawn from.
const SEQUENCE_RANGE: std::ops::RangeInclusive<u16> = 8192..=32767;

/// A single round-trip liveness check.
#[async_trait]
pub trait Reachability: Send + Sync {
    /// Probe `target` once, waiting at most `limit`.
    async fn probe(&self, target: IpAddr, limit: Duration) -> LatencyResult;
}

/// ICMP echo prober.
///
/// Sending ICMP needs either unprivileged ICMP sockets (Linux
/// `net.ipv4.ping_group_range`, macOS) or raw socket access.
///
/// # Example
///
/// ```ignore
/// let pinger = IcmpPinger::new()?;
/// let latency = pinger.probe("1.1.1.1".parse()?, Duration::from_secs(2)).await;
/// println!("{latency}");
/// ```
pub struct IcmpPinger {
    v4: Client,
    /// Absent on hosts without IPv6 support.
    v6: Option<Client>,
}

impl IcmpPinger {
    /// Create ICMPv4 and, when available, ICMPv6 clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the ICMPv4 socket cannot be opened.
    pub fn new() -> Result<Self> {
        let v4 = Client::new(&Config::default()).map_err(|e| Error::network(e.to_string()))?;
        let v6 = match Client::new(&Config::builder().kind(ICMP::V6).build()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::debug!("ICMPv6 unavailable: {e}");
                None
            }
        };
        Ok(Self { v4, v6 })
    }

    fn client_for(&self, target: IpAddr) -> Option<&Client> {
        match target {
            IpAddr::V4(_) => Some(&self.v4),
            IpAddr::V6(_) => self.v6.as_ref(),
        }
    }
}

#[async_trait]
impl Reachability for IcmpPinger {
    async fn probe(&self, target: IpAddr, limit: Duration) -> LatencyResult {
        let Some(client) = self.client_for(target) else {
            tracing::debug!("no ICMP client for {target}");
            return LatencyResult::Unreachable;
        };

        let (ident, seq) = {
            let mut rng = rand::rng();
            (rng.random::<u16>(), rng.random_range(SEQUENCE_RANGE))
        };
        let mut pinger = client.pinger(target, PingIdentifier(ident)).await;
        pinger.timeout(limit);

        let payload = [0u8; PAYLOAD_SIZE];
        // Outer bound in case the socket never reports the timeout itself.
        let result = timeout(
            limit + Duration::from_millis(100),
            pinger.ping(PingSequence(seq), &payload),
        )
        .await;

        let outcome = classify(result.map_err(|_| ()));
        tracing::debug!("ping {target}: {outcome}");
        outcome
    }
}

/// Stand-in for runs that never ping; opens no socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPinger;

#[async_trait]
impl Reachability for NoPinger {
    async fn probe(&self, _target: IpAddr, _limit: Duration) -> LatencyResult {
        LatencyResult::Unreachable
    }
}

/// Use `pinger` if it could be created, [`NoPinger`] otherwise.
///
/// A missing ICMP permission then shows up as `Unreachable` cells instead of
/// aborting the DNS measurements around it.
pub fn or_disabled<P: Reachability + 'static>(pinger: Result<P>) -> Arc<dyn Reachability> {
    match pinger {
        Ok(pinger) => Arc::new(pinger),
        Err(e) => {
            tracing::warn!("ping disabled: {e}");
            Arc::new(NoPinger)
        }
    }
}

type EchoResult = std::result::Result<(IcmpPacket, Duration), SurgeError>;

/// Map an echo attempt to a latency. `Err(())` means the outer bound fired.
fn classify(result: std::result::Result<EchoResult, ()>) -> LatencyResult {
    match result {
        Ok(Ok((_packet, rtt))) => LatencyResult::measured(rtt),
        Ok(Err(SurgeError::Timeout { .. })) | Err(()) => LatencyResult::Timeout,
        Ok(Err(e)) => {
            tracing::debug!("ping error: {e}");
            LatencyResult::Unreachable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_classify_errors() {
        let timed_out = classify(Ok(Err(SurgeError::Timeout {
            seq: PingSequence(9000),
        })));
        assert_eq!(timed_out, LatencyResult::Timeout);

        let elapsed = classify(Err(()));
        assert_eq!(elapsed, LatencyResult::Timeout);

        let io = classify(Ok(Err(SurgeError::IOError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "network unreachable",
        )))));
        assert_eq!(io, LatencyResult::Unreachable);
    }

    #[tokio::test]
    async fn test_no_pinger() {
        let result = NoPinger.probe("127.0.0.1".parse().unwrap(), Duration::from_secs(1)).await;
        assert_eq!(result, LatencyResult::Unreachable);
    }

    #[tokio::test]
    async fn test_or_disabled_falls_back() {
        let denied: Result<IcmpPinger> = Err(Error::network("Operation not permitted"));
        let pinger = or_disabled(denied);
        let result = pinger.probe("127.0.0.1".parse().unwrap(), Duration::from_secs(1)).await;
        assert_eq!(result, LatencyResult::Unreachable);
    }

    #[tokio::test]
    async fn test_ping_localhost() {
        // Needs ICMP socket permissions which CI runners lack
        if std::env::var("CI").is_ok() {
            return;
        }

        let Ok(pinger) = IcmpPinger::new() else {
            return;
        };
        let result = pinger.probe("127.0.0.1".parse().unwrap(), Duration::from_secs(1)).await;
        if let Some(ms) = result.millis() {
            assert!(ms < 1000.0);
        }
    }

    #[tokio::test]
    async fn test_ping_unroutable_is_bounded() {
        if std::env::var("CI").is_ok() {
            return;
        }

        let Ok(pinger) = IcmpPinger::new() else {
            return;
        };
        // TEST-NET-1, never routed
        let start = Instant::now();
        let result = pinger.probe("192.0.2.1".parse().unwrap(), Duration::from_secs(1)).await;
        assert!(matches!(result, LatencyResult::Timeout | LatencyResult::Unreachable));
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
