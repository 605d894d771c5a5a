//! Timeout bounds for probes.
//!
//! Ping timeouts are whole seconds, resolution timeouts fractional.

use std::time::Duration;

/// Lower bound for an ICMP echo timeout, in seconds.
pub const PING_MIN_TIMEOUT: u64 = 1;
/// Upper bound for an ICMP echo timeout, in seconds.
pub const PING_MAX_TIMEOUT: u64 = 8;
/// Lower bound for a resolution timeout, in seconds.
pub const RESOLVE_MIN_TIMEOUT: f64 = 0.1;
/// Upper bound for a resolution timeout, in seconds.
pub const RESOLVE_MAX_TIMEOUT: f64 = 8.0;

/// Domain used when measuring resolution time without a target.
pub const EXAMPLE_DOMAIN: &str = "example.com";

/// Clamp a ping timeout into `[PING_MIN_TIMEOUT, PING_MAX_TIMEOUT]`.
#[must_use]
pub fn clamp_ping_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(PING_MIN_TIMEOUT, PING_MAX_TIMEOUT))
}

/// Clamp a resolution timeout into `[RESOLVE_MIN_TIMEOUT, RESOLVE_MAX_TIMEOUT]`.
///
/// NaN maps to the minimum.
#[must_use]
pub fn clamp_resolve_timeout(secs: f64) -> Duration {
    let secs = if secs.is_nan() {
        RESOLVE_MIN_TIMEOUT
    } else {
        secs.clamp(RESOLVE_MIN_TIMEOUT, RESOLVE_MAX_TIMEOUT)
    };
    Duration::from_secs_f64(secs)
}
