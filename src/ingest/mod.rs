//! Beacon payload sanitization and sampling.
//!
//! The beacon endpoint is public, so everything arriving here is treated as
//! attacker-controlled: unknown metric names, non-finite values, and
//! unparseable paths are silently dropped per event, never surfaced as hard
//! errors, and a bad element never aborts the rest of a batch.

pub mod device;

pub use device::classify_device;

use crate::core::types::{DeviceClass, MetricEvent, MetricName};
use serde::Deserialize;
use std::str::FromStr;

/// Maximum stored path length in bytes (path + query, origin stripped).
const MAX_PATH_LEN: usize = 512;

/// Maximum length of the optional descriptive string fields.
const MAX_LABEL_LEN: usize = 32;

/// One raw, untrusted event as reported by a browser beacon.
///
/// Every field is loosely typed; the sanitizer decides what survives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    /// Reported metric name, e.g. "LCP".
    pub name: Option<String>,
    /// Reported measurement.
    pub value: Option<f64>,
    /// Reported URL or path.
    pub path: Option<String>,
    /// Reported capture time in epoch milliseconds.
    pub timestamp: Option<f64>,
    /// Reported navigation type.
    #[serde(default, rename = "navigationType")]
    pub navigation_type: Option<String>,
    /// Reported effective connection type.
    #[serde(default, rename = "connectionType")]
    pub connection_type: Option<String>,
}

/// Validate and normalize one raw event, or drop it.
///
/// `device_class` comes from the request's User-Agent header, never from the
/// payload. Returns `None` for anything that must not reach the store:
/// unknown metric names, non-finite values, paths that do not normalize to
/// a leading `/`.
pub fn sanitize_event(raw: RawEvent, now_ms: u64, device_class: DeviceClass) -> Option<MetricEvent> {
    let name = MetricName::from_str(raw.name.as_deref()?).ok()?;

    let value = raw.value?;
    if !value.is_finite() {
        return None;
    }
    let value = value.clamp(0.0, name.max_value());

    let path = normalize_path(raw.path.as_deref()?)?;

    // Clamp to [0, now]; a missing or non-finite timestamp means "now"
    let timestamp = match raw.timestamp {
        Some(ts) if ts.is_finite() => (ts.max(0.0) as u64).min(now_ms),
        _ => now_ms,
    };

    Some(MetricEvent {
        name,
        value,
        path,
        timestamp,
        navigation_type: raw.navigation_type.map(|s| truncate(&s, MAX_LABEL_LEN)),
        connection_type: raw.connection_type.map(|s| truncate(&s, MAX_LABEL_LEN)),
        device_class,
    })
}

/// Sanitize a batch, keeping only the valid elements in input order.
pub fn sanitize_batch(
    raw: Vec<RawEvent>,
    now_ms: u64,
    device_class: DeviceClass,
) -> Vec<MetricEvent> {
    raw.into_iter()
        .filter_map(|event| sanitize_event(event, now_ms, device_class))
        .collect()
}

/// Strip any origin and keep path + query, enforcing a leading `/`.
///
/// Never stores a hostname: `https://example.com/a?b=1` becomes `/a?b=1`.
fn normalize_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let path = if let Some(scheme_end) = raw.find("://") {
        // Full URL: drop scheme and authority, keep everything from the
        // first slash after the host
        let after_scheme = &raw[scheme_end + 3..];
        match after_scheme.find('/') {
            Some(slash) => &after_scheme[slash..],
            None => "/",
        }
    } else if raw.starts_with("//") {
        // Protocol-relative URL
        let after_host = &raw[2..];
        match after_host.find('/') {
            Some(slash) => &after_host[slash..],
            None => "/",
        }
    } else {
        raw
    };

    if !path.starts_with('/') {
        return None;
    }

    // Fragments are client-side only
    let path = path.split('#').next().unwrap_or(path);

    Some(truncate(path, MAX_PATH_LEN))
}

/// Truncate to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Probabilistic accept/reject gate applied per beacon request.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    rate: f64,
}

impl Sampler {
    /// Create a sampler with the given accept rate in `[0.0, 1.0]`.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    /// Decide whether to accept a request.
    pub fn should_accept(&self) -> bool {
        if self.rate >= 1.0 {
            true
        } else if self.rate <= 0.0 {
            false
        } else {
            rand::random::<f64>() < self.rate
        }
    }
}
