use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::error::{Result, VitalsError};

/// Millisecond cap for duration-valued metrics (2 minutes).
pub const MAX_DURATION_MS: f64 = 120_000.0;

/// Cap for the unitless layout-shift score.
pub const MAX_SHIFT_SCORE: f64 = 2.0;

/// The fixed set of web-vitals metrics this collector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricName {
    /// Largest Contentful Paint (ms)
    #[serde(rename = "LCP")]
    Lcp,
    /// Cumulative Layout Shift (unitless score)
    #[serde(rename = "CLS")]
    Cls,
    /// Interaction to Next Paint (ms)
    #[serde(rename = "INP")]
    Inp,
    /// First Contentful Paint (ms)
    #[serde(rename = "FCP")]
    Fcp,
    /// Time To First Byte (ms)
    #[serde(rename = "TTFB")]
    Ttfb,
}

impl MetricName {
    /// All metric kinds, in stable output order.
    pub const ALL: [MetricName; 5] = [
        MetricName::Lcp,
        MetricName::Cls,
        MetricName::Inp,
        MetricName::Fcp,
        MetricName::Ttfb,
    ];

    /// Wire name as reported by browser beacons.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Lcp => "LCP",
            MetricName::Cls => "CLS",
            MetricName::Inp => "INP",
            MetricName::Fcp => "FCP",
            MetricName::Ttfb => "TTFB",
        }
    }

    /// Upper bound a sanitized value is clamped to. CLS is a unitless
    /// score; everything else is a millisecond duration.
    pub fn max_value(&self) -> f64 {
        match self {
            MetricName::Cls => MAX_SHIFT_SCORE,
            _ => MAX_DURATION_MS,
        }
    }
}

impl FromStr for MetricName {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LCP" => Ok(MetricName::Lcp),
            "CLS" => Ok(MetricName::Cls),
            "INP" => Ok(MetricName::Inp),
            "FCP" => Ok(MetricName::Fcp),
            "TTFB" => Ok(MetricName::Ttfb),
            other => Err(VitalsError::invalid_event(format!("unknown metric name: {}", other))),
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse device bucket derived server-side from the user agent.
///
/// Used only for grouping, never for individual identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceClass {
    /// All device classes, in stable output order.
    pub const ALL: [DeviceClass; 4] = [
        DeviceClass::Mobile,
        DeviceClass::Tablet,
        DeviceClass::Desktop,
        DeviceClass::Unknown,
    ];

    /// Lowercase name used as a JSON map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
            DeviceClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observed performance sample, immutable after ingestion.
///
/// Instances are produced by the sanitizer in [`crate::ingest`]; by the time
/// an event reaches the store its value is finite and clamped, its path
/// carries no origin, and its device class has been derived server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    /// Which metric this sample measures.
    pub name: MetricName,
    /// Finite, clamped measurement (ms, or unitless for CLS).
    pub value: f64,
    /// Normalized path + query string, always starting with `/`.
    pub path: String,
    /// Capture time in epoch milliseconds, clamped to `[0, now]`.
    pub timestamp: u64,
    /// Optional navigation type ("navigate", "reload", ...), truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_type: Option<String>,
    /// Optional effective connection type ("4g", ...), truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    /// Derived device bucket.
    pub device_class: DeviceClass,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
