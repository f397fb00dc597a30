//! Pure aggregation over event snapshots.
//!
//! Everything here is a deterministic function of its input set: nearest-rank
//! percentiles, per-metric summaries, and the three fixed grouping
//! strategies (overall, by path, by device class). No hidden state.

use crate::core::types::{DeviceClass, MetricEvent, MetricName};
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Distributional statistics for one metric over one event subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Number of samples.
    pub count: usize,
    /// 50th percentile, `null` when count is 0.
    pub p50: Option<f64>,
    /// 75th percentile, `null` when count is 0.
    pub p75: Option<f64>,
    /// 95th percentile, `null` when count is 0.
    pub p95: Option<f64>,
}

impl MetricSummary {
    /// The zero-sample summary (count 0, all percentiles null).
    pub fn empty() -> Self {
        MetricSummary {
            count: 0,
            p50: None,
            p75: None,
            p95: None,
        }
    }
}

/// A full summary set: one [`MetricSummary`] per metric name.
///
/// `BTreeMap` keeps JSON key order stable across requests.
pub type SummarySet = BTreeMap<&'static str, MetricSummary>;

/// Nearest-rank percentile of an ascending-sorted slice.
///
/// For percentile `p` in `[0, 100]` the rank is `ceil((p/100) * n) - 1`,
/// clamped to `[0, n-1]`. Returns `None` on empty input. Deliberately not
/// interpolated; for small `n` interpolation would change results.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as isize - 1;
    let idx = rank.clamp(0, n as isize - 1) as usize;
    Some(sorted[idx])
}

/// Summarize one set of raw values (count, p50, p75, p95).
pub fn summarize_values(values: &mut [f64]) -> MetricSummary {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    MetricSummary {
        count: values.len(),
        p50: percentile(values, 50.0),
        p75: percentile(values, 75.0),
        p95: percentile(values, 95.0),
    }
}

/// One summary per metric name over the whole event set.
///
/// All five metric names are always present, zero-filled when absent from
/// the input, so the output shape is stable.
pub fn overall_summary(events: &[MetricEvent]) -> SummarySet {
    let mut grouped: AHashMap<MetricName, Vec<f64>> = AHashMap::new();
    for event in events {
        grouped.entry(event.name).or_default().push(event.value);
    }

    MetricName::ALL
        .iter()
        .map(|name| {
            let summary = grouped
                .get_mut(name)
                .map(|values| summarize_values(values))
                .unwrap_or_else(MetricSummary::empty);
            (name.as_str(), summary)
        })
        .collect()
}

/// One full summary set per distinct path observed in the event set.
pub fn by_path_summary(events: &[MetricEvent]) -> BTreeMap<String, SummarySet> {
    let mut grouped: AHashMap<&str, Vec<&MetricEvent>> = AHashMap::new();
    for event in events {
        grouped.entry(event.path.as_str()).or_default().push(event);
    }

    grouped
        .into_iter()
        .map(|(path, subset)| (path.to_string(), summary_set(&subset)))
        .collect()
}

/// One full summary set per device class.
///
/// Always contains exactly the four classes, zero-filled where no events
/// were observed.
pub fn by_device_summary(events: &[MetricEvent]) -> BTreeMap<&'static str, SummarySet> {
    let mut grouped: AHashMap<DeviceClass, Vec<&MetricEvent>> = AHashMap::new();
    for event in events {
        grouped.entry(event.device_class).or_default().push(event);
    }

    DeviceClass::ALL
        .iter()
        .map(|class| {
            let subset = grouped.get(class).map(Vec::as_slice).unwrap_or(&[]);
            (class.as_str(), summary_set(subset))
        })
        .collect()
}

/// Keep only events whose path starts with `prefix`.
///
/// The empty prefix is the identity filter.
pub fn filter_by_prefix(events: Vec<MetricEvent>, prefix: &str) -> Vec<MetricEvent> {
    if prefix.is_empty() {
        return events;
    }
    events.into_iter().filter(|e| e.path.starts_with(prefix)).collect()
}

fn summary_set(events: &[&MetricEvent]) -> SummarySet {
    let mut grouped: AHashMap<MetricName, Vec<f64>> = AHashMap::new();
    for event in events {
        grouped.entry(event.name).or_default().push(event.value);
    }

    MetricName::ALL
        .iter()
        .map(|name| {
            let summary = grouped
                .get_mut(name)
                .map(|values| summarize_values(values))
                .unwrap_or_else(MetricSummary::empty);
            (name.as_str(), summary)
        })
        .collect()
}
