//! Time-warp detection for nominally uniform timestamp sequences
//!
//! The expected step is taken from the very first interval and never
//! recomputed. Every later interval that deviates from it by more than the
//! tolerance is reported, unless the current timestamp is not larger than the
//! expected step. That second condition suppresses the huge negative deltas a
//! fixed-width counter produces when it wraps back to a small value. It also
//! hides genuine jumps that land on a small value; that is a known limitation
//! of the heuristic, not a modular unwrap.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default allowed deviation from the expected step
pub const DEFAULT_TOLERANCE: u64 = 10;

/// Detector settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// Maximum |delta - expected| that still counts as on-schedule
    pub tolerance: u64,
    /// Only scan this many entries from the start (None = all)
    pub scan_limit: Option<usize>,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            scan_limit: None,
        }
    }
}

/// A detected jump between two consecutive timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    /// Index of the later entry of the pair
    pub index: usize,
    pub previous: u64,
    pub current: u64,
    pub observed_delta: i128,
    pub expected_delta: i128,
}

/// Outcome of a full scan, including counts for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarpReport {
    pub entries_parsed: usize,
    pub entries_checked: usize,
    /// None when fewer than two entries were checked
    pub expected_delta: Option<i128>,
    pub tolerance: u64,
    pub anomalies: Vec<Anomaly>,
}

/// Signed difference `current - previous`, exact for any pair of u64
fn delta(previous: u64, current: u64) -> i128 {
    i128::from(current) - i128::from(previous)
}

/// Detect time warps in `series`.
///
/// Series with fewer than two (checked) entries yield no anomalies.
pub fn detect(series: &[u64], config: &WarpConfig) -> Vec<Anomaly> {
    let checked = config
        .scan_limit
        .map_or(series.len(), |limit| limit.min(series.len()));
    let series = &series[..checked];

    let [first, second, ..] = series else {
        return Vec::new();
    };
    let expected = delta(*first, *second);

    series
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (previous, current) = (pair[0], pair[1]);
            let observed = delta(previous, current);
            let deviation = (observed - expected).unsigned_abs();

            let off_schedule = deviation > u128::from(config.tolerance);
            let past_wrap = i128::from(current) > expected;

            if off_schedule && past_wrap {
                debug!(
                    index = i + 1,
                    previous,
                    current,
                    observed = %observed,
                    expected = %expected,
                    "time warp"
                );
                Some(Anomaly {
                    index: i + 1,
                    previous,
                    current,
                    observed_delta: observed,
                    expected_delta: expected,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Run [`detect`] and package the result with parse/check counts
pub fn scan(series: &[u64], config: &WarpConfig) -> WarpReport {
    let entries_checked = config
        .scan_limit
        .map_or(series.len(), |limit| limit.min(series.len()));
    let expected_delta = match &series[..entries_checked] {
        [first, second, ..] => Some(delta(*first, *second)),
        _ => None,
    };
    let anomalies = detect(series, config);

    info!(
        parsed = series.len(),
        checked = entries_checked,
        warps = anomalies.len(),
        "time warp scan complete"
    );

    WarpReport {
        entries_parsed: series.len(),
        entries_checked,
        expected_delta,
        tolerance: config.tolerance,
        anomalies,
    }
}

impl WarpReport {
    /// Human-readable report, one line per anomaly plus header and summary
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        if self.entries_checked < self.entries_parsed {
            out.push_str(&format!(
                "Checking {} of {} parsed entries for time warps\n",
                self.entries_checked, self.entries_parsed
            ));
        } else {
            out.push_str(&format!(
                "Checking {} parsed entries for time warps\n",
                self.entries_parsed
            ));
        }

        for anomaly in &self.anomalies {
            out.push_str(&format!(
                "time warp of {} ({} vs {}) for entry {}\n",
                anomaly.observed_delta, anomaly.current, anomaly.previous, anomaly.index
            ));
        }

        match self.expected_delta {
            Some(expected) => out.push_str(&format!(
                "Found {} time jumps much bigger than {}\n",
                self.anomalies.len(),
                expected
            )),
            None => out.push_str("Found 0 time jumps (need at least 2 entries)\n"),
        }

        out
    }

    /// JSON report for machine parsing
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
