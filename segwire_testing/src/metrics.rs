//! Metric capture for assertions.
//!
//! The debugging snapshotter only reports series that changed since the
//! previous snapshot, so take one [`MetricsSnapshot`] per assertion block
//! and query that.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Read side of a [`DebuggingRecorder`].
pub struct CapturedMetrics {
    snapshotter: Snapshotter,
}

/// Create a recorder and a handle for reading what it recorded.
///
/// Install the recorder with `metrics::with_local_recorder` for synchronous
/// code, or `metrics::set_default_local_recorder` inside a current-thread
/// runtime so spawned tasks record into it as well.
#[must_use]
pub fn capture_metrics() -> (CapturedMetrics, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let captured = CapturedMetrics {
        snapshotter: recorder.snapshotter(),
    };
    (captured, recorder)
}

impl CapturedMetrics {
    /// Take a snapshot of everything recorded since the previous one.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let series = self
            .snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(key, _, _, value)| {
                let key = key.key();
                Series {
                    name: key.name().to_owned(),
                    labels: key
                        .labels()
                        .map(|label| (label.key().to_owned(), label.value().to_owned()))
                        .collect(),
                    value,
                }
            })
            .collect();
        MetricsSnapshot { series }
    }
}

struct Series {
    name: String,
    labels: Vec<(String, String)>,
    value: DebugValue,
}

impl Series {
    fn has_label(&self, (key, value): (&str, &str)) -> bool {
        self.labels.iter().any(|(k, v)| k == key && v == value)
    }
}

/// Metric values as of one [`CapturedMetrics::snapshot`] call.
pub struct MetricsSnapshot {
    series: Vec<Series>,
}

impl MetricsSnapshot {
    /// Sum of counter `name` across series carrying `label` (or all series).
    #[must_use]
    pub fn counter(&self, name: &str, label: Option<(&str, &str)>) -> u64 {
        self.series
            .iter()
            .filter(|series| series.name == name && label.is_none_or(|l| series.has_label(l)))
            .map(|series| match series.value {
                DebugValue::Counter(count) => count,
                _ => 0,
            })
            .sum()
    }

    /// Value of gauge `name`, if it was touched.
    #[must_use]
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.series
            .iter()
            .find_map(|series| match &series.value {
                DebugValue::Gauge(gauge) if series.name == name => Some(gauge.into_inner()),
                _ => None,
            })
    }
}
