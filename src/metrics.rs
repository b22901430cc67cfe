use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing request activity.
#[derive(Default)]
pub struct RequestMetrics {
    searches: AtomicU64,
    analyses: AtomicU64,
    records_returned: AtomicU64,
    profile_queries: AtomicU64,
}

impl RequestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed contact search and the number of records it returned.
    pub fn record_search(&self, records: u64) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.records_returned.fetch_add(records, Ordering::Relaxed);
    }

    /// Record a completed analysis.
    pub fn record_analysis(&self) {
        self.analyses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a profile filter query.
    pub fn record_profile_query(&self) {
        self.profile_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            analyses: self.analyses.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            profile_queries: self.profile_queries.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of request counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Contact searches completed since startup.
    pub searches: u64,
    /// Analyses completed since startup.
    pub analyses: u64,
    /// Contact records returned across all searches.
    pub records_returned: u64,
    /// Profile filter queries served.
    pub profile_queries: u64,
}
