use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timed collection access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,  // "list" | "create" | "update" | "delete"
    pub collection: String, // "inventory" | "facturas"
    pub duration_ns: u64,
    pub duration_ms: f64,
    pub item_count: usize,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        collection: impl Into<String>,
        elapsed: Duration,
        item_count: usize,
    ) -> Self {
        let duration_ns = elapsed.as_nanos() as u64;
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            collection: collection.into(),
            duration_ns,
            duration_ms: duration_ns as f64 / 1_000_000.0,
            item_count,
        }
    }
}

/// Entries kept before the oldest ones are dropped.
pub const MAX_ENTRIES: usize = 10_000;

/// In-memory log of the most recent timed store accesses, oldest first.
#[derive(Debug)]
pub struct MetricsStore {
    pub entries: VecDeque<MetricEntry>,
    capacity: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1_024)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(
        &mut self,
        operation: impl Into<String>,
        collection: impl Into<String>,
        elapsed: Duration,
        item_count: usize,
    ) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries
            .push_back(MetricEntry::new(operation, collection, elapsed, item_count));
    }

    /// Drops every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Aggregate stats per (operation, collection) pair.
    pub fn aggregated(&self) -> Vec<AggregatedMetric> {
        let mut map: HashMap<(String, String), Vec<u64>> = HashMap::new();

        for e in &self.entries {
            map.entry((e.operation.clone(), e.collection.clone()))
                .or_default()
                .push(e.duration_ns);
        }

        let mut out: Vec<AggregatedMetric> = map
            .into_iter()
            .map(|((operation, collection), mut durations)| {
                durations.sort_unstable();
                let count = durations.len();
                let total: u64 = durations.iter().sum();
                let avg = total / count as u64;
                let p95 = durations[((count as f64 * 0.95) as usize).min(count - 1)];

                AggregatedMetric {
                    operation,
                    collection,
                    sample_count: count,
                    min_ns: durations[0],
                    max_ns: durations[count - 1],
                    avg_ns: avg,
                    p50_ns: durations[count / 2],
                    p95_ns: p95,
                    avg_ms: avg as f64 / 1_000_000.0,
                    p95_ms: p95 as f64 / 1_000_000.0,
                }
            })
            .collect();

        out.sort_by(|a, b| {
            a.operation
                .cmp(&b.operation)
                .then(a.collection.cmp(&b.collection))
        });
        out
    }

    /// Export all entries as a CSV string.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "timestamp",
            "operation",
            "collection",
            "duration_ns",
            "duration_ms",
            "item_count",
        ])?;

        for e in &self.entries {
            wtr.write_record([
                e.timestamp.to_rfc3339(),
                e.operation.clone(),
                e.collection.clone(),
                e.duration_ns.to_string(),
                format!("{:.6}", e.duration_ms),
                e.item_count.to_string(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub operation: String,
    pub collection: String,
    pub sample_count: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub avg_ms: f64,
    pub p95_ms: f64,
}
