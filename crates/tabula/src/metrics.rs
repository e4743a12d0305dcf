//! Measurements emitted while executing statements.
//!
//! Delivery is best effort: [`MetricsSink::record`] is called inline on the
//! query path and must return without blocking.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

/// Duration of one statement, in seconds.
pub const QUERY_EXECUTION: &str = "query_execution";

pub const CACHE_HIT: &str = "cache_hit";

pub const CACHE_MISS: &str = "cache_miss";

/// Connections checked out of the pool.
pub const CONNECTION_USAGE: &str = "connection_usage";

pub const ERROR_COUNT: &str = "error_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: IndexMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(name: impl Into<String>, kind: MetricKind, value: f64) -> Metric {
        Metric {
            name: name.into(),
            kind,
            value,
            labels: IndexMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn counter(name: impl Into<String>) -> Metric {
        Metric::new(name, MetricKind::Counter, 1.0)
    }

    pub fn gauge(name: impl Into<String>, value: f64) -> Metric {
        Metric::new(name, MetricKind::Gauge, value)
    }

    pub fn histogram(name: impl Into<String>, value: f64) -> Metric {
        Metric::new(name, MetricKind::Histogram, value)
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Metric {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Receives measurements from a [`Db`](crate::Db).
pub trait MetricsSink: Send + Sync + 'static {
    fn record(&self, metric: Metric);
}

/// Discards every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _metric: Metric) {}
}

/// Keeps the most recent measurements in memory.
///
/// Once `capacity` measurements are buffered, the oldest is dropped for each
/// new one.
#[derive(Debug)]
pub struct Collector {
    capacity: usize,
    metrics: Mutex<VecDeque<Metric>>,
}

impl Collector {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Collector {
        Collector::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Collector {
        Collector {
            capacity: capacity.max(1),
            metrics: Mutex::new(VecDeque::new()),
        }
    }

    /// Buffered measurements, oldest first.
    pub fn snapshot(&self) -> Vec<Metric> {
        self.lock().iter().cloned().collect()
    }

    /// Buffered measurements with the given name.
    pub fn named(&self, name: &str) -> Vec<Metric> {
        self.lock()
            .iter()
            .filter(|metric| metric.name == name)
            .cloned()
            .collect()
    }

    /// Sum of the values recorded under `name`.
    pub fn total(&self, name: &str) -> f64 {
        self.lock()
            .iter()
            .filter(|metric| metric.name == name)
            .map(|metric| metric.value)
            .sum()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Metric>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Collector {
    fn default() -> Self {
        Collector::new()
    }
}

impl MetricsSink for Collector {
    fn record(&self, metric: Metric) {
        let mut metrics = self.lock();
        if metrics.len() == self.capacity {
            metrics.pop_front();
        }
        metrics.push_back(metric);
    }
}
