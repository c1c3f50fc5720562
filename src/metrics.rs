//! Run metrics.
//!
//! Attach a [`MetricsCollector`] to a pipeline with `Pipeline::set_metrics` and
//! every collect records into it:
//!
//! - `stages_executed`: plan steps run after the source, summed over runs
//! - `barriers_executed`: shuffles run, summed over runs
//! - `partitions`: partition count of the latest run
//! - `elements_out`: rows returned, summed over runs
//! - `execution_time_ms`: wall time of the latest run
//!
//! Custom metrics implement [`Metric`] and are registered next to these.
//!
//! ```no_run
//! use rankflow::*;
//! use rankflow::metrics::MetricsCollector;
//!
//! # fn main() -> anyhow::Result<()> {
//! let p = Pipeline::default();
//! p.set_metrics(MetricsCollector::new());
//!
//! let words = vec!["a".to_string(), "b".to_string(), "a".to_string()];
//! let counts = from_vec(&p, words).count_per_element().collect_seq()?;
//! assert_eq!(counts.len(), 2);
//!
//! if let Some(m) = p.take_metrics() {
//!     m.save_to_file("metrics.json")?;
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use serde_json::{Value, json};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A named value reported by a [`MetricsCollector`].
pub trait Metric: Send + Sync + Any {
    fn name(&self) -> &str;

    /// Current value as JSON.
    fn value(&self) -> Value;

    fn description(&self) -> Option<&str> {
        None
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared, cloneable metric registry. Clones record into the same registry.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    metrics: BTreeMap<String, Box<dyn Metric>>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section is a single insert or read.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a metric, replacing any metric with the same name.
    pub fn register(&self, metric: Box<dyn Metric>) {
        self.lock().metrics.insert(metric.name().to_string(), metric);
    }

    pub fn record_start(&self) {
        let mut g = self.lock();
        g.start_time = Some(Instant::now());
        g.end_time = None;
    }

    pub fn record_end(&self) {
        self.lock().end_time = Some(Instant::now());
    }

    /// Wall time between the latest `record_start` and `record_end`.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let g = self.lock();
        match (g.start_time, g.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Add `value` to the counter `name`, creating it at zero first if needed.
    ///
    /// A non-counter metric registered under `name` is replaced.
    pub fn increment_counter(&self, name: &str, value: u64) {
        let mut g = self.lock();
        if let Some(c) = g
            .metrics
            .get_mut(name)
            .and_then(|m| m.as_any_mut().downcast_mut::<CounterMetric>())
        {
            c.count += value;
            return;
        }
        g.metrics.insert(
            name.to_string(),
            Box::new(CounterMetric::with_value(name, value)),
        );
    }

    /// Set the counter `name` to `value`.
    pub fn set_counter(&self, name: &str, value: u64) {
        self.lock().metrics.insert(
            name.to_string(),
            Box::new(CounterMetric::with_value(name, value)),
        );
    }

    /// Value of the counter `name`, if it exists and is a counter.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        let mut g = self.lock();
        g.metrics
            .get_mut(name)
            .and_then(|m| m.as_any_mut().downcast_mut::<CounterMetric>())
            .map(|c| c.count)
    }

    /// All metrics as one JSON object, keyed by name.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let g = self.lock();
        let mut out = serde_json::Map::new();
        for (name, metric) in &g.metrics {
            let mut obj = serde_json::Map::new();
            obj.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                obj.insert("description".to_string(), json!(desc));
            }
            out.insert(name.clone(), Value::Object(obj));
        }
        if let (Some(start), Some(end)) = (g.start_time, g.end_time) {
            out.insert(
                "execution_time_ms".to_string(),
                json!({
                    "value": end.duration_since(start).as_millis(),
                    "description": "Wall time of the latest run in milliseconds",
                }),
            );
        }
        Value::Object(out)
    }

    /// Print every metric to stdout, timing first.
    pub fn print(&self) {
        println!("{self}");
    }

    /// Write [`to_json`](Self::to_json) to `path`, pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.to_json())?;
        File::create(path)?.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Name to value, without descriptions or timing.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.lock()
            .metrics
            .iter()
            .map(|(name, m)| (name.clone(), m.value()))
            .collect()
    }
}

impl Display for MetricsCollector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        let g = self.lock();
        writeln!(f, "== rankflow metrics ==")?;
        if let (Some(start), Some(end)) = (g.start_time, g.end_time) {
            let elapsed = end.duration_since(start);
            writeln!(f, "execution time: {:.3}s", elapsed.as_secs_f64())?;
        }
        for (name, metric) in &g.metrics {
            match metric.description() {
                Some(desc) => writeln!(f, "{name}: {} ({desc})", metric.value())?,
                None => writeln!(f, "{name}: {}", metric.value())?,
            }
        }
        Ok(())
    }
}

/// Monotonic counter.
pub struct CounterMetric {
    name: String,
    count: u64,
}

impl CounterMetric {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 0)
    }

    pub fn with_value(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Metric for CounterMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.count)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A single numeric reading.
pub struct GaugeMetric {
    name: String,
    value: f64,
    description: Option<String>,
}

impl GaugeMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Metric for GaugeMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.value)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
