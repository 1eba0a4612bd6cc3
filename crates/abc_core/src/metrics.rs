//! Tick-performance metrics for the host loop.
//!
//! Tracks how fast the engine steps and how large the population is, and
//! emits a structured summary through `tracing` every [`REPORT_INTERVAL`]
//! ticks. Simulation statistics live in [`crate::stats`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

pub const REPORT_INTERVAL: u64 = 1000;

pub struct Metrics {
    tick_count: AtomicU64,
    node_count: AtomicU64,
    structure_count: AtomicU64,
    total_step_nanos: AtomicU64,
    counters: Mutex<HashMap<String, u64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            node_count: AtomicU64::new(0),
            structure_count: AtomicU64::new(0),
            total_step_nanos: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed step with its duration and the population after it.
    pub fn record_tick(&self, duration: Duration, nodes: usize, structures: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.node_count.store(nodes as u64, Ordering::Relaxed);
        self.structure_count
            .store(structures as u64, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_step_nanos.fetch_add(nanos, Ordering::Relaxed);

        if tick % REPORT_INTERVAL == 0 {
            tracing::info!(
                tick,
                nodes,
                structures,
                step_us = duration.as_micros() as u64,
                mean_step_us = self.mean_step().as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn structure_count(&self) -> u64 {
        self.structure_count.load(Ordering::Relaxed)
    }

    /// Average step duration, zero before the first tick.
    #[must_use]
    pub fn mean_step(&self) -> Duration {
        let ticks = self.tick_count();
        if ticks == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.total_step_nanos.load(Ordering::Relaxed) / ticks)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global `tracing` subscriber.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
