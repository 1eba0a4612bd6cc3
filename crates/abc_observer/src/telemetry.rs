//! Telemetry relay for third-party listeners.
//!
//! The host owns the sink and decides when to broadcast; the engine never
//! sees it.

use abc_core::config::SimulationParameters;
use abc_core::stats::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPayload {
    /// Lorentz factor of the rocket clock.
    pub gamma: f64,
    pub phi: f64,
    /// Agent consensus in percent.
    pub score: f64,
    pub tick: u64,
}

impl TelemetryPayload {
    #[must_use]
    pub fn from_snapshot(
        metrics: &MetricsSnapshot,
        params: &SimulationParameters,
        consensus: f64,
        tick: u64,
    ) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            gamma: finite(metrics.dilation),
            phi: finite(params.radio_pi),
            score: finite(consensus * 100.0),
            tick,
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    /// Sends to every current listener and returns how many there were.
    fn broadcast(&self, payload: &TelemetryPayload) -> usize;
}

pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn broadcast(&self, _payload: &TelemetryPayload) -> usize {
        0
    }
}

pub struct BroadcastTelemetry {
    tx: broadcast::Sender<TelemetryPayload>,
}

impl BroadcastTelemetry {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryPayload> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl TelemetrySink for BroadcastTelemetry {
    fn broadcast(&self, payload: &TelemetryPayload) -> usize {
        // No subscribers is a normal state.
        self.tx.send(*payload).unwrap_or(0)
    }
}

/// Rate limiter for telemetry broadcasts.
#[derive(Debug)]
pub struct TelemetryThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl TelemetryThrottle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True at most once per interval; the first call always passes.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tick: u64) -> TelemetryPayload {
        TelemetryPayload {
            gamma: 1.66,
            phi: 1.0,
            score: 50.0,
            tick,
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let sink = BroadcastTelemetry::new(8);
        assert_eq!(sink.broadcast(&payload(0)), 0);

        let mut rx_a = sink.subscribe();
        let mut rx_b = sink.subscribe();
        assert_eq!(sink.listener_count(), 2);
        assert_eq!(sink.broadcast(&payload(7)), 2);
        assert_eq!(rx_a.recv().await.unwrap().tick, 7);
        assert_eq!(rx_b.recv().await.unwrap().tick, 7);
    }

    #[test]
    fn test_null_sink() {
        assert_eq!(NullTelemetry.broadcast(&payload(1)), 0);
    }

    #[test]
    fn test_throttle() {
        let mut throttle = TelemetryThrottle::new(Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(throttle.ready(t0));
        assert!(!throttle.ready(t0 + Duration::from_millis(200)));
        assert!(throttle.ready(t0 + Duration::from_millis(500)));
        assert!(!throttle.ready(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_payload_from_snapshot() {
        let params = SimulationParameters {
            n_abc: 1.0,
            velocity: 80.0,
            seed: Some(3),
            ..SimulationParameters::default()
        };
        let mut world = abc_core::World::new(params.clone());
        world.start();
        world.step(0.016);
        let p = TelemetryPayload::from_snapshot(&world.metrics(), &params, 0.5, 1);
        assert!((p.gamma - 1.0 / (1.0f64 - 0.64).sqrt()).abs() < 1e-9);
        assert_eq!(p.phi, 1.0);
        assert_eq!(p.score, 50.0);
    }
}
