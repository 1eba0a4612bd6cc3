pub mod shutdown;
pub mod state;

pub use shutdown::ShutdownManager;
pub use state::{load_config, App, ConfigOverrides};

use anyhow::Result;
use std::time::{Duration, Instant};

use abc_observer::{ReportOutcome, TelemetryPayload};

/// How long and how fast to drive the engine.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after this many ticks; `None` runs until shutdown.
    pub ticks: Option<u64>,
    pub dt: f64,
    /// Sleep to hold `target_fps` instead of stepping flat out.
    pub realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: None,
            dt: 0.016,
            realtime: false,
        }
    }
}

impl App {
    /// Advances one tick and services everything hanging off it.
    pub fn step_once(&mut self, dt: f64) -> Result<()> {
        let started = Instant::now();
        let events = self.world.step(dt);
        self.tick += 1;

        self.event_log.log_events(self.tick, &events)?;
        for event in &events {
            tracing::debug!(tick = self.tick, "{}", event.to_log_line());
        }
        for text in self.world.take_pending_actions() {
            self.perf.increment_counter("actions");
            tracing::info!(tick = self.tick, action = %text, "Pending action");
        }

        self.service_agents()?;

        if self.throttle.ready(Instant::now()) {
            let payload = TelemetryPayload::from_snapshot(
                &self.world.metrics(),
                self.world.parameters(),
                self.consensus(),
                self.tick,
            );
            let listeners = self.telemetry.broadcast(&payload);
            tracing::trace!(listeners, gamma = payload.gamma, "Telemetry broadcast");
        }

        let structures =
            self.world.quarks().len() + self.world.atoms().len() + self.world.molecules().len();
        self.perf
            .record_tick(started.elapsed(), self.world.nodes().len(), structures);
        Ok(())
    }

    fn service_agents(&self) -> Result<()> {
        let Some(council) = &self.council else {
            return Ok(());
        };
        let interval = self.config.agents.interval_ticks;
        if interval > 0 && self.tick % interval == 0 {
            let queued =
                council.request_all(self.tick, self.world.parameters(), &self.world.metrics())?;
            tracing::debug!(tick = self.tick, queued, "Agent round scheduled");
        }
        for report in council.consume_reports() {
            match report.outcome {
                ReportOutcome::Completed => {
                    tracing::info!(agent = report.agent_id, tick = report.tick, "{}", report.text)
                }
                outcome => self.perf.increment_counter(&format!("agent_{outcome:?}")),
            }
        }
        Ok(())
    }

    /// Runs until the tick limit or a shutdown request, then cleans up.
    pub async fn run(&mut self, options: &RunOptions, shutdown: &ShutdownManager) -> Result<()> {
        let frame = Duration::from_secs_f64(1.0 / self.config.target_fps.max(1) as f64);
        self.world.start();
        tracing::info!(ticks = ?options.ticks, dt = options.dt, "Simulation started");

        while !shutdown.is_shutdown_requested() && options.ticks.map_or(true, |t| self.tick < t) {
            let frame_start = Instant::now();
            self.step_once(options.dt)?;

            if options.realtime {
                if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
                    tokio::time::sleep(rest).await;
                }
            } else {
                // Let the agent worker and signal listener make progress.
                tokio::task::yield_now().await;
            }
        }

        let metrics = self.world.metrics();
        tracing::info!(
            tick = self.tick,
            phase = %metrics.phase,
            quarks = metrics.quark_count,
            atoms = metrics.atom_count,
            molecules = metrics.molecule_count,
            mean_step_us = self.perf.mean_step().as_micros() as u64,
            "Simulation finished"
        );
        shutdown.cleanup(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_core::AppConfig;

    fn small_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.simulation.n_abc = 5.0;
        config.simulation.seed = Some(11);
        config
    }

    #[tokio::test]
    async fn test_run_stops_at_tick_limit() {
        let mut app = App::new(small_config(), None).unwrap();
        let options = RunOptions {
            ticks: Some(25),
            ..RunOptions::default()
        };
        app.run(&options, &ShutdownManager::default()).await.unwrap();
        assert_eq!(app.tick, 25);
        assert_eq!(app.perf().tick_count(), 25);
        assert!(!app.world.is_running());
        assert!(app.world.time() > 0.0);
    }

    #[tokio::test]
    async fn test_requested_shutdown_skips_loop() {
        let mut app = App::new(small_config(), None).unwrap();
        let shutdown = ShutdownManager::default();
        shutdown.request_shutdown();
        app.run(&RunOptions::default(), &shutdown).await.unwrap();
        assert_eq!(app.tick, 0);
    }

    #[test]
    fn test_step_keeps_engine_log_for_readers() {
        let mut app = App::new(small_config(), None).unwrap();
        app.world.mailbox_handle().post_action("scan core").unwrap();
        app.step_once(0.016).unwrap();
        app.step_once(0.016).unwrap();

        let log = &app.world.shared_memory().evolution_log;
        assert!(log.iter().any(|line| line.ends_with("Action queued: scan core")));
        let export = app.session_export().unwrap();
        assert_eq!(export.payload.evolution_log.len(), log.len());
    }

    #[test]
    fn test_consensus_without_council() {
        let app = App::new(small_config(), None).unwrap();
        assert!(app.council().is_none());
        assert_eq!(app.consensus(), 0.0);
        assert_eq!(app.agent_states().len(), 8);
    }
}
