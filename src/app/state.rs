use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use abc_core::{AppConfig, Metrics, World};
use abc_data::{AgentState, PERSONAS};
use abc_io::{EventLog, SessionExport, SessionPayload};
use abc_observer::{
    AgentCouncil, BroadcastTelemetry, CompletionClient, HeuristicClient, HttpCompletionClient,
    NullTelemetry, TelemetrySink, TelemetryThrottle,
};

/// Command-line layers applied over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub agents: bool,
}

/// Resolves the effective configuration: file, then preset, then flags.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AppConfig::from_toml(&content)?
        }
        None => AppConfig::default(),
    };

    if let Some(name) = &overrides.preset {
        config.simulation = AppConfig::with_preset(name)?.simulation;
    }
    if let Some(seed) = overrides.seed {
        config.simulation.seed = Some(seed);
    }
    if overrides.agents {
        config.agents.enabled = true;
    }
    config.validate()?;
    Ok(config)
}

pub struct App {
    pub config: AppConfig,
    pub world: World,
    pub tick: u64,
    pub(crate) council: Option<AgentCouncil>,
    pub(crate) event_log: EventLog,
    pub(crate) telemetry: Arc<dyn TelemetrySink>,
    pub(crate) throttle: TelemetryThrottle,
    pub(crate) perf: Metrics,
}

impl App {
    /// Builds the host. With agents enabled this must run inside a tokio
    /// runtime.
    pub fn new(config: AppConfig, log_dir: Option<&Path>) -> Result<Self> {
        config.validate()?;
        let world = World::with_config(config.simulation.clone(), config.engine.clone());

        let event_log = match log_dir {
            Some(dir) => EventLog::new_at(dir)?,
            None => EventLog::new_dummy(),
        };

        let council = if config.agents.enabled {
            let client: Arc<dyn CompletionClient> = if config.agents.endpoint.is_some() {
                Arc::new(HttpCompletionClient::from_config(&config.agents)?)
            } else {
                Arc::new(HeuristicClient)
            };
            Some(AgentCouncil::new(
                client,
                Some(world.mailbox_handle()),
                &config.agents,
            ))
        } else {
            None
        };

        let telemetry: Arc<dyn TelemetrySink> = if config.telemetry.enabled {
            Arc::new(BroadcastTelemetry::new(config.telemetry.channel_capacity))
        } else {
            Arc::new(NullTelemetry)
        };
        let throttle = TelemetryThrottle::new(Duration::from_millis(config.telemetry.interval_ms));

        tracing::info!(
            fingerprint = %config.fingerprint(),
            nodes = world.nodes().len(),
            seed = world.seed(),
            agents = council.is_some(),
            "App initialized"
        );

        Ok(Self {
            config,
            world,
            tick: 0,
            council,
            event_log,
            telemetry,
            throttle,
            perf: Metrics::new(),
        })
    }

    /// Replaces the telemetry sink with one owned by the caller.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    pub fn council(&self) -> Option<&AgentCouncil> {
        self.council.as_ref()
    }

    pub fn perf(&self) -> &Metrics {
        &self.perf
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn agent_states(&self) -> Vec<AgentState> {
        match &self.council {
            Some(council) => council.states(),
            None => PERSONAS.iter().map(|p| AgentState::new(p.id)).collect(),
        }
    }

    /// Mean agent confidence, or zero with no council.
    pub fn consensus(&self) -> f64 {
        self.council.as_ref().map_or(0.0, AgentCouncil::consensus)
    }

    pub fn session_export(&self) -> Result<SessionExport> {
        let payload = SessionPayload {
            parameters: self.world.parameters().clone(),
            metrics: self.world.metrics(),
            agents: self.agent_states(),
            user_deduction: self.world.shared_memory().user_deduction.clone(),
            evolution_log: self.world.shared_memory().evolution_log.iter().cloned().collect(),
        };
        Ok(SessionExport::new(payload)?)
    }

    pub fn export_session(&self, path: &Path) -> Result<()> {
        let export = self.session_export()?;
        abc_io::write_sip(path, &export)?;
        Ok(())
    }
}
