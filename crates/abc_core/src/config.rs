//! Configuration management for the ABC simulator.
//!
//! [`SimulationParameters`] is the engine's parameter store: a flat record of
//! numeric knobs that the host may patch at any time with a
//! [`ParameterPatch`]. [`AppConfig`] bundles it with engine tuning, the agent
//! layer and telemetry settings and maps to a `config.toml` file.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! target_fps = 60
//!
//! [simulation]
//! n_abc = 100.0
//! density = 1.0
//! strong_energy = 1.0
//! seed = 42
//!
//! [engine]
//! layout = "grid"
//!
//! [agents]
//! enabled = true
//! timeout_ms = 5000
//! ```

use abc_data::SCALE_LABELS;
use serde::{Deserialize, Serialize};

use crate::math::finite_or_zero;

/// Upper bound on the initial population, whatever the knobs say.
pub const MAX_NODE_COUNT: usize = 50_000;

/// Base proximity for node triads and collapse pairs, scaled by `radio_pi`.
pub const BASE_PROXIMITY: f64 = 0.15;

/// Named presets, snake_case.
pub const PRESET_NAMES: [&str; 5] = [
    "planck_soup",
    "atomic_formation",
    "black_hole",
    "light_speed_test",
    "quantum_entanglement",
];

/// The engine's parameter store.
///
/// All fields are plain floats with no range validation; the engine guards
/// every use against non-finite and negative values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationParameters {
    /// Index into [`SCALE_LABELS`].
    pub scale: f64,
    /// Number of initial A/B/C triads.
    pub n_abc: f64,
    pub central_mass: f64,
    pub time_speed: f64,
    /// Spaceship speed in percent of c.
    pub velocity: f64,
    pub density: f64,
    pub strong_energy: f64,
    pub weak_energy: f64,
    pub radio_pi: f64,
    pub evolution_rate: f64,
    pub dimension_count: f64,
    pub initial_rigidity: f64,
    /// Fixed RNG seed. When absent the engine draws one at construction.
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            scale: 0.0,
            n_abc: 100.0,
            central_mass: 1.0,
            time_speed: 1.0,
            velocity: 80.0,
            density: 1.0,
            strong_energy: 1.0,
            weak_energy: 0.1,
            radio_pi: 1.0,
            evolution_rate: 0.05,
            dimension_count: 3.0,
            initial_rigidity: 10.0,
            seed: None,
        }
    }
}

impl SimulationParameters {
    /// Initial population: `round(max(n_abc, 0) × 3 × max(density, 0))`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let raw = self.n_abc.max(0.0) * 3.0 * self.density.max(0.0);
        if !raw.is_finite() {
            return 0;
        }
        (raw.round() as usize).min(MAX_NODE_COUNT)
    }

    /// Effective time step: `max(dt, 0) × max(time_speed, 0)`.
    #[must_use]
    pub fn effective_dt(&self, dt: f64) -> f64 {
        finite_or_zero(dt.max(0.0) * self.time_speed.max(0.0))
    }

    #[must_use]
    pub fn proximity_threshold(&self) -> f64 {
        finite_or_zero(BASE_PROXIMITY * self.radio_pi).max(0.0)
    }

    /// Spaceship speed as a fraction of c.
    #[must_use]
    pub fn speed_fraction(&self) -> f64 {
        finite_or_zero(self.velocity / 100.0).clamp(0.0, crate::math::MAX_SPEED_FRACTION)
    }

    #[must_use]
    pub fn scale_label(&self) -> &'static str {
        let idx = finite_or_zero(self.scale.round()).clamp(0.0, (SCALE_LABELS.len() - 1) as f64);
        SCALE_LABELS[idx as usize]
    }

    /// False when any field is NaN or infinite (such values do not survive JSON).
    #[must_use]
    pub fn all_finite(&self) -> bool {
        [
            self.scale,
            self.n_abc,
            self.central_mass,
            self.time_speed,
            self.velocity,
            self.density,
            self.strong_energy,
            self.weak_energy,
            self.radio_pi,
            self.evolution_rate,
            self.dimension_count,
            self.initial_rigidity,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Shallow-merges `patch` over these parameters.
    ///
    /// Returns `true` when the patch changed a population-determining field
    /// (`n_abc` or `density`).
    pub fn apply(&mut self, patch: &ParameterPatch) -> bool {
        let population_changed = patch.n_abc.is_some_and(|v| v != self.n_abc)
            || patch.density.is_some_and(|v| v != self.density);

        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = patch.$field { self.$field = v; })*
            };
        }
        merge!(
            scale,
            n_abc,
            central_mass,
            time_speed,
            velocity,
            density,
            strong_energy,
            weak_energy,
            radio_pi,
            evolution_rate,
            dimension_count,
            initial_rigidity
        );
        if patch.seed.is_some() {
            self.seed = patch.seed;
        }
        population_changed
    }

    /// Looks up a named preset. Accepts snake_case or camelCase names.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        let base = Self::default();
        let preset = match name {
            "planck_soup" | "planckSoup" => Self {
                scale: 0.0,
                n_abc: 300.0,
                central_mass: 0.0,
                time_speed: 5.0,
                velocity: 90.0,
                density: 0.1,
                strong_energy: 0.1,
                weak_energy: 1.0,
                radio_pi: 3.0,
                evolution_rate: 0.2,
                ..base
            },
            "atomic_formation" | "atomicFormation" => Self {
                scale: 1.0,
                n_abc: 400.0,
                central_mass: 0.0,
                time_speed: 0.5,
                velocity: 0.0,
                density: 3.0,
                strong_energy: 5.0,
                weak_energy: 0.001,
                radio_pi: 1.0,
                evolution_rate: 0.01,
                ..base
            },
            "black_hole" | "blackHole" => Self {
                scale: 6.0,
                n_abc: 500.0,
                central_mass: 15.0,
                time_speed: 0.2,
                velocity: 0.0,
                density: 5.0,
                strong_energy: 10.0,
                weak_energy: 0.001,
                radio_pi: 0.2,
                evolution_rate: 0.05,
                ..base
            },
            "light_speed_test" | "lightSpeedTest" => Self {
                scale: 8.0,
                n_abc: 150.0,
                central_mass: -2.0,
                time_speed: 2.0,
                velocity: 99.0,
                density: 0.5,
                strong_energy: 0.5,
                weak_energy: 0.5,
                radio_pi: 1.5,
                evolution_rate: 0.1,
                ..base
            },
            "quantum_entanglement" | "quantumEntanglement" => Self {
                scale: 0.0,
                n_abc: 200.0,
                central_mass: 0.5,
                time_speed: 1.0,
                velocity: 0.0,
                density: 2.0,
                strong_energy: 2.0,
                weak_energy: 2.0,
                radio_pi: 2.5,
                evolution_rate: 0.1,
                ..base
            },
            _ => return None,
        };
        Some(preset)
    }
}

/// Partial update of [`SimulationParameters`].
///
/// Deserializes from any JSON object. Unknown keys are ignored and the
/// camelCase spellings used by browser front-ends are accepted as aliases.
/// A field whose value has the wrong type is dropped; the rest still apply.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParameterPatch {
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub n_abc: Option<f64>,
    #[serde(
        alias = "centralMass",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub central_mass: Option<f64>,
    #[serde(
        alias = "timeSpeed",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_speed: Option<f64>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(
        alias = "strongEnergy",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub strong_energy: Option<f64>,
    #[serde(
        alias = "weakEnergy",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub weak_energy: Option<f64>,
    #[serde(
        alias = "radioPi",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub radio_pi: Option<f64>,
    #[serde(
        alias = "evolutionRate",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub evolution_rate: Option<f64>,
    #[serde(
        alias = "dimensionCount",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub dimension_count: Option<f64>,
    #[serde(
        alias = "initialRigidity",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_rigidity: Option<f64>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Reads one patch field, turning a type mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(%value, error = %e, "Ignoring mistyped patch field");
            Ok(None)
        }
    }
}

impl ParameterPatch {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Radial,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KindAssignment {
    #[default]
    RoundRobin,
    Random,
}

/// Engine tuning that is not part of the live parameter surface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: Layout,
    pub kind_assignment: KindAssignment,
    /// Evolution log lines kept in the mailbox.
    pub log_capacity: usize,
    /// Pending actions kept in the mailbox.
    pub action_capacity: usize,
    /// Bound of the channel feeding the mailbox.
    pub mailbox_capacity: usize,
    /// Evolution events kept in the in-memory history.
    pub history_capacity: usize,
    /// Lifetime of collapse markers in simulation time.
    pub collapse_marker_ttl: f64,
    /// Cells per side of the deformation field, minus one.
    pub grid_resolution: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Radial,
            kind_assignment: KindAssignment::RoundRobin,
            log_capacity: 50,
            action_capacity: 32,
            mailbox_capacity: 64,
            history_capacity: 256,
            collapse_marker_ttl: 1.0,
            grid_resolution: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub enabled: bool,
    /// Upper bound on a single completion request.
    pub timeout_ms: u64,
    /// Ticks between scheduled agent analyses.
    pub interval_ticks: u64,
    pub max_reports: usize,
    /// Completion endpoint. `None` selects the offline heuristic client.
    pub endpoint: Option<String>,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 8_000,
            interval_ticks: 120,
            max_reports: 100,
            endpoint: None,
            model: "abc-observer".to_string(),
            api_key_env: "ABC_SIM_API_KEY".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Minimum wall-clock gap between broadcasts.
    pub interval_ms: u64,
    pub channel_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 500,
            channel_capacity: 64,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationParameters,
    pub engine: EngineConfig,
    pub agents: AgentConfig,
    pub telemetry: TelemetryConfig,
    pub target_fps: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationParameters::default(),
            engine: EngineConfig::default(),
            agents: AgentConfig::default(),
            telemetry: TelemetryConfig::default(),
            target_fps: 60,
        }
    }
}

impl AppConfig {
    /// Validates the configuration.
    ///
    /// The engine itself tolerates any parameter values; these rules only
    /// reject configurations that are certainly mistakes.
    ///
    /// # Validation Rules
    /// - Population knobs must be finite and non-negative
    /// - Time speed and rigidity must be finite and non-negative
    /// - Buffer capacities must be positive
    /// - Target FPS must be in `1..=240`
    pub fn validate(&self) -> anyhow::Result<()> {
        let sim = &self.simulation;
        anyhow::ensure!(
            sim.n_abc.is_finite() && sim.n_abc >= 0.0,
            "n_abc must be finite and non-negative"
        );
        anyhow::ensure!(
            sim.density.is_finite() && sim.density >= 0.0,
            "Density must be finite and non-negative"
        );
        anyhow::ensure!(
            sim.time_speed.is_finite() && sim.time_speed >= 0.0,
            "Time speed must be finite and non-negative"
        );
        anyhow::ensure!(
            sim.initial_rigidity.is_finite() && sim.initial_rigidity >= 0.0,
            "Initial rigidity must be finite and non-negative"
        );
        anyhow::ensure!(
            sim.evolution_rate.is_finite(),
            "Evolution rate must be finite"
        );
        anyhow::ensure!(
            (0.0..=100.0).contains(&sim.velocity),
            "Velocity must be in [0, 100] percent of c"
        );

        anyhow::ensure!(
            self.engine.log_capacity > 0,
            "Log capacity must be positive"
        );
        anyhow::ensure!(
            self.engine.action_capacity > 0,
            "Action capacity must be positive"
        );
        anyhow::ensure!(
            self.engine.mailbox_capacity > 0,
            "Mailbox capacity must be positive"
        );
        anyhow::ensure!(
            self.engine.grid_resolution > 0 && self.engine.grid_resolution <= 512,
            "Grid resolution must be in [1, 512]"
        );

        anyhow::ensure!(self.agents.timeout_ms > 0, "Agent timeout must be positive");
        anyhow::ensure!(
            self.telemetry.channel_capacity > 0,
            "Telemetry channel capacity must be positive"
        );

        anyhow::ensure!(self.target_fps > 0, "Target FPS must be positive");
        anyhow::ensure!(self.target_fps <= 240, "Target FPS too high (max 240)");

        Ok(())
    }

    /// Parses and validates a `config.toml` document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration with the named simulation preset.
    pub fn with_preset(name: &str) -> anyhow::Result<Self> {
        let simulation = SimulationParameters::preset(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown preset '{name}'"))?;
        Ok(Self {
            simulation,
            ..Self::default()
        })
    }

    /// Hash of everything that influences simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.simulation).as_bytes());
        hasher.update(format!("{:?}", self.engine).as_bytes());
        hex::encode(hasher.finalize())
    }
}
