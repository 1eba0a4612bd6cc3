pub mod macros;

use abc_sim_lib::model::config::{EngineConfig, SimulationParameters};
use abc_sim_lib::model::entity::{NodeKind, QuarkFlavor, Vec2};
use abc_sim_lib::model::events::EvolutionEvent;
use abc_sim_lib::model::world::World;

/// Offset between nodes inside one scripted cluster.
pub const CLUSTER_SPREAD: f64 = 0.01;

/// Builds worlds for scenario tests. Defaults to an empty, quiet world:
/// no initial population, no central mass, no weak force, a fixed seed,
/// and a strong force high enough that the quark gate always opens.
#[allow(dead_code)]
pub struct EngineBuilder {
    params: SimulationParameters,
    engine: EngineConfig,
    nodes: Vec<(NodeKind, Vec2, Vec2)>,
    running: bool,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            params: SimulationParameters {
                n_abc: 0.0,
                central_mass: 0.0,
                weak_energy: 0.0,
                strong_energy: 1_000.0,
                seed: Some(7),
                ..SimulationParameters::default()
            },
            engine: EngineConfig::default(),
            nodes: Vec::new(),
            running: true,
        }
    }

    /// Starts from the stock parameters instead of the quiet defaults.
    pub fn stock(n_abc: f64, seed: u64) -> Self {
        Self {
            params: SimulationParameters {
                n_abc,
                seed: Some(seed),
                ..SimulationParameters::default()
            },
            ..Self::new()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    pub fn with_params<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationParameters),
    {
        modifier(&mut self.params);
        self
    }

    pub fn with_engine<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut EngineConfig),
    {
        modifier(&mut self.engine);
        self
    }

    pub fn with_node(mut self, kind: NodeKind, x: f64, y: f64) -> Self {
        self.nodes.push((kind, Vec2::new(x, y), Vec2::ZERO));
        self
    }

    /// Three resting nodes around `(x, y)` whose charges sum to `flavor`.
    pub fn with_triad(self, flavor: QuarkFlavor, x: f64, y: f64) -> Self {
        let kinds = match flavor {
            QuarkFlavor::Up => [NodeKind::A, NodeKind::B, NodeKind::C],
            QuarkFlavor::Down => [NodeKind::B, NodeKind::B, NodeKind::C],
            QuarkFlavor::Strange => [NodeKind::A, NodeKind::B, NodeKind::B],
            QuarkFlavor::Unknown => [NodeKind::A, NodeKind::A, NodeKind::C],
        };
        self.with_node(kinds[0], x, y)
            .with_node(kinds[1], x + CLUSTER_SPREAD, y)
            .with_node(kinds[2], x, y + CLUSTER_SPREAD)
    }

    /// Tight proximity so scripted clusters never merge with each other.
    pub fn tight(self) -> Self {
        self.with_params(|p| p.radio_pi = 0.2)
    }

    pub fn paused(mut self) -> Self {
        self.running = false;
        self
    }

    pub fn build(self) -> World {
        let mut world = World::with_config(self.params, self.engine);
        if !self.nodes.is_empty() {
            world.clear_nodes();
            for (kind, position, velocity) in self.nodes {
                world.spawn_node(kind, position, velocity);
            }
        }
        if self.running {
            world.start();
        }
        world
    }
}

/// Steps `ticks` times and returns every event emitted.
#[allow(dead_code)]
pub fn run_ticks(world: &mut World, ticks: usize, dt: f64) -> Vec<EvolutionEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(world.step(dt));
    }
    events
}

/// A scratch directory under the system temp dir, emptied first.
#[allow(dead_code)]
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("abc_sim_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
