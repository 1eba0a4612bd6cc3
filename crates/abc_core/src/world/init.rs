use std::collections::VecDeque;
use std::f64::consts::TAU;

use abc_data::{Clocks, Node, NodeKind, Phase, Spaceship, Vec2, PLANCK_ENERGY};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{EngineConfig, KindAssignment, Layout, ParameterPatch, SimulationParameters};
use crate::mailbox::Mailbox;
use crate::math::{finite_or_zero, gaussian};
use crate::stats::Statistics;
use crate::systems::field::DeformationField;
use crate::world::World;

/// Half-width of the square the grid layout spans.
const GRID_EXTENT: f64 = 0.8;
const INITIAL_SPEED_SIGMA: f64 = 0.005;

impl World {
    /// Builds a world with default engine tuning and populates it.
    #[must_use]
    pub fn new(params: SimulationParameters) -> Self {
        Self::with_config(params, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(params: SimulationParameters, engine: EngineConfig) -> Self {
        let seed = params
            .seed
            .unwrap_or_else(|| ChaCha8Rng::from_entropy().gen());
        let mailbox = Mailbox::new(
            engine.mailbox_capacity,
            engine.log_capacity,
            engine.action_capacity,
        );
        let mut world = Self {
            fabric: DeformationField::new(engine.grid_resolution),
            spaceship: Spaceship::new(params.speed_fraction()),
            rigidity: 0.0,
            params,
            engine,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            running: false,
            time: 0.0,
            next_id: 0,
            nodes: Vec::new(),
            quarks: Vec::new(),
            atoms: Vec::new(),
            molecules: Vec::new(),
            entangled: Vec::new(),
            collapse_markers: Vec::new(),
            clocks: Clocks::default(),
            phase: Phase::Primordial,
            statistics: Statistics::default(),
            history: VecDeque::new(),
            mailbox,
        };
        world.rebuild();
        tracing::info!(
            seed = world.seed,
            nodes = world.nodes.len(),
            "World initialised"
        );
        world
    }

    /// Discards all state and rebuilds it from the current parameters.
    ///
    /// Reseeds the RNG from the resolved seed, so the rebuilt population is
    /// identical to the one produced at construction. The user deduction in
    /// the mailbox survives; the log and pending actions do not.
    pub fn reset(&mut self) {
        self.rebuild();
        tracing::info!(seed = self.seed, nodes = self.nodes.len(), "World reset");
    }

    fn rebuild(&mut self) {
        self.time = 0.0;
        self.running = false;
        self.next_id = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.clocks = Clocks::default();
        self.spaceship = Spaceship::new(self.params.speed_fraction());
        self.rigidity = finite_or_zero(self.params.initial_rigidity).max(0.0);
        self.phase = Phase::Primordial;
        self.history.clear();
        self.mailbox.reset();
        self.fabric.clear();
        self.initialize_entities();
    }

    /// Replaces every entity collection with a fresh node population sized by
    /// [`SimulationParameters::node_count`].
    pub fn initialize_entities(&mut self) {
        self.nodes.clear();
        self.quarks.clear();
        self.atoms.clear();
        self.molecules.clear();
        self.entangled.clear();
        self.collapse_markers.clear();
        self.statistics = Statistics::default();

        let count = self.params.node_count();
        self.nodes.reserve(count);
        for index in 0..count {
            let node = self.generate_node(index, count);
            self.nodes.push(node);
        }
    }

    fn generate_node(&mut self, index: usize, count: usize) -> Node {
        let position = match self.engine.layout {
            Layout::Radial => {
                let angle = (index as f64 / count as f64) * TAU + self.rng.gen::<f64>() * 0.5;
                let radius = 0.2 + self.rng.gen::<f64>() * 0.5;
                Vec2::new(radius * angle.cos(), radius * angle.sin())
            }
            Layout::Grid => grid_position(index, count),
        };
        let kind = match self.engine.kind_assignment {
            KindAssignment::RoundRobin => NodeKind::from_index(index),
            KindAssignment::Random => NodeKind::ALL[self.rng.gen_range(0..3)],
        };
        let velocity = Vec2::new(gaussian(&mut self.rng), gaussian(&mut self.rng))
            * INITIAL_SPEED_SIGMA;

        let id = self.next_id();
        let mut node = Node::new(id, kind, position, velocity);
        node.phase = self.rng.gen::<f64>() * TAU;
        node.frequency = 1.0 + self.rng.gen::<f64>() * 2.0;
        node.base_energy =
            kind.energy_fraction() * PLANCK_ENERGY * (1.0 + gaussian(&mut self.rng) * 0.1);
        node
    }

    /// Merges `patch` into the parameters.
    ///
    /// A change to `n_abc` or `density` repopulates the world immediately
    /// when paused; while running it only takes effect on the next
    /// [`World::reset`]. Returns `true` when the population was rebuilt.
    pub fn update_parameters(&mut self, patch: &ParameterPatch) -> bool {
        let population_changed = self.params.apply(patch);
        if let Some(seed) = patch.seed {
            self.seed = seed;
        }
        if population_changed && !self.running {
            self.initialize_entities();
            tracing::info!(nodes = self.nodes.len(), "Population rebuilt after patch");
            return true;
        }
        if population_changed {
            tracing::debug!("Population change deferred until reset");
        }
        false
    }

    /// Removes every node and the entanglements referring to them.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
        self.entangled.clear();
        self.collapse_markers.clear();
    }

    /// Places a node explicitly and returns its id.
    pub fn spawn_node(&mut self, kind: NodeKind, position: Vec2, velocity: Vec2) -> u64 {
        let id = self.next_id();
        self.nodes.push(Node::new(id, kind, position, velocity));
        id
    }
}

fn grid_position(index: usize, count: usize) -> Vec2 {
    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    if side == 1 {
        return Vec2::ZERO;
    }
    let step = 2.0 * GRID_EXTENT / (side - 1) as f64;
    let col = index % side;
    let row = index / side;
    Vec2::new(-GRID_EXTENT + col as f64 * step, -GRID_EXTENT + row as f64 * step)
}
