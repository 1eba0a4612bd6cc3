//! The Evolution Engine.
//!
//! [`World`] exclusively owns and mutates the simulation state. Hosts drive
//! it with [`World::step`], reparameterise it with
//! [`World::update_parameters`] and rebuild it with [`World::reset`]. Every
//! other component reads through the accessors below or writes through a
//! [`MailboxHandle`].

use std::collections::VecDeque;

use abc_data::{
    Atom, Clocks, CollapseMarker, EntangledPair, Molecule, Node, Phase, Quark, SharedMemory,
    Spaceship,
};
use rand_chacha::ChaCha8Rng;

use crate::config::{EngineConfig, SimulationParameters};
use crate::events::EvolutionEvent;
use crate::mailbox::{Mailbox, MailboxHandle};
use crate::math::finite_or_zero;
use crate::stats::{MetricsSnapshot, Statistics};
use crate::systems::field::DeformationField;

pub mod init;
pub mod update;

/// Probability rate of the node-triad gate, per unit strong energy and time.
pub const QUARK_GATE_RATE: f64 = 1.0;
/// Probability rate of the entanglement gate, per unit weak energy and time.
pub const ENTANGLE_GATE_RATE: f64 = 1.0;

#[derive(Debug)]
pub struct World {
    params: SimulationParameters,
    engine: EngineConfig,
    seed: u64,
    rng: ChaCha8Rng,
    running: bool,
    time: f64,
    next_id: u64,

    nodes: Vec<Node>,
    quarks: Vec<Quark>,
    atoms: Vec<Atom>,
    molecules: Vec<Molecule>,
    entangled: Vec<EntangledPair>,
    collapse_markers: Vec<CollapseMarker>,

    fabric: DeformationField,
    clocks: Clocks,
    spaceship: Spaceship,
    rigidity: f64,
    phase: Phase,
    statistics: Statistics,

    history: VecDeque<EvolutionEvent>,
    mailbox: Mailbox,
}

impl World {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    #[must_use]
    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    /// Seed the current population was generated from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn quarks(&self) -> &[Quark] {
        &self.quarks
    }

    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[must_use]
    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    #[must_use]
    pub fn entangled(&self) -> &[EntangledPair] {
        &self.entangled
    }

    #[must_use]
    pub fn collapse_markers(&self) -> &[CollapseMarker] {
        &self.collapse_markers
    }

    #[must_use]
    pub fn fabric(&self) -> &DeformationField {
        &self.fabric
    }

    #[must_use]
    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    #[must_use]
    pub fn spaceship(&self) -> &Spaceship {
        &self.spaceship
    }

    #[must_use]
    pub fn rigidity(&self) -> f64 {
        self.rigidity
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Most recent evolution events, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<EvolutionEvent> {
        &self.history
    }

    #[must_use]
    pub fn shared_memory(&self) -> &SharedMemory {
        self.mailbox.memory()
    }

    /// A write-only handle for the agent/UI layer.
    #[must_use]
    pub fn mailbox_handle(&self) -> MailboxHandle {
        self.mailbox.handle()
    }

    /// Removes and returns the evolution log lines accumulated so far.
    pub fn drain_evolution_log(&mut self) -> Vec<String> {
        self.mailbox.drain_log()
    }

    pub fn take_pending_actions(&mut self) -> Vec<String> {
        self.mailbox.take_pending_actions()
    }

    /// Pure projection of the current state. Never mutates the world.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        let collapsed = self.nodes.iter().filter(|n| n.collapsed).count();
        let dims = self.params.dimension_count;
        let temperature = if dims > 0.0 {
            2.0 * self.statistics.mean_energy / dims
        } else {
            0.0
        };

        MetricsSnapshot {
            node_count: self.nodes.len(),
            active_node_count: self.nodes.len() - collapsed,
            collapsed_count: collapsed,
            quark_count: self.quarks.len(),
            atom_count: self.atoms.len(),
            molecule_count: self.molecules.len(),
            entangled_count: self.entangled.len(),
            mean_energy: self.statistics.mean_energy,
            std_dev_energy: self.statistics.std_dev_energy,
            entropy: self.statistics.entropy,
            temperature: finite_or_zero(temperature),
            complexity: self.statistics.complexity,
            entanglement_index: self.statistics.entanglement_index,
            coherence: self.statistics.coherence,
            rigidity: self.rigidity,
            phase: self.phase,
            scale_label: self.params.scale_label().to_string(),
            time: self.time,
            earth_time: self.clocks.earth.ticks,
            rocket_time: self.clocks.rocket.ticks,
            earth_state: self.clocks.earth.state,
            rocket_state: self.clocks.rocket.state,
            dilation: self.clocks.rocket.dilation,
        }
        .sanitized()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, events: &[EvolutionEvent]) {
        for event in events {
            while self.history.len() >= self.engine.history_capacity.max(1) {
                self.history.pop_front();
            }
            self.history.push_back(event.clone());
            self.mailbox.push_log(event.to_log_line());
        }
    }
}
