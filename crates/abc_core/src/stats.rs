use abc_data::{EntangledPair, Node, Phase};
use serde::{Deserialize, Serialize};

use crate::math::finite_or_zero;

/// Rigidity below which each phase begins, in advancing order.
pub const PHASE_THRESHOLDS: [(Phase, f64); 5] = [
    (Phase::Hadronic, 8.0),
    (Phase::Atomic, 4.0),
    (Phase::Molecular, 2.0),
    (Phase::Stellar, 1.0),
    (Phase::Cosmic, 0.5),
];

const ENTROPY_EPSILON: f64 = 1e-4;

/// The phase a given rigidity belongs to. Non-finite rigidity maps to
/// `Primordial`, which never causes a transition.
#[must_use]
pub fn phase_for_rigidity(rigidity: f64) -> Phase {
    if !rigidity.is_finite() {
        return Phase::Primordial;
    }
    PHASE_THRESHOLDS
        .iter()
        .rev()
        .find(|(_, limit)| rigidity < *limit)
        .map_or(Phase::Primordial, |(phase, _)| *phase)
}

/// Every phase strictly after `current` up to the one `rigidity` belongs to.
#[must_use]
pub fn phase_transitions(current: Phase, rigidity: f64) -> Vec<Phase> {
    let target = phase_for_rigidity(rigidity);
    let mut crossed = Vec::new();
    let mut phase = current;
    while phase < target {
        match phase.next() {
            Some(next) => {
                crossed.push(next);
                phase = next;
            }
            None => break,
        }
    }
    crossed
}

/// Derived statistics, overwritten on every tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    pub mean_energy: f64,
    pub std_dev_energy: f64,
    pub entropy: f64,
    pub complexity: f64,
    pub entanglement_index: f64,
    pub coherence: f64,
}

pub struct StatsContext<'a> {
    pub nodes: &'a [Node],
    pub quark_count: usize,
    pub atom_count: usize,
    pub molecule_count: usize,
    pub entangled: &'a [EntangledPair],
}

/// Pure aggregation over the current world contents.
#[must_use]
pub fn aggregate(ctx: &StatsContext<'_>) -> Statistics {
    let coherence = if ctx.entangled.is_empty() {
        0.0
    } else {
        ctx.entangled.iter().map(|p| p.strength).sum::<f64>() / ctx.entangled.len() as f64
    };

    if ctx.nodes.is_empty() {
        return Statistics {
            coherence: finite_or_zero(coherence),
            ..Statistics::default()
        };
    }

    let n = ctx.nodes.len() as f64;
    let mean = ctx.nodes.iter().map(Node::kinetic_energy).sum::<f64>() / n;
    let variance = ctx
        .nodes
        .iter()
        .map(|node| (node.kinetic_energy() - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let structures = (ctx.quark_count + ctx.atom_count + ctx.molecule_count) as f64;

    Statistics {
        mean_energy: finite_or_zero(mean),
        std_dev_energy: finite_or_zero(std_dev),
        entropy: finite_or_zero((std_dev + ENTROPY_EPSILON).ln()),
        complexity: finite_or_zero(structures / n),
        entanglement_index: finite_or_zero(ctx.entangled.len() as f64 / n),
        coherence: finite_or_zero(coherence),
    }
}

/// Read-only projection handed to renderers, the agent layer and exports.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub node_count: usize,
    pub active_node_count: usize,
    pub collapsed_count: usize,
    pub quark_count: usize,
    pub atom_count: usize,
    pub molecule_count: usize,
    pub entangled_count: usize,
    pub mean_energy: f64,
    pub std_dev_energy: f64,
    pub entropy: f64,
    /// `2 × mean_energy / dimension_count`.
    pub temperature: f64,
    pub complexity: f64,
    pub entanglement_index: f64,
    pub coherence: f64,
    pub rigidity: f64,
    pub phase: Phase,
    pub scale_label: String,
    pub time: f64,
    pub earth_time: f64,
    pub rocket_time: f64,
    pub earth_state: char,
    pub rocket_state: char,
    /// Lorentz factor of the rocket clock.
    pub dilation: f64,
}

impl MetricsSnapshot {
    /// Replaces every non-finite float with zero.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for value in [
            &mut self.mean_energy,
            &mut self.std_dev_energy,
            &mut self.entropy,
            &mut self.temperature,
            &mut self.complexity,
            &mut self.entanglement_index,
            &mut self.coherence,
            &mut self.rigidity,
            &mut self.time,
            &mut self.earth_time,
            &mut self.rocket_time,
            &mut self.dilation,
        ] {
            *value = finite_or_zero(*value);
        }
        self
    }

    #[must_use]
    pub fn all_finite(&self) -> bool {
        [
            self.mean_energy,
            self.std_dev_energy,
            self.entropy,
            self.temperature,
            self.complexity,
            self.entanglement_index,
            self.coherence,
            self.rigidity,
            self.time,
            self.earth_time,
            self.rocket_time,
            self.dilation,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
