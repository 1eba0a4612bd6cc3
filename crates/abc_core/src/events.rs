use abc_data::{AtomKind, MoleculeKind, Phase, QuarkFlavor, Vec2};
use serde::{Deserialize, Serialize};

/// Something noteworthy that happened during one `World::step`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum EvolutionEvent {
    QuarkFormed {
        quark_id: u64,
        flavor: QuarkFlavor,
        constituents: Vec<u64>,
        position: Vec2,
        time: f64,
    },
    /// Two saturated nodes collapsed into a quark.
    Collapse {
        quark_id: u64,
        nodes: [u64; 2],
        position: Vec2,
        time: f64,
    },
    AtomFormed {
        atom_id: u64,
        kind: AtomKind,
        quarks: [u64; 3],
        time: f64,
    },
    MoleculeFormed {
        molecule_id: u64,
        kind: MoleculeKind,
        atoms: Vec<u64>,
        time: f64,
    },
    Entangled {
        a: u64,
        b: u64,
        time: f64,
    },
    PhaseTransition {
        from: Phase,
        to: Phase,
        rigidity: f64,
        time: f64,
    },
    ActionReceived {
        text: String,
        time: f64,
    },
}

impl EvolutionEvent {
    #[must_use]
    pub fn time(&self) -> f64 {
        match self {
            EvolutionEvent::QuarkFormed { time, .. }
            | EvolutionEvent::Collapse { time, .. }
            | EvolutionEvent::AtomFormed { time, .. }
            | EvolutionEvent::MoleculeFormed { time, .. }
            | EvolutionEvent::Entangled { time, .. }
            | EvolutionEvent::PhaseTransition { time, .. }
            | EvolutionEvent::ActionReceived { time, .. } => *time,
        }
    }

    /// Human-readable line for the mailbox evolution log.
    #[must_use]
    pub fn to_log_line(&self) -> String {
        match self {
            EvolutionEvent::QuarkFormed {
                quark_id,
                flavor,
                constituents,
                time,
                ..
            } => format!(
                "[t={time:.3}] Quark #{quark_id} ({flavor:?}) formed from nodes {constituents:?}"
            ),
            EvolutionEvent::Collapse {
                quark_id,
                nodes,
                time,
                ..
            } => format!(
                "[t={time:.3}] Collapse: nodes {} and {} -> quark #{quark_id}",
                nodes[0], nodes[1]
            ),
            EvolutionEvent::AtomFormed {
                atom_id,
                kind,
                quarks,
                time,
            } => format!("[t={time:.3}] {kind:?} #{atom_id} bound from quarks {quarks:?}"),
            EvolutionEvent::MoleculeFormed {
                molecule_id,
                kind,
                atoms,
                time,
            } => format!("[t={time:.3}] {kind:?} molecule #{molecule_id} from atoms {atoms:?}"),
            EvolutionEvent::Entangled { a, b, time } => {
                format!("[t={time:.3}] Nodes {a} and {b} entangled")
            }
            EvolutionEvent::PhaseTransition {
                from,
                to,
                rigidity,
                time,
            } => format!("[t={time:.3}] PHASE {from} -> {to} (rigidity {rigidity:.3})"),
            EvolutionEvent::ActionReceived { text, time } => {
                format!("[t={time:.3}] Action queued: {text}")
            }
        }
    }
}
