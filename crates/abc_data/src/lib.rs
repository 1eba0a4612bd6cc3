//! # ABC Data
//!
//! Plain, serializable records shared by every layer of the ABC simulator:
//! the entity model (nodes, quarks, atoms, molecules), cosmological state
//! (clocks, phase, spaceship), the shared-memory mailbox contents and the
//! agent persona records.

pub mod data;

pub use data::agent::{AgentState, AgentStatus, Persona, PERSONAS};
pub use data::cosmos::{ClockState, Clocks, Phase, SharedMemory, Spaceship};
pub use data::entity::{
    Atom, AtomKind, CollapseMarker, EntangledPair, Molecule, MoleculeKind, Node, NodeKind, Quark,
    QuarkFlavor, Vec2,
};

/// Planck energy in the simulator's energy units.
pub const PLANCK_ENERGY: f64 = 1.9561e9;

/// Display labels for the `scale` parameter, indexed from Planck to cosmic.
pub const SCALE_LABELS: [&str; 9] = [
    "Planck",
    "Grid",
    "Atomic",
    "Molecular",
    "Micro",
    "Human",
    "Planetary",
    "Stellar",
    "Cosmic",
];
