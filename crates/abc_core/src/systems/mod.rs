//! Per-tick pipeline stages. Each stage is a free function over the slices it
//! needs so the engine controls ordering and borrowing.

/// Clocks and the reference spaceship
pub mod clocks;
/// Quark, atom and molecule motion
pub mod composites;
/// Entanglement decay and pruning
pub mod entanglement;
/// Central-mass deformation field
pub mod field;
/// Node vibration, forces, refraction and boundaries
pub mod nodes;

/// Tick length the per-tick drag factors are calibrated for.
pub const REFERENCE_DT: f64 = 0.016;
