//! # ABC Core
//!
//! The stepwise evolution engine of the ABC simulator.
//!
//! This crate contains the deterministic (modulo a seeded RNG) simulation logic:
//! - Vector math, Gaussian sampling and Snell refraction
//! - The parameter store with partial patches and named presets
//! - Pluggable formation rules (node triads, collapse pairs, atoms, molecules)
//! - Per-stage systems: field, kinematics, entanglement, clocks, statistics
//! - The bounded shared-memory mailbox used by the agent layer
//! - Tick-performance metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use abc_core::config::SimulationParameters;
//! use abc_core::world::World;
//!
//! let params = SimulationParameters {
//!     n_abc: 10.0,
//!     seed: Some(42),
//!     ..SimulationParameters::default()
//! };
//! let mut world = World::new(params);
//! assert_eq!(world.nodes().len(), 30);
//!
//! world.start();
//! let _events = world.step(0.016);
//! assert!(world.metrics().time > 0.0);
//! ```

/// Parameter store, engine tuning and application configuration
pub mod config;
/// Evolution events emitted by `World::step`
pub mod events;
/// Formation rules deciding when entities combine
pub mod formation;
/// Bounded shared-memory mailbox between the engine and the agent layer
pub mod mailbox;
/// Vector helpers, Gaussian sampling and refraction
pub mod math;
/// Tick-performance metrics and logging initialisation
pub mod metrics;
/// Statistics aggregation, phase classification and the metrics snapshot
pub mod stats;
/// Per-tick pipeline stages
pub mod systems;
/// The evolution engine
pub mod world;

pub use config::{AppConfig, EngineConfig, ParameterPatch, SimulationParameters};
pub use events::EvolutionEvent;
pub use mailbox::{MailboxError, MailboxHandle};
pub use metrics::{init_logging, Metrics};
pub use stats::MetricsSnapshot;
pub use world::World;
