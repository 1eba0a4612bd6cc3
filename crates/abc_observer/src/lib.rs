//! External agent layer of the ABC simulator.
//!
//! Agents never touch the engine directly. They read metric snapshots,
//! run a completion request outside the tick, and post their verdicts
//! back through a [`abc_core::MailboxHandle`].

pub mod client;
pub mod council;
pub mod prompt;
pub mod telemetry;

pub use client::{CompletionClient, HeuristicClient, HttpCompletionClient};
pub use council::{AgentCouncil, AgentReport, ReportOutcome};
pub use prompt::build_prompt;
pub use telemetry::{BroadcastTelemetry, NullTelemetry, TelemetryPayload, TelemetrySink, TelemetryThrottle};
