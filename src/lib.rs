//! Headless host for the ABC simulator.
//!
//! [`model`] re-exports the engine, I/O and agent crates under one roof;
//! [`app`] drives the tick loop, the agent council, telemetry and export.

pub mod app;
pub mod model;
