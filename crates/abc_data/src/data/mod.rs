//! Core data structures for the ABC simulation.

pub mod agent;
pub mod cosmos;
pub mod entity;
