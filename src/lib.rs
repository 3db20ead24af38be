//! Smart home simulator: synthetic household sensor and occupant telemetry.
//!
//! The [`simulation`] module holds the models and the engine that owns their state,
//! [`runtime`] schedules them on tokio tasks, and [`transport`] carries the resulting
//! records.

pub mod config;
pub mod error;
pub mod runtime;
pub mod simulation;
pub mod telemetry;
pub mod transport;
