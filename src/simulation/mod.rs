//! # Household Simulation Module
//!
//! Synthetic sensor and occupant behavior for a single household.
//!
//! ## Components
//!
//! - **Sensors**: Registry of bounds, live values and noise levels
//! - **Environment**: Location, activity and time of day derived from the wall-clock hour
//! - **Continuous**: Bounded random walk with contextual drift for analog sensors
//! - **Boolean**: Probability-gated motion and presence detections
//! - **Location**: Hour-banded occupant movement between named places
//! - **Commands**: Smart home commands that override sensor values
//! - **Engine**: Owns all mutable state and drives the models
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Local;
//! use smart_home_simulator::simulation::{EngineConfig, SimulationEngine};
//!
//! let now = Local::now().fixed_offset();
//! let mut engine = SimulationEngine::new(EngineConfig::default().with_random_seed(42), now);
//!
//! let readings = engine.tick_sensors(now);
//! assert_eq!(readings.len(), 7);
//!
//! if let Some(event) = engine.tick_location(now) {
//!     println!("moved to {}", event.location);
//! }
//! ```

pub mod boolean;
pub mod commands;
pub mod continuous;
pub mod engine;
pub mod environment;
pub mod location;
pub mod reading;
pub mod sensors;

pub use boolean::BooleanEventModel;
pub use commands::{Command, CommandEffect, CommandEffectHandler};
pub use continuous::ContinuousValueModel;
pub use engine::{EngineConfig, SimulationEngine, StatusReport};
pub use environment::{Activity, EnvironmentState, TimeOfDay};
pub use location::{DetectionMethod, LocationEvent, LocationTransitionModel};
pub use reading::{Quality, Reading, ReadingValue};
pub use sensors::{ComfortBand, SensorDefinition, SensorKind, SensorRegistry};
