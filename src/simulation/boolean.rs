//! # Boolean Event Model
//!
//! Motion and presence detections as independent Bernoulli draws per tick.

use rand::Rng;

use super::{Activity, EnvironmentState, SensorKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanEventModel;

impl BooleanEventModel {
    /// Detection probability for a boolean sensor, `None` for continuous kinds
    pub fn probability(&self, kind: SensorKind, env: &EnvironmentState, hour: u32) -> Option<f64> {
        match kind {
            SensorKind::Motion => Some(match env.activity {
                Activity::Sleeping => 0.05,
                Activity::Working => 0.3,
                _ => 0.6,
            }),
            SensorKind::Presence => Some(if hour >= 23 || hour <= 6 {
                0.9
            } else if (9..=17).contains(&hour) {
                0.7
            } else {
                0.8
            }),
            _ => None,
        }
    }

    /// Draw a detection: `1` with the kind's probability, else `0`.
    /// Continuous kinds always yield `0`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        kind: SensorKind,
        env: &EnvironmentState,
        hour: u32,
        rng: &mut R,
    ) -> u8 {
        match self.probability(kind, env, hour) {
            Some(p) if rng.gen::<f64>() < p => 1,
            _ => 0,
        }
    }
}
