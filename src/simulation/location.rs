//! # Occupant Location Model
//!
//! Moves the occupant between named places on a slower cadence than the sensor tick.
//! Each hour band has a table of destination weights and a probability that the occupant
//! moves at all. Bands overlap at their edges ([7,9] and [17,19] are commute windows);
//! lookups take the first matching band.

use chrono::{DateTime, FixedOffset};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::continuous::round_to;
use super::EnvironmentState;

const EARLY_COMMUTE: &[(&str, f64)] = &[("home", 0.4), ("commute", 0.4), ("office", 0.2)];
const BUSINESS_HOURS: &[(&str, f64)] = &[
    ("office", 0.7),
    ("cafe", 0.1),
    ("home", 0.1),
    ("meeting_room", 0.1),
];
const LATE_COMMUTE: &[(&str, f64)] = &[
    ("commute", 0.4),
    ("office", 0.3),
    ("home", 0.2),
    ("gym", 0.1),
];
const EVENING: &[(&str, f64)] = &[("home", 0.8), ("restaurant", 0.1), ("friend_house", 0.1)];
const OVERNIGHT: &[(&str, f64)] = &[("home", 0.95), ("hospital", 0.02), ("travel", 0.03)];

/// How a location change was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetectionMethod {
    Gps,
    Wifi,
    Bluetooth,
    Beacon,
}

/// Emitted when the occupant moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEvent {
    pub user_id: String,
    pub location: String,
    pub previous_location: String,
    /// In [0.85, 0.98], two decimals
    pub confidence: f64,
    pub timestamp: DateTime<FixedOffset>,
    pub detection_method: DetectionMethod,
}

#[derive(Debug, Clone)]
pub struct LocationTransitionModel {
    user_id: String,
}

impl LocationTransitionModel {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Outbound topic for this occupant, `location/user/<id>` with any `user_` prefix dropped
    pub fn topic(&self) -> String {
        let id = self.user_id.strip_prefix("user_").unwrap_or(&self.user_id);
        format!("location/user/{}", id)
    }

    /// Destination weights for the band containing `hour`
    pub fn location_weights(hour: u32) -> &'static [(&'static str, f64)] {
        match hour {
            7..=8 => EARLY_COMMUTE,
            9..=17 => BUSINESS_HOURS,
            18..=19 => LATE_COMMUTE,
            20..=22 => EVENING,
            _ => OVERNIGHT,
        }
    }

    /// Probability that the occupant moves during this invocation
    pub fn change_probability(hour: u32) -> f64 {
        if (7..=9).contains(&hour) || (17..=19).contains(&hour) {
            0.7
        } else if (9..=17).contains(&hour) {
            0.2
        } else if hour >= 22 || hour <= 6 {
            0.05
        } else {
            0.3
        }
    }

    /// Gate on the change probability, then draw a weighted destination
    pub fn propose<R: Rng + ?Sized>(&self, hour: u32, rng: &mut R) -> Option<&'static str> {
        if rng.gen::<f64>() >= Self::change_probability(hour) {
            return None;
        }
        Self::location_weights(hour)
            .choose_weighted(rng, |(_, weight)| *weight)
            .ok()
            .map(|(name, _)| *name)
    }

    /// Commit `candidate` as the new location. Returns `None` and leaves `env`
    /// untouched when the occupant is already there.
    pub fn relocate<R: Rng + ?Sized>(
        &self,
        env: &mut EnvironmentState,
        candidate: &str,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> Option<LocationEvent> {
        if env.location == candidate {
            return None;
        }

        let previous = std::mem::replace(&mut env.location, candidate.to_string());
        let methods: Vec<DetectionMethod> = DetectionMethod::iter().collect();
        let detection_method = methods
            .choose(rng)
            .copied()
            .unwrap_or(DetectionMethod::Wifi);

        Some(LocationEvent {
            user_id: self.user_id.clone(),
            location: env.location.clone(),
            previous_location: previous,
            confidence: round_to(rng.gen_range(0.85..=0.98), 2),
            timestamp: now,
            detection_method,
        })
    }

    /// One location tick: maybe move, and report the move if it happened
    pub fn transition<R: Rng + ?Sized>(
        &self,
        env: &mut EnvironmentState,
        hour: u32,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> Option<LocationEvent> {
        let candidate = self.propose(hour, rng)?;
        self.relocate(env, candidate, now, rng)
    }
}
