//! # Sensor Registry
//!
//! Bounds, current value and variance for every simulated household sensor.
//! Continuous sensors perform a bounded random walk around `current`; boolean sensors
//! (motion, presence) store their last draw as `0.0` / `1.0`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::SensorError;

/// Kind of sensor installed in the household
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Light,
    Noise,
    AirQuality,
    Motion,
    Presence,
}

impl SensorKind {
    /// Motion and presence report 0/1 detections instead of a continuous level
    pub fn is_boolean(&self) -> bool {
        matches!(self, SensorKind::Motion | SensorKind::Presence)
    }

    /// Outbound topic for readings of this kind
    pub fn topic(&self) -> String {
        format!("sensors/{}/data", self)
    }

    /// Classify a reported value against the household comfort thresholds
    pub fn comfort(&self, value: f64) -> ComfortBand {
        match self {
            SensorKind::Temperature => {
                if (20.0..=24.0).contains(&value) {
                    ComfortBand::Good
                } else if (18.0..=26.0).contains(&value) {
                    ComfortBand::Warning
                } else {
                    ComfortBand::Alert
                }
            }
            SensorKind::Humidity => {
                if (40.0..=60.0).contains(&value) {
                    ComfortBand::Good
                } else if (30.0..=70.0).contains(&value) {
                    ComfortBand::Warning
                } else {
                    ComfortBand::Alert
                }
            }
            SensorKind::AirQuality => {
                if value <= 50.0 {
                    ComfortBand::Good
                } else if value <= 100.0 {
                    ComfortBand::Warning
                } else {
                    ComfortBand::Alert
                }
            }
            _ => ComfortBand::Neutral,
        }
    }
}

/// Comfort classification of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComfortBand {
    Good,
    Warning,
    Alert,
    /// No comfort thresholds defined for this kind
    Neutral,
}

/// A single sensor's configuration and live value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub id: String,
    pub kind: SensorKind,
    pub min: f64,
    pub max: f64,
    /// Last value, kept at full precision
    pub current: f64,
    pub unit: String,
    /// Half-width of the uniform natural noise; 0 for boolean kinds
    pub variance: f64,
}

fn bounds_valid(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min <= max
}

impl SensorDefinition {
    /// # Panics
    ///
    /// Panics if the bounds are not finite or `min > max`.
    pub fn new(kind: SensorKind, min: f64, max: f64, current: f64, unit: &str, variance: f64) -> Self {
        assert!(
            bounds_valid(min, max),
            "sensor {} bounds [{}, {}] are invalid",
            kind,
            min,
            max
        );
        Self {
            id: format!("{}_001", kind),
            kind,
            min,
            max,
            current,
            unit: unit.to_string(),
            variance,
        }
    }

    pub fn validate(&self) -> Result<(), SensorError> {
        if bounds_valid(self.min, self.max) {
            Ok(())
        } else {
            Err(SensorError::InvalidBounds {
                id: self.id.clone(),
                min: self.min,
                max: self.max,
            })
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn in_bounds(&self) -> bool {
        self.min <= self.current && self.current <= self.max
    }
}

/// Household sensor set, iterated in installation order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRegistry {
    sensors: Vec<SensorDefinition>,
}

impl Default for SensorRegistry {
    fn default() -> Self {
        let sensors = SensorKind::iter()
            .map(|kind| match kind {
                SensorKind::Temperature => SensorDefinition::new(kind, 16.0, 32.0, 22.5, "°C", 0.5),
                SensorKind::Humidity => SensorDefinition::new(kind, 25.0, 85.0, 45.0, "%", 2.0),
                SensorKind::Light => SensorDefinition::new(kind, 10.0, 2000.0, 450.0, "lux", 50.0),
                SensorKind::Noise => SensorDefinition::new(kind, 15.0, 95.0, 35.0, "dB", 3.0),
                SensorKind::AirQuality => SensorDefinition::new(kind, 0.0, 500.0, 45.0, "AQI", 5.0),
                SensorKind::Motion => SensorDefinition::new(kind, 0.0, 1.0, 0.0, "detection", 0.0),
                SensorKind::Presence => SensorDefinition::new(kind, 0.0, 1.0, 1.0, "boolean", 0.0),
            })
            .collect();
        Self { sensors }
    }
}

impl SensorRegistry {
    /// Registry over a custom sensor set. Every sensor's bounds are checked.
    pub fn new(sensors: Vec<SensorDefinition>) -> Result<Self, SensorError> {
        for sensor in &sensors {
            sensor.validate()?;
        }
        Ok(Self { sensors })
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDefinition> {
        self.sensors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SensorDefinition> {
        self.sensors.iter_mut()
    }

    pub fn get(&self, kind: SensorKind) -> Option<&SensorDefinition> {
        self.sensors.iter().find(|s| s.kind == kind)
    }

    pub fn get_mut(&mut self, kind: SensorKind) -> Option<&mut SensorDefinition> {
        self.sensors.iter_mut().find(|s| s.kind == kind)
    }

    /// Current value of the sensor of `kind`, if installed
    pub fn current(&self, kind: SensorKind) -> Option<f64> {
        self.get(kind).map(|s| s.current)
    }

    /// Store a model-computed value, clamped into the sensor's bounds
    pub fn set_clamped(&mut self, kind: SensorKind, value: f64) -> Option<f64> {
        let sensor = self.get_mut(kind)?;
        sensor.current = sensor.clamp(value);
        Some(sensor.current)
    }

    /// Store an externally commanded value as-is; the next model step clamps it
    pub fn override_current(&mut self, kind: SensorKind, value: f64) -> Option<f64> {
        let sensor = self.get_mut(kind)?;
        sensor.current = value;
        Some(sensor.current)
    }
}
