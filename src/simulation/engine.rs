//! # Simulation Engine
//!
//! Owns the sensor registry and environment state and drives every model against them.
//! There is no ambient state: each engine is an independent household.

use chrono::{DateTime, FixedOffset, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Activity, BooleanEventModel, Command, CommandEffect, CommandEffectHandler,
    ContinuousValueModel, EnvironmentState, LocationEvent, LocationTransitionModel, Quality,
    Reading, ReadingValue, SensorKind, SensorRegistry, TimeOfDay,
};
use crate::error::CommandError;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Occupant identifier used in location events
    pub user_id: String,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
    /// Clamp command overrides into sensor bounds
    pub clamp_command_overrides: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_id: "user_001".to_string(),
            random_seed: None,
            clamp_command_overrides: false,
        }
    }
}

impl EngineConfig {
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_clamped_overrides(mut self, clamp: bool) -> Self {
        self.clamp_command_overrides = clamp;
        self
    }
}

/// Snapshot for the periodic status report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub location: String,
    pub activity: Activity,
    pub time_of_day: TimeOfDay,
    pub weather: String,
    pub user_present: bool,
    pub sensor_count: usize,
}

pub struct SimulationEngine {
    registry: SensorRegistry,
    environment: EnvironmentState,
    continuous: ContinuousValueModel,
    boolean: BooleanEventModel,
    location: LocationTransitionModel,
    commands: CommandEffectHandler,
    rng: StdRng,
}

impl SimulationEngine {
    /// Create an engine with the default household sensors
    pub fn new(config: EngineConfig, now: DateTime<FixedOffset>) -> Self {
        Self::with_registry(config, SensorRegistry::default(), now)
    }

    pub fn with_registry(
        config: EngineConfig,
        registry: SensorRegistry,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            registry,
            environment: EnvironmentState::new(now),
            continuous: ContinuousValueModel,
            boolean: BooleanEventModel,
            location: LocationTransitionModel::new(config.user_id),
            commands: CommandEffectHandler::new(config.clamp_command_overrides),
            rng,
        }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.environment
    }

    /// Set the activity directly; the next sensor tick re-derives it from the hour
    pub fn set_activity(&mut self, activity: Activity) {
        self.environment.activity = activity;
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.environment.location = location.into();
    }

    pub fn location_topic(&self) -> String {
        self.location.topic()
    }

    /// One sensor tick: refresh the environment from the hour, then step every sensor.
    pub fn tick_sensors(&mut self, now: DateTime<FixedOffset>) -> Vec<Reading> {
        let hour = now.hour();
        self.environment.update_for_hour(hour);
        self.sample_sensors(now)
    }

    /// Step every sensor against the current environment without re-deriving it
    pub fn sample_sensors(&mut self, now: DateTime<FixedOffset>) -> Vec<Reading> {
        let hour = now.hour();
        let env = &self.environment;
        let mut readings = Vec::with_capacity(self.registry.len());
        let mut presence = None;
        let mut moved = false;

        for sensor in self.registry.iter_mut() {
            let value = if sensor.kind.is_boolean() {
                let detected = self.boolean.sample(sensor.kind, env, hour, &mut self.rng);
                sensor.current = f64::from(detected);
                match sensor.kind {
                    SensorKind::Presence => presence = Some(detected == 1),
                    SensorKind::Motion => moved = detected == 1,
                    _ => {}
                }
                ReadingValue::Detection(detected)
            } else {
                ReadingValue::Level(self.continuous.step(sensor, env, hour, &mut self.rng))
            };

            readings.push(Reading {
                sensor_id: sensor.id.clone(),
                kind: sensor.kind,
                value,
                unit: sensor.unit.clone(),
                timestamp: now,
                location: env.location.clone(),
                quality: Quality::sample(&mut self.rng),
            });
        }

        if let Some(present) = presence {
            self.environment.user_present = present;
        }
        if moved {
            self.environment.last_movement = now;
        }
        readings
    }

    /// One location tick; `Some` only when the occupant actually moved
    pub fn tick_location(&mut self, now: DateTime<FixedOffset>) -> Option<LocationEvent> {
        let event = self
            .location
            .transition(&mut self.environment, now.hour(), now, &mut self.rng);
        if event.is_none() {
            debug!(location = %self.environment.location, "occupant stayed");
        }
        event
    }

    pub fn handle_command(&mut self, command: &Command) -> Result<CommandEffect, CommandError> {
        self.commands.apply(command, &mut self.registry)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            location: self.environment.location.clone(),
            activity: self.environment.activity,
            time_of_day: self.environment.time_of_day,
            weather: self.environment.weather.clone(),
            user_present: self.environment.user_present,
            sensor_count: self.registry.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, hour, 0, 0)
            .unwrap()
    }

    fn engine(seed: u64) -> SimulationEngine {
        SimulationEngine::new(EngineConfig::default().with_random_seed(seed), at(0))
    }

    #[test]
    fn test_engine_initialization() {
        let engine = engine(42);
        let status = engine.status();

        assert_eq!(status.location, "home");
        assert_eq!(status.activity, Activity::Working);
        assert_eq!(status.sensor_count, 7);
        assert!(status.user_present);
        assert_eq!(engine.location_topic(), "location/user/001");
    }

    #[test]
    fn test_tick_produces_one_reading_per_sensor() {
        let mut engine = engine(42);
        let readings = engine.tick_sensors(at(10));

        assert_eq!(readings.len(), 7);
        assert_eq!(engine.environment().time_of_day, TimeOfDay::Morning);
        assert_eq!(engine.environment().activity, Activity::MorningRoutine);

        for reading in &readings {
            assert_eq!(reading.timestamp, at(10));
            assert_eq!(reading.location, "home");
            match reading.value {
                ReadingValue::Detection(v) => {
                    assert!(reading.kind.is_boolean());
                    assert!(v <= 1);
                }
                ReadingValue::Level(v) => {
                    let sensor = engine.registry().get(reading.kind).unwrap();
                    assert!((v - sensor.current).abs() <= 0.05 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_seeded_engines_are_reproducible() {
        let mut a = engine(7);
        let mut b = engine(7);
        for hour in 0..24 {
            assert_eq!(a.tick_sensors(at(hour)), b.tick_sensors(at(hour)));
            assert_eq!(a.tick_location(at(hour)), b.tick_location(at(hour)));
        }
    }

    #[test]
    fn test_day_of_ticks_stays_in_bounds() {
        let mut engine = engine(99);
        let mut now = at(0);
        for _ in 0..(24 * 60 / 10) {
            engine.tick_sensors(now);
            assert!(engine.registry().iter().all(|s| s.in_bounds()));
            now += Duration::minutes(10);
        }
    }

    #[test]
    fn test_presence_feeds_environment() {
        let mut engine = engine(5);
        for hour in 0..24 {
            engine.tick_sensors(at(hour));
            let presence = engine.registry().current(SensorKind::Presence).unwrap();
            assert_eq!(engine.environment().user_present, presence == 1.0);
        }
    }

    #[test]
    fn test_commands_visible_on_next_tick() {
        let mut engine = engine(11);
        let cmd = Command::from_value(&json!({"device": "air_purifier", "action": "on"})).unwrap();
        engine.handle_command(&cmd).unwrap();
        assert_eq!(engine.registry().current(SensorKind::AirQuality), Some(25.0));

        // Evening at home with leisure: air quality only moves by natural noise (±5)
        let readings = engine.tick_sensors(at(19));
        let air = readings
            .iter()
            .find(|r| r.kind == SensorKind::AirQuality)
            .unwrap();
        assert!((air.value.as_f64() - 25.0).abs() <= 5.05);
    }

    #[test]
    fn test_external_activity_reaches_models() {
        let mut engine = engine(12);
        engine.set_activity(Activity::Cooking);
        engine.set_location("kitchen");
        let before = engine.registry().current(SensorKind::AirQuality).unwrap();

        engine.sample_sensors(at(19));
        let after = engine.registry().current(SensorKind::AirQuality).unwrap();
        // cooking adds at least 10 AQI, natural noise removes at most 5
        assert!(after >= before + 5.0);
        assert_eq!(engine.environment().activity, Activity::Cooking);
    }
}
