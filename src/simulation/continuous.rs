//! # Continuous Sensor Model
//!
//! Bounded random walk for temperature, humidity, light, noise and air quality.
//! Each step adds uniform natural noise within `±variance` plus a contextual drift that
//! depends on the hour, the occupant's activity and location, then clamps the result
//! into the sensor's bounds. The clamped value feeds the next step.

use rand::Rng;

use super::{Activity, EnvironmentState, SensorDefinition, SensorKind};

/// Round to a fixed number of decimals for reporting
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousValueModel;

impl ContinuousValueModel {
    /// Advance `sensor` one step and return the reported (1 decimal) value.
    ///
    /// The stored `current` keeps full precision.
    pub fn step<R: Rng + ?Sized>(
        &self,
        sensor: &mut SensorDefinition,
        env: &EnvironmentState,
        hour: u32,
        rng: &mut R,
    ) -> f64 {
        let natural = if sensor.variance > 0.0 {
            rng.gen_range(-sensor.variance..=sensor.variance)
        } else {
            0.0
        };
        let drift = self.contextual_drift(sensor.kind, env, hour, rng);

        sensor.current = sensor.clamp(sensor.current + natural + drift);
        round_to(sensor.current, 1)
    }

    /// Additive drift for `kind` given the time and what the occupant is doing
    pub fn contextual_drift<R: Rng + ?Sized>(
        &self,
        kind: SensorKind,
        env: &EnvironmentState,
        hour: u32,
        rng: &mut R,
    ) -> f64 {
        let working = env.activity == Activity::Working;
        let cooking = env.activity == Activity::Cooking;
        let mut drift = 0.0;

        match kind {
            SensorKind::Temperature => {
                if (6..=18).contains(&hour) {
                    drift += rng.gen_range(1.0..=3.0);
                } else {
                    drift -= rng.gen_range(1.0..=2.0);
                }
                // HVAC cycling while working from home
                if working {
                    drift += rng.gen_range(-1.0..=1.0);
                }
            }
            SensorKind::Humidity => {
                if env.location == "bathroom" {
                    drift += rng.gen_range(10.0..=25.0);
                } else if cooking {
                    drift += rng.gen_range(5.0..=15.0);
                }
            }
            SensorKind::Light => {
                if (6..=20).contains(&hour) {
                    drift += rng.gen_range(100.0..=500.0);
                } else {
                    drift -= rng.gen_range(50.0..=200.0);
                }
                if working {
                    drift += rng.gen_range(50.0..=150.0);
                }
            }
            SensorKind::Noise => {
                if working && (9..=17).contains(&hour) {
                    drift += rng.gen_range(5.0..=15.0);
                } else if hour >= 22 || hour <= 6 {
                    drift -= rng.gen_range(5.0..=15.0);
                }
            }
            SensorKind::AirQuality => {
                if cooking {
                    drift += rng.gen_range(10.0..=30.0);
                } else if env.location == "office" && (9..=17).contains(&hour) {
                    drift += rng.gen_range(5.0..=15.0);
                }
            }
            SensorKind::Motion | SensorKind::Presence => {}
        }

        drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SensorRegistry;
    use chrono::{FixedOffset, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn env() -> EnvironmentState {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
            .unwrap();
        EnvironmentState::new(now)
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(22.449, 1), 22.4);
        assert_eq!(round_to(22.45001, 1), 22.5);
        assert_eq!(round_to(0.912, 2), 0.91);
    }

    #[test]
    fn test_temperature_drift_ranges() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = env();
        state.activity = Activity::Leisure;

        for _ in 0..500 {
            let day = model.contextual_drift(SensorKind::Temperature, &state, 12, &mut rng);
            assert!((1.0..=3.0).contains(&day));
            let night = model.contextual_drift(SensorKind::Temperature, &state, 2, &mut rng);
            assert!((-2.0..=-1.0).contains(&night));
        }
    }

    #[test]
    fn test_working_widens_temperature_drift() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(8);
        let mut state = env();
        state.activity = Activity::Working;

        for _ in 0..500 {
            let drift = model.contextual_drift(SensorKind::Temperature, &state, 19, &mut rng);
            assert!((-3.0..=0.0).contains(&drift));
        }
    }

    #[test]
    fn test_humidity_bathroom_wins_over_cooking() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = env();
        state.location = "bathroom".into();
        state.activity = Activity::Cooking;

        for _ in 0..200 {
            let drift = model.contextual_drift(SensorKind::Humidity, &state, 12, &mut rng);
            assert!((10.0..=25.0).contains(&drift));
        }

        state.location = "home".into();
        for _ in 0..200 {
            let drift = model.contextual_drift(SensorKind::Humidity, &state, 12, &mut rng);
            assert!((5.0..=15.0).contains(&drift));
        }
    }

    #[test]
    fn test_quiet_contexts_have_no_drift() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(10);
        let mut state = env();
        state.activity = Activity::Leisure;

        assert_eq!(model.contextual_drift(SensorKind::Humidity, &state, 12, &mut rng), 0.0);
        assert_eq!(model.contextual_drift(SensorKind::Noise, &state, 12, &mut rng), 0.0);
        assert_eq!(model.contextual_drift(SensorKind::AirQuality, &state, 12, &mut rng), 0.0);
        assert_eq!(model.contextual_drift(SensorKind::Motion, &state, 12, &mut rng), 0.0);
    }

    #[test]
    fn test_office_hours_degrade_air_quality() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = env();
        state.location = "office".into();

        let drift = model.contextual_drift(SensorKind::AirQuality, &state, 10, &mut rng);
        assert!((5.0..=15.0).contains(&drift));
        let evening = model.contextual_drift(SensorKind::AirQuality, &state, 20, &mut rng);
        assert_eq!(evening, 0.0);
    }

    #[test]
    fn test_step_clamps_and_persists() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(12);
        let mut registry = SensorRegistry::default();
        let state = env();

        // Daylight pushes light up by at least 100 lux per step, so it saturates.
        let light = registry.get_mut(SensorKind::Light).unwrap();
        for _ in 0..50 {
            let reported = model.step(light, &state, 12, &mut rng);
            assert!(light.in_bounds());
            assert!((reported - light.current).abs() <= 0.05);
        }
        assert_eq!(light.current, 2000.0);
    }

    #[test]
    fn test_step_pulls_overridden_value_back_into_bounds() {
        let model = ContinuousValueModel;
        let mut rng = StdRng::seed_from_u64(13);
        let mut registry = SensorRegistry::default();
        registry.override_current(SensorKind::Temperature, 40.0);

        let temperature = registry.get_mut(SensorKind::Temperature).unwrap();
        model.step(temperature, &env(), 12, &mut rng);
        assert_eq!(temperature.current, 32.0);
    }
}
