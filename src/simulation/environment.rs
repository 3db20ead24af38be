//! # Environment State
//!
//! Where the occupant is, what they are doing and which part of the day it is.
//! Time of day and activity are derived from the wall-clock hour; location is moved by
//! the [`LocationTransitionModel`](super::LocationTransitionModel).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Occupant activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Activity {
    MorningRoutine,
    Working,
    Leisure,
    Sleeping,
    /// Never produced by the hour table; only set by external actors
    Cooking,
}

/// Coarse part of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Hour table: [6,12) morning, [12,18) afternoon, [18,22) evening, otherwise night.
    /// Each part of the day carries its default activity.
    pub fn for_hour(hour: u32) -> (TimeOfDay, Activity) {
        match hour {
            6..=11 => (TimeOfDay::Morning, Activity::MorningRoutine),
            12..=17 => (TimeOfDay::Afternoon, Activity::Working),
            18..=21 => (TimeOfDay::Evening, Activity::Leisure),
            _ => (TimeOfDay::Night, Activity::Sleeping),
        }
    }
}

/// Complete environment snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub location: String,
    pub activity: Activity,
    pub time_of_day: TimeOfDay,
    /// Static; not modelled
    pub weather: String,
    pub user_present: bool,
    pub last_movement: DateTime<FixedOffset>,
}

impl EnvironmentState {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            location: "home".to_string(),
            activity: Activity::Working,
            time_of_day: TimeOfDay::Morning,
            weather: "sunny".to_string(),
            user_present: true,
            last_movement: now,
        }
    }

    /// Overwrite time of day and activity from the hour table. Idempotent.
    pub fn update_for_hour(&mut self, hour: u32) {
        let (time_of_day, activity) = TimeOfDay::for_hour(hour);
        self.time_of_day = time_of_day;
        self.activity = activity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case(0, TimeOfDay::Night, Activity::Sleeping)]
    #[case(5, TimeOfDay::Night, Activity::Sleeping)]
    #[case(6, TimeOfDay::Morning, Activity::MorningRoutine)]
    #[case(11, TimeOfDay::Morning, Activity::MorningRoutine)]
    #[case(12, TimeOfDay::Afternoon, Activity::Working)]
    #[case(17, TimeOfDay::Afternoon, Activity::Working)]
    #[case(18, TimeOfDay::Evening, Activity::Leisure)]
    #[case(21, TimeOfDay::Evening, Activity::Leisure)]
    #[case(22, TimeOfDay::Night, Activity::Sleeping)]
    #[case(23, TimeOfDay::Night, Activity::Sleeping)]
    fn test_hour_table(#[case] hour: u32, #[case] tod: TimeOfDay, #[case] activity: Activity) {
        assert_eq!(TimeOfDay::for_hour(hour), (tod, activity));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut state = EnvironmentState::new(noon());
        state.update_for_hour(10);
        let first = (state.time_of_day, state.activity);
        state.update_for_hour(10);
        assert_eq!(first, (state.time_of_day, state.activity));
        assert_eq!(first, (TimeOfDay::Morning, Activity::MorningRoutine));
    }

    #[test]
    fn test_update_leaves_location_alone() {
        let mut state = EnvironmentState::new(noon());
        state.location = "office".into();
        state.update_for_hour(3);
        assert_eq!(state.location, "office");
        assert_eq!(state.weather, "sunny");
    }

    #[test]
    fn test_labels_serialize_snake_case() {
        assert_eq!(Activity::MorningRoutine.to_string(), "morning_routine");
        assert_eq!(
            serde_json::to_string(&TimeOfDay::Afternoon).unwrap(),
            "\"afternoon\""
        );
        assert_eq!("cooking".parse::<Activity>().unwrap(), Activity::Cooking);
    }
}
