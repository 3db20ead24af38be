use chrono::{DateTime, FixedOffset};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::{ComfortBand, SensorKind};

/// Signal quality attached to each reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quality {
    Good,
    Fair,
    Poor,
}

impl Quality {
    const WEIGHTED: [(Quality, f64); 3] =
        [(Quality::Good, 0.8), (Quality::Fair, 0.15), (Quality::Poor, 0.05)];

    /// Draw a quality with weights 0.8 / 0.15 / 0.05
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Quality {
        Self::WEIGHTED
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(quality, _)| *quality)
            .unwrap_or(Quality::Good)
    }
}

/// Reported value: a rounded level for continuous sensors, 0/1 for detections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Detection(u8),
    Level(f64),
}

impl ReadingValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            ReadingValue::Detection(v) => *v as f64,
            ReadingValue::Level(v) => *v,
        }
    }
}

impl std::fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingValue::Detection(v) => write!(f, "{}", v),
            ReadingValue::Level(v) => write!(f, "{:.1}", v),
        }
    }
}

/// One sensor observation, published on `sensors/<kind>/data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub sensor_id: String,
    #[serde(skip)]
    pub kind: SensorKind,
    pub value: ReadingValue,
    pub unit: String,
    pub timestamp: DateTime<FixedOffset>,
    pub location: String,
    pub quality: Quality,
}

impl Reading {
    pub fn topic(&self) -> String {
        self.kind.topic()
    }

    pub fn comfort(&self) -> ComfortBand {
        self.kind.comfort(self.value.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_quality_weights() {
        let mut rng = StdRng::seed_from_u64(21);
        let draws = 10_000;
        let good = (0..draws)
            .filter(|_| Quality::sample(&mut rng) == Quality::Good)
            .count();
        let share = good as f64 / draws as f64;
        assert!((share - 0.8).abs() < 0.03, "good share {share}");
    }

    #[test]
    fn test_reading_wire_format() {
        let reading = Reading {
            sensor_id: "temperature_001".into(),
            kind: SensorKind::Temperature,
            value: ReadingValue::Level(22.7),
            unit: "°C".into(),
            timestamp: FixedOffset::east_opt(-3 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 15, 9, 30, 0)
                .unwrap(),
            location: "home".into(),
            quality: Quality::Fair,
        };

        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"unit\":\"°C\""));
        assert!(json.contains("\"value\":22.7"));
        assert!(json.contains("\"quality\":\"fair\""));
        assert!(json.contains("\"timestamp\":\"2024-06-15T09:30:00-03:00\""));
        assert!(!json.contains("kind"));
        assert_eq!(reading.topic(), "sensors/temperature/data");
        assert_eq!(reading.comfort(), ComfortBand::Good);
    }

    #[test]
    fn test_detection_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ReadingValue::Detection(1)).unwrap(), "1");
        assert_eq!(ReadingValue::Level(3.0).to_string(), "3.0");
    }
}
