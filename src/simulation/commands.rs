//! # Smart Home Commands
//!
//! Inbound `{device, action, parameters}` commands override sensor values directly.
//! Field extraction is best-effort: missing or `null` fields fall back to defaults,
//! unknown device/action pairs are ignored, and a field of the wrong type rejects the
//! command without touching any sensor.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{SensorKind, SensorRegistry};
use crate::error::CommandError;

const DEFAULT_TARGET_TEMPERATURE: f64 = 24.0;
const DEFAULT_BRIGHTNESS: f64 = 80.0;
/// Approximate lux per brightness percent
const LUX_PER_BRIGHTNESS: f64 = 10.0;
const PURIFIER_AQI_REDUCTION: f64 = 20.0;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, CommandError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CommandError::NonFinite { name, value })
    }
}

fn wrong_type(name: &'static str, expected: &'static str, found: &Value) -> CommandError {
    CommandError::InvalidField {
        name,
        expected,
        found: found.to_string(),
    }
}

/// A parsed smart home command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    pub device: String,
    pub action: String,
    pub parameters: Map<String, Value>,
}

impl Command {
    /// Parse a raw payload as delivered on the command topic
    pub fn from_slice(payload: &[u8]) -> Result<Self, CommandError> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| CommandError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, CommandError> {
        let object = value
            .as_object()
            .ok_or_else(|| CommandError::NotAnObject(type_name(value)))?;

        let text = |name: &'static str| -> Result<String, CommandError> {
            match object.get(name) {
                None | Some(Value::Null) => Ok(String::new()),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(wrong_type(name, "string", other)),
            }
        };

        let parameters = match object.get("parameters") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => return Err(wrong_type("parameters", "object", other)),
        };

        Ok(Self {
            device: text("device")?,
            action: text("action")?,
            parameters,
        })
    }

    /// Numeric parameter, `default` when missing or `null`. Non-finite values are rejected.
    pub fn number(&self, name: &'static str, default: f64) -> Result<f64, CommandError> {
        let value = match self.parameters.get(name) {
            None | Some(Value::Null) => default,
            Some(value) => value.as_f64().ok_or_else(|| wrong_type(name, "number", value))?,
        };
        finite(name, value)
    }
}

/// What a command did to the sensor registry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CommandEffect {
    TemperatureSet { target_c: f64 },
    LightIncreased { increase_lux: f64, current_lux: f64 },
    AirPurified { current_aqi: f64 },
    Ignored,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandEffectHandler {
    /// Clamp commanded values into sensor bounds instead of storing them as-is
    pub clamp_overrides: bool,
}

impl CommandEffectHandler {
    pub fn new(clamp_overrides: bool) -> Self {
        Self { clamp_overrides }
    }

    /// Apply `command` to `registry`. All parameters are read before anything is
    /// written, so a rejected command leaves the registry unchanged.
    pub fn apply(
        &self,
        command: &Command,
        registry: &mut SensorRegistry,
    ) -> Result<CommandEffect, CommandError> {
        let effect = match (command.device.as_str(), command.action.as_str()) {
            ("climate", "cool") => {
                let target = command.number("target_temperature", DEFAULT_TARGET_TEMPERATURE)?;
                match self.write(registry, SensorKind::Temperature, target) {
                    Some(target_c) => CommandEffect::TemperatureSet { target_c },
                    None => CommandEffect::Ignored,
                }
            }
            ("lights", "brighten") => {
                let brightness = command.number("brightness", DEFAULT_BRIGHTNESS)?;
                let increase_lux = finite("brightness", brightness * LUX_PER_BRIGHTNESS)?;
                let target = match registry.current(SensorKind::Light) {
                    Some(lux) => Some(finite("brightness", lux + increase_lux)?),
                    None => None,
                };
                match target.and_then(|lux| self.write(registry, SensorKind::Light, lux)) {
                    Some(current_lux) => CommandEffect::LightIncreased {
                        increase_lux,
                        current_lux,
                    },
                    None => CommandEffect::Ignored,
                }
            }
            ("air_purifier", "on") => {
                match registry.current(SensorKind::AirQuality).and_then(|aqi| {
                    let purified = (aqi - PURIFIER_AQI_REDUCTION).max(0.0);
                    self.write(registry, SensorKind::AirQuality, purified)
                }) {
                    Some(current_aqi) => CommandEffect::AirPurified { current_aqi },
                    None => CommandEffect::Ignored,
                }
            }
            _ => CommandEffect::Ignored,
        };
        Ok(effect)
    }

    fn write(&self, registry: &mut SensorRegistry, kind: SensorKind, value: f64) -> Option<f64> {
        if self.clamp_overrides {
            registry.set_clamped(kind, value)
        } else {
            registry.override_current(kind, value)
        }
    }
}
