use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TransportError;
use crate::simulation::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub transport: TransportConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Records go to the structured log
    Log,
    /// `<topic> <payload>` lines on stdout
    Stdout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub host: String,
    pub port: u16,
    pub command_topic: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Log,
            host: "localhost".to_string(),
            port: 1883,
            command_topic: "smarthome/commands".to_string(),
        }
    }
}

impl TransportConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.host.trim().is_empty() {
            return Err(TransportError::InvalidConfig("broker host is empty".into()));
        }
        if self.port == 0 {
            return Err(TransportError::InvalidConfig("broker port must be non-zero".into()));
        }
        if self.command_topic.trim().is_empty() {
            return Err(TransportError::InvalidConfig("command topic is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tick_seconds: u64,
    pub location_tick_seconds: u64,
    pub status_seconds: u64,
    pub random_seed: Option<u64>,
    pub user_id: String,
    pub clamp_command_overrides: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 10,
            location_tick_seconds: 45,
            status_seconds: 300,
            random_seed: None,
            user_id: "user_001".to_string(),
            clamp_command_overrides: false,
        }
    }
}

impl SimulationConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            user_id: self.user_id.clone(),
            random_seed: self.random_seed,
            clamp_command_overrides: self.clamp_command_overrides,
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "config/default.toml";

    /// Defaults, then the TOML file at `path` (optional), then the legacy broker
    /// variables, then `SIM__SECTION__KEY` overrides
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(
                Env::raw()
                    .only(&["MQTT_BROKER_HOST", "MQTT_BROKER_PORT", "SIMULATION_INTERVAL"])
                    .map(|key| {
                        if key.as_str().eq_ignore_ascii_case("MQTT_BROKER_HOST") {
                            "transport.host".into()
                        } else if key.as_str().eq_ignore_ascii_case("MQTT_BROKER_PORT") {
                            "transport.port".into()
                        } else {
                            "simulation.tick_seconds".into()
                        }
                    }),
            )
            .merge(Env::prefixed("SIM__").split("__"))
    }

    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(Self::DEFAULT_PATH))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.transport.validate()?;
        let sim = &self.simulation;
        ensure!(sim.tick_seconds > 0, "simulation.tick_seconds must be positive");
        ensure!(
            sim.location_tick_seconds > 0,
            "simulation.location_tick_seconds must be positive"
        );
        ensure!(sim.status_seconds > 0, "simulation.status_seconds must be positive");
        ensure!(!sim.user_id.trim().is_empty(), "simulation.user_id is empty");
        Ok(())
    }
}
