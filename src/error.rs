use thiserror::Error;

/// Failures reported by a [`Transport`](crate::transport::Transport).
///
/// Publish failures are recoverable: the runtime logs them and keeps ticking with the
/// engine state already advanced. Only an invalid configuration at startup is fatal.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to encode payload for {topic}: {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Publish to {0} failed: channel closed")]
    Closed(String),
}

/// Inbound command problems. Never fatal to the tick loop.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Command payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Command payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("Field '{name}' has the wrong type: expected {expected}, got {found}")]
    InvalidField {
        name: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("Field '{name}' yields a non-finite value: {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Sensor set construction problems
#[derive(Debug, Error, PartialEq)]
pub enum SensorError {
    #[error("Sensor {id} has invalid bounds [{min}, {max}]")]
    InvalidBounds { id: String, min: f64, max: f64 },
}
