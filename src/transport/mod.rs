//! # Telemetry Transport
//!
//! Publish/subscribe seam between the simulator and whatever carries its records.
//! Publishing is fire-and-forget: implementations must not block the simulation clock,
//! and failures are reported to the caller for logging only.

pub mod channel;
pub mod log;
pub mod stdio;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{TransportConfig, TransportKind};
use crate::error::TransportError;

pub use channel::ChannelTransport;
pub use log::LogTransport;
pub use stdio::{spawn_stdin_commands, StdoutTransport};

/// One outbound record
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;
    /// Topic the inbound command stream is consumed from
    fn command_topic(&self) -> String;
}

/// UTF-8 JSON encoding; non-ASCII text is kept as-is
pub fn encode<T: Serialize + ?Sized>(topic: &str, record: &T) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(record).map_err(|source| TransportError::Encode {
        topic: topic.to_string(),
        source,
    })
}

/// Encode `record` and publish it on `topic`
pub async fn publish_record<T: Serialize + ?Sized>(
    transport: &dyn Transport,
    topic: &str,
    record: &T,
) -> Result<(), TransportError> {
    let payload = encode(topic, record)?;
    transport.publish(topic, payload).await
}

/// Build the configured transport. An invalid configuration is a startup failure.
pub fn connect(cfg: &TransportConfig) -> Result<Arc<dyn Transport>, TransportError> {
    cfg.validate()?;
    let transport: Arc<dyn Transport> = match cfg.kind {
        TransportKind::Log => Arc::new(LogTransport::new(cfg)),
        TransportKind::Stdout => Arc::new(StdoutTransport::spawn(cfg)),
    };
    tracing::info!(
        endpoint = %cfg.endpoint(),
        kind = ?cfg.kind,
        command_topic = %cfg.command_topic,
        "transport ready"
    );
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_keeps_non_ascii() {
        let payload = encode("sensors/temperature/data", &json!({"unit": "°C"})).unwrap();
        assert_eq!(String::from_utf8(payload).unwrap(), "{\"unit\":\"°C\"}");
    }

    #[tokio::test]
    async fn test_publish_record_goes_through_transport() {
        let mut mock = MockTransport::new();
        mock.expect_publish()
            .withf(|topic, payload| topic == "location/user/001" && payload == b"{\"a\":1}")
            .times(1)
            .returning(|_, _| Ok(()));

        publish_record(&mock, "location/user/001", &json!({"a": 1}))
            .await
            .unwrap();
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let cfg = TransportConfig {
            host: String::new(),
            ..TransportConfig::default()
        };
        assert!(matches!(connect(&cfg), Err(TransportError::InvalidConfig(_))));
    }

    #[test]
    fn test_connect_log_transport() {
        let transport = connect(&TransportConfig::default()).unwrap();
        assert_eq!(transport.command_topic(), "smarthome/commands");
    }
}
