use async_trait::async_trait;
use tracing::info;

use super::Transport;
use crate::config::TransportConfig;
use crate::error::TransportError;

/// Writes every published record to the structured log instead of a broker
#[derive(Debug, Clone)]
pub struct LogTransport {
    endpoint: String,
    command_topic: String,
}

impl LogTransport {
    pub fn new(cfg: &TransportConfig) -> Self {
        Self {
            endpoint: cfg.endpoint(),
            command_topic: cfg.command_topic.clone(),
        }
    }
}

#[async_trait]
impl Transport for LogTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        info!(
            target: "telemetry",
            endpoint = %self.endpoint,
            topic,
            payload = %String::from_utf8_lossy(&payload),
            "publish"
        );
        Ok(())
    }

    fn command_topic(&self) -> String {
        self.command_topic.clone()
    }
}
