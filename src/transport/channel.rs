use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Message, Transport};
use crate::error::TransportError;

/// In-process transport: published messages land on an unbounded channel.
///
/// Used when embedding the simulator and as the backing queue of other transports.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Message>,
    command_topic: String,
}

impl ChannelTransport {
    pub fn new(command_topic: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                command_topic: command_topic.into(),
            },
            rx,
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(Message {
                topic: topic.to_string(),
                payload,
            })
            .map_err(|_| TransportError::Closed(topic.to_string()))
    }

    fn command_topic(&self) -> String {
        self.command_topic.clone()
    }
}
