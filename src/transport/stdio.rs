//! Line-oriented transport over the process's standard streams.
//!
//! Outbound records are written to stdout as `<topic> <payload>` lines, the format
//! `mosquitto_sub -v` prints. Inbound commands are read from stdin, one JSON document
//! per line.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ChannelTransport, Message, Transport};
use crate::config::TransportConfig;
use crate::error::TransportError;

/// Publishes onto an in-process queue drained to stdout by a writer task
#[derive(Debug, Clone)]
pub struct StdoutTransport {
    inner: ChannelTransport,
}

impl StdoutTransport {
    /// Must be called inside a tokio runtime
    pub fn spawn(cfg: &TransportConfig) -> Self {
        let (inner, rx) = ChannelTransport::new(cfg.command_topic.clone());
        tokio::spawn(write_messages(rx, tokio::io::stdout()));
        Self { inner }
    }
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.inner.publish(topic, payload).await
    }

    fn command_topic(&self) -> String {
        self.inner.command_topic()
    }
}

/// Drain `rx` into `writer` until every sender is gone
pub async fn write_messages<W>(mut rx: mpsc::UnboundedReceiver<Message>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let line = format!("{} {}\n", message.topic, message.payload_str());
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!(error = %e, topic = %message.topic, "stdout write failed");
            continue;
        }
        if let Err(e) = writer.flush().await {
            warn!(error = %e, "stdout flush failed");
        }
    }
    debug!("stdout writer stopped");
}

/// Forward each non-empty line of `reader` to the command queue until EOF,
/// cancellation, or the queue closing
pub async fn forward_commands<R>(reader: R, tx: mpsc::Sender<Vec<u8>>, cancel: CancellationToken)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if tx.send(line.as_bytes().to_vec()).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read command line");
                break;
            }
        }
    }
    debug!("command reader stopped");
}

/// Read commands from stdin into `tx` on a background task
pub fn spawn_stdin_commands(tx: mpsc::Sender<Vec<u8>>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(forward_commands(BufReader::new(tokio::io::stdin()), tx, cancel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_become_commands() {
        let input: &[u8] = b"{\"device\":\"lights\"}\n\n  \n{}\n";
        let (tx, mut rx) = mpsc::channel(8);

        forward_commands(input, tx, CancellationToken::new()).await;

        assert_eq!(rx.recv().await.unwrap(), b"{\"device\":\"lights\"}".to_vec());
        assert_eq!(rx.recv().await.unwrap(), b"{}".to_vec());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_messages_written_as_topic_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Message {
            topic: "sensors/light/data".into(),
            payload: b"{\"value\":450.0}".to_vec(),
        })
        .unwrap();
        drop(tx);

        let mut out = Vec::new();
        write_messages(rx, &mut out).await;
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "sensors/light/data {\"value\":450.0}\n"
        );
    }
}
