//! Line-delimited JSON server.
//!
//! Each input line is one command object; each output line is one [`Reply`].
//! Commands run on tokio's blocking pool and are answered in input order.
//! Blank lines are ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::commands::{Command, CommandHandler};

/// A command plus an optional correlation id echoed in the reply.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<Value>,
    #[serde(flatten)]
    command: Command,
}

/// Answer to one input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Correlation id from the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Whether the command succeeded.
    pub ok: bool,
    /// Command output on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    fn from_outcome(id: Option<Value>, outcome: Result<Value, String>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(error) => Self {
                id,
                ok: false,
                result: None,
                error: Some(error),
            },
        }
    }
}

/// Parses one line and runs it.
pub async fn dispatch(handler: &Arc<CommandHandler>, line: &str) -> Reply {
    let envelope: Envelope = match serde_json::from_str(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Rejected malformed command");
            return Reply::from_outcome(None, Err(format!("invalid command: {e}")));
        }
    };

    let handler = Arc::clone(handler);
    let command = envelope.command;
    let outcome = tokio::task::spawn_blocking(move || handler.handle(command))
        .await
        .unwrap_or_else(|e| Err(format!("command aborted: {e}")));

    Reply::from_outcome(envelope.id, outcome)
}

/// Serves commands from `input` until end of stream.
///
/// # Errors
///
/// Returns an error if reading input or writing a reply fails.
pub async fn serve<R, W>(handler: Arc<CommandHandler>, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut served = 0_u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = dispatch(&handler, line).await;
        let mut encoded = serde_json::to_vec(&reply).map_err(std::io::Error::other)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
        served += 1;
    }

    info!(served, "Input closed");
    Ok(())
}
