//! Line-delimited JSON-over-stdio transport (§6: "the transport is
//! line-delimited JSON over stdio; one JSON object per line, no framing
//! beyond the newline"). Grounded in the bot's supervisor stdio adapter:
//! a spawned task reading `BufReader::lines()` inside a `tokio::select!`
//! racing a [`CancellationToken`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use corpus_core::ErrorPayload;
use corpus_protocol::ToolEnvelope;

use crate::dispatch::dispatch;
use crate::error::ServiceError;
use crate::retry::{with_retry, RetryConfig};
use crate::service::Service;

#[derive(Debug, Deserialize)]
struct ToolCall {
    id: Value,
    tool: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct ToolReply {
    id: Value,
    #[serde(flatten)]
    envelope: ToolEnvelope<Value>,
}

fn reply_for(id: Value, result: Result<Value, ServiceError>) -> ToolReply {
    let envelope = match result {
        Ok(data) => ToolEnvelope::ok(data),
        Err(err) => ToolEnvelope::err(ErrorPayload::from(&err)),
    };
    ToolReply { id, envelope }
}

/// Runs the request/response loop until stdin closes or `shutdown` fires.
///
/// A malformed line never aborts the loop: it is answered with an error
/// envelope carrying a `null` id, mirroring §7's "malformed input never
/// interrupts the server".
pub async fn run(service: &Service, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => {
                info!("stdio transport shutting down");
                break;
            }

            line = lines.next_line() => {
                let input = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!("stdin read error: {e}");
                        break;
                    }
                };

                if input.trim().is_empty() {
                    continue;
                }

                let reply = match serde_json::from_str::<ToolCall>(&input) {
                    Ok(call) if call.tool == "list_tools" => {
                        let catalog = corpus_protocol::list_tools();
                        reply_for(call.id, serde_json::to_value(catalog).map_err(|e| ServiceError::Io(e.to_string())))
                    }
                    Ok(call) => {
                        // Transient `BackendUnavailable`/`EmbeddingFailure`
                        // kinds (§7) get a bounded internal retry; every
                        // other kind fails on the first attempt.
                        let result =
                            with_retry(RetryConfig::default(), || dispatch(service, &call.tool, call.params.clone())).await;
                        reply_for(call.id, result)
                    }
                    Err(e) => reply_for(Value::Null, Err(ServiceError::MalformedRequest(e.to_string()))),
                };

                match serde_json::to_vec(&reply) {
                    Ok(mut bytes) => {
                        bytes.push(b'\n');
                        if let Err(e) = stdout.write_all(&bytes).await {
                            error!("stdout write error: {e}");
                            break;
                        }
                        if let Err(e) = stdout.flush().await {
                            error!("stdout flush error: {e}");
                            break;
                        }
                    }
                    Err(e) => error!("failed to serialize reply: {e}"),
                }
            }
        }
    }
}
