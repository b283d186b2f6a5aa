//! A single gateway session: connect, identify, heartbeat, dispatch.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::payload::{
    decode_dispatch, heartbeat, identify, is_fatal_close, GatewayEvent, GatewayPayload, Hello,
    OP_DISPATCH, OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_HELLO, OP_INVALID_SESSION, OP_RECONNECT,
};
use crate::error::GatewayError;

/// Maps a close frame to the session outcome, keeping fatal codes.
fn close_reason(frame: Option<&CloseFrame<'_>>) -> GatewayError {
    match frame.map(|frame| u16::from(frame.code)) {
        Some(code) if is_fatal_close(code) => GatewayError::Rejected(code),
        Some(code) => {
            debug!(code, "gateway closed the connection");
            GatewayError::Closed
        }
        None => GatewayError::Closed,
    }
}

/// Runs one session until the connection ends. Never returns `Ok`.
///
/// # Errors
///
/// Returns why the session ended. [`GatewayError::ChannelClosed`] means the
/// bot loop is gone and [`GatewayError::Rejected`] means the credentials or
/// intents are wrong; no new session should be started after either.
pub async fn run_session(
    url: &str,
    token: &str,
    events: &mpsc::Sender<GatewayEvent>,
) -> Result<(), GatewayError> {
    let (socket, _) = connect_async(url).await?;
    let (mut sink, mut stream) = socket.split();

    let interval = loop {
        let Some(frame) = stream.next().await else {
            return Err(GatewayError::Closed);
        };
        match frame? {
            Message::Text(text) => {
                let payload: GatewayPayload = serde_json::from_str(&text)?;
                if payload.op == OP_HELLO {
                    break serde_json::from_value::<Hello>(payload.d)?.heartbeat_interval;
                }
            }
            Message::Close(frame) => return Err(close_reason(frame.as_ref())),
            _ => {}
        }
    };
    debug!(interval_ms = interval, "gateway hello");

    sink.send(Message::Text(identify(token).to_string())).await?;

    let mut ticker = tokio::time::interval(Duration::from_millis(interval.max(1)));
    ticker.tick().await;
    let mut seq: Option<u64> = None;
    let mut acked = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !acked {
                    let _ = sink.send(Message::Close(None)).await;
                    return Err(GatewayError::HeartbeatTimeout);
                }
                sink.send(Message::Text(heartbeat(seq).to_string())).await?;
                acked = false;
            }
            frame = stream.next() => {
                let Some(frame) = frame else {
                    return Err(GatewayError::Closed);
                };
                let text = match frame? {
                    Message::Text(text) => text,
                    Message::Close(frame) => return Err(close_reason(frame.as_ref())),
                    _ => continue,
                };
                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "skipping undecodable gateway frame");
                        continue;
                    }
                };
                if payload.s.is_some() {
                    seq = payload.s;
                }
                match payload.op {
                    OP_DISPATCH => {
                        let Some(name) = payload.t else { continue };
                        match decode_dispatch(&name, payload.d) {
                            Ok(Some(event)) => {
                                events.send(event).await.map_err(|_| GatewayError::ChannelClosed)?;
                            }
                            Ok(None) => {}
                            Err(e) => warn!(event = %name, error = %e, "skipping malformed dispatch"),
                        }
                    }
                    OP_HEARTBEAT => {
                        sink.send(Message::Text(heartbeat(seq).to_string())).await?;
                    }
                    OP_HEARTBEAT_ACK => acked = true,
                    op @ (OP_RECONNECT | OP_INVALID_SESSION) => {
                        return Err(GatewayError::SessionEnded(op));
                    }
                    _ => {}
                }
            }
        }
    }
}
