//! Discord gateway client delivering inbound events to the bot loop.
//!
//! Sessions are not resumed: when one ends, a fresh one is identified after
//! a short pause. A close code that rejects the token or intents ends the
//! loop instead.

pub mod payload;
pub mod session;

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::GatewayError;

pub use payload::GatewayEvent;

/// Default gateway endpoint.
pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Keeps a gateway session open, reconnecting until `events` is closed.
///
/// # Errors
///
/// Returns [`GatewayError::Rejected`] when the gateway refuses the bot's
/// token or intents; reconnecting would be refused again.
pub async fn run(
    url: String,
    token: String,
    events: mpsc::Sender<GatewayEvent>,
) -> Result<(), GatewayError> {
    loop {
        info!("connecting to gateway");
        match session::run_session(&url, &token, &events).await {
            Err(GatewayError::ChannelClosed) => return Ok(()),
            Err(e @ GatewayError::Rejected(_)) => {
                error!(error = %e, "gateway rejected the bot, not reconnecting");
                return Err(e);
            }
            Err(e) => warn!(error = %e, "gateway session ended"),
            Ok(()) => {}
        }
        if events.is_closed() {
            return Ok(());
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
