//! Gateway wire format: frames, opcodes and the dispatch events we consume.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::ports::chat::{Author, BotIdentity, IncomingMessage};

/// Event dispatch.
pub const OP_DISPATCH: u8 = 0;
/// Heartbeat (both directions).
pub const OP_HEARTBEAT: u8 = 1;
/// Identify.
pub const OP_IDENTIFY: u8 = 2;
/// Server asks the client to reconnect.
pub const OP_RECONNECT: u8 = 7;
/// Session invalidated.
pub const OP_INVALID_SESSION: u8 = 9;
/// First frame after connecting.
pub const OP_HELLO: u8 = 10;
/// Server acknowledges a heartbeat.
pub const OP_HEARTBEAT_ACK: u8 = 11;

/// Whether a gateway close code means reconnecting cannot help: bad token
/// (4004), bad shard (4010, 4011), or bad intents (4012..=4014).
#[must_use]
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010..=4014)
}

const INTENT_GUILDS: u64 = 1 << 0;
const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
const INTENT_DIRECT_MESSAGES: u64 = 1 << 12;
const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

/// Intents requested on identify.
pub const INTENTS: u64 =
    INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_DIRECT_MESSAGES | INTENT_MESSAGE_CONTENT;

/// One gateway frame.
#[derive(Debug, Deserialize)]
pub struct GatewayPayload {
    /// Opcode.
    pub op: u8,
    /// Event data.
    #[serde(default)]
    pub d: Value,
    /// Sequence number, dispatches only.
    #[serde(default)]
    pub s: Option<u64>,
    /// Event name, dispatches only.
    #[serde(default)]
    pub t: Option<String>,
}

/// Data of the HELLO frame.
#[derive(Debug, Deserialize)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// Inbound events delivered to the bot loop.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// The session is ready.
    Ready {
        /// The bot's own account.
        bot: BotIdentity,
        /// Number of guilds the bot is in.
        guild_count: usize,
    },
    /// A message was posted somewhere the bot can see.
    Message(IncomingMessage),
}

#[derive(Deserialize)]
struct User {
    id: String,
    username: String,
    #[serde(default)]
    bot: bool,
}

#[derive(Deserialize)]
struct Ready {
    user: User,
    #[serde(default)]
    guilds: Vec<Value>,
}

#[derive(Deserialize)]
struct MessageCreate {
    id: String,
    channel_id: String,
    #[serde(default)]
    guild_id: Option<String>,
    author: User,
    #[serde(default)]
    content: String,
    #[serde(default)]
    mentions: Vec<User>,
}

/// Decodes a dispatch. Events the bot does not handle yield `None`.
///
/// # Errors
///
/// Returns an error if a handled event has an unexpected shape.
pub fn decode_dispatch(event: &str, data: Value) -> Result<Option<GatewayEvent>, serde_json::Error> {
    match event {
        "READY" => {
            let ready: Ready = serde_json::from_value(data)?;
            Ok(Some(GatewayEvent::Ready {
                bot: BotIdentity { id: ready.user.id, username: ready.user.username },
                guild_count: ready.guilds.len(),
            }))
        }
        "MESSAGE_CREATE" => {
            let msg: MessageCreate = serde_json::from_value(data)?;
            Ok(Some(GatewayEvent::Message(IncomingMessage {
                id: msg.id,
                channel_id: msg.channel_id,
                guild_id: msg.guild_id,
                author: Author {
                    id: msg.author.id,
                    username: msg.author.username,
                    bot: msg.author.bot,
                },
                content: msg.content,
                mentions: msg.mentions.into_iter().map(|u| u.id).collect(),
            })))
        }
        _ => Ok(None),
    }
}

/// IDENTIFY frame for a bot token.
#[must_use]
pub fn identify(token: &str) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "chatrelay",
                "device": "chatrelay"
            }
        }
    })
}

/// HEARTBEAT frame carrying the last sequence number seen.
#[must_use]
pub fn heartbeat(seq: Option<u64>) -> Value {
    json!({ "op": OP_HEARTBEAT, "d": seq })
}
