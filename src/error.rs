//! Error types for each external boundary.

use thiserror::Error;

/// Startup configuration failures. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The persona document could not be read.
    #[error("failed to read persona file {path}: {source}")]
    PersonaRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The persona document is not valid YAML for a persona.
    #[error("failed to parse persona file {path}: {source}")]
    PersonaParse {
        /// Path that was parsed.
        path: String,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

/// Failures of a single completion-API call.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the raw body.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The response contained no choices.
    #[error("response contained no choices")]
    NoChoices,

    /// A replayed interaction recorded an error.
    #[error("{0}")]
    Replayed(String),

    /// A cassette ran out of recorded completions.
    #[error("cassette exhausted: {0}")]
    CassetteExhausted(String),
}

/// Failures of outbound chat actions.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The request never produced an HTTP response.
    #[error("chat request failed: {0}")]
    Transport(String),

    /// The chat platform answered with a non-success status.
    #[error("chat API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the raw body.
        message: String,
    },
}

/// Failures of a gateway session. The session is restarted after any of these.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The websocket could not be opened or broke mid-session.
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be decoded.
    #[error("malformed gateway payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The gateway asked us to reconnect or invalidated the session.
    #[error("gateway requested a new session (op {0})")]
    SessionEnded(u8),

    /// The socket closed.
    #[error("gateway connection closed")]
    Closed,

    /// The gateway closed with a code that reconnecting cannot fix, such as
    /// 4004 for a bad token.
    #[error("gateway rejected the bot (close code {0}); check DISCORD_BOT_TOKEN and intents")]
    Rejected(u16),

    /// The previous heartbeat was never acknowledged.
    #[error("heartbeat not acknowledged; connection presumed dead")]
    HeartbeatTimeout,

    /// The event receiver was dropped; the bot is shutting down.
    #[error("event channel closed")]
    ChannelClosed,
}
