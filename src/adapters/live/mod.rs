//! Live adapters for real external interactions.

pub mod discord;
pub mod groq;

pub use discord::DiscordRest;
pub use groq::GroqCompletionApi;
