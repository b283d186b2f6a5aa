//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the bot core and an external
//! system (the completion API, the chat platform). Implementations live in
//! `src/adapters/`.

pub mod chat;
pub mod completion;

pub use chat::{Author, BotIdentity, ChatFuture, ChatPlatform, IncomingMessage};
pub use completion::{ChatMessage, CompletionApi, CompletionRequest};
