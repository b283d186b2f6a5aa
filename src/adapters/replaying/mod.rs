//! Replaying adapters that serve recorded interactions.

pub mod completion;

pub use completion::ReplayingCompletionApi;
