//! # ScpBot Channels
//! Chat platform adapters behind the shared `Channel` trait.

pub mod discord;

pub use discord::{DiscordChannel, DiscordEventStream};
