//! Error type shared across ScpBot crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScpBotError>;

#[derive(Debug, Error)]
pub enum ScpBotError {
    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Wiki page could not be fetched or parsed.
    #[error("wiki error: {0}")]
    Wiki(String),

    /// Chat channel transport failure.
    #[error("channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
