//! Message types passed between channels and the routing agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message received from a chat channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub channel: String,
    pub thread_id: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub content: String,
    /// The author is a bot account; the agent never replies to these.
    pub sender_is_bot: bool,
    /// The message mentions this bot directly.
    pub mentioned_me: bool,
    pub timestamp: DateTime<Utc>,
}

/// A reply to send back over a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub thread_id: String,
    pub content: String,
}
