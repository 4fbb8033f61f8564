//! Protocol messages exchanged between clients and the broker.
//!
//! Every message is a JSON object whose `type` field names its kind:
//!
//! ```text
//! {"type":"subscribe","topic":"news"}
//! {"type":"publish","topic":"news","message":"hello"}
//! {"type":"message","topic":"news","message":"hello"}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Subscribe { topic: String },
    Suback { topic: String },
    Unsubscribe { topic: String },
    Unsuback { topic: String },
    Publish { topic: String, message: String },
    Puback,
    /// A published payload delivered to a subscriber.
    #[serde(rename = "message")]
    Delivery { topic: String, message: String },
    Ping,
    Pong,
}

impl Message {
    /// The value of the `type` field, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Subscribe { .. } => "subscribe",
            Message::Suback { .. } => "suback",
            Message::Unsubscribe { .. } => "unsubscribe",
            Message::Unsuback { .. } => "unsuback",
            Message::Publish { .. } => "publish",
            Message::Puback => "puback",
            Message::Delivery { .. } => "message",
            Message::Ping => "ping",
            Message::Pong => "pong",
        }
    }
}
