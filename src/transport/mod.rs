//! The `transport` module is responsible for network communication with
//! clients over TCP.
//!
//! It defines the messaging protocol used between clients and the server,
//! the newline-delimited JSON framing, and the listener loop that accepts
//! connections and runs one reader and one writer task per session.

pub mod codec;
pub mod message;
pub mod tcp;

pub use codec::MessageCodec;
pub use message::Message;
