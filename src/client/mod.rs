//! The `client` module implements the command-line side of the protocol.
//!
//! It provides `Connection`, a framed TCP connection that answers server
//! pings transparently, and the two client commands: `publish`, which waits
//! for a `puback`, and `Subscription`, which subscribes to a list of topics
//! and then yields deliveries.

pub mod connection;

pub use connection::{ACK_TIMEOUT, Connection, Delivery, Subscription, publish};
