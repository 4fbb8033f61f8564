//! The `session` module defines the broker-side representation of one
//! connected client.
//!
//! It provides the `Session` struct, which encapsulates the state of a single
//! connection: its unique identifier, the queue feeding its socket writer, and
//! the close signal shared by its reader and writer tasks.

pub mod session;
pub use session::{Session, SessionId};

#[cfg(test)]
mod tests;
