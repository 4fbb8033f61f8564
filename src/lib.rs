//! # Publine
//!
//! `publine` is a minimalist, in-memory publish/subscribe broker built with Rust.
//! Clients connect over TCP and exchange newline-delimited JSON messages to
//! subscribe to topics and publish string payloads, which are fanned out to
//! every current subscriber of the topic. Delivery is best effort, at most once.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The central component that manages topics, subscribers, and message routing.
//! - `session`: Represents a connected client on the broker side.
//! - `transport`: Wire messages, line framing, and the TCP listener.
//! - `client`: The command-line client used to publish and subscribe.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Shared error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod session;
pub mod transport;
pub mod utils;
