//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `publine` application.
//!
//! It centralizes the error types shared by the transport, broker and client
//! layers, and the tracing subscriber setup used by the binary.

pub mod error;
pub mod logging;
