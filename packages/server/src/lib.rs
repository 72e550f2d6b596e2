//! WebSocket event dispatcher for the chat relay.
//!
//! This crate is the transport boundary around `relay-core`: it accepts
//! WebSocket connections, parses wire events into core actions, and
//! delivers the resolved fan-outs over per-connection channels. Framing
//! and serialization live here and nowhere else.

pub mod dto;
pub mod handler;
pub mod logger;
pub mod pusher;
pub mod runner;
pub mod signal;
pub mod state;

pub use runner::run_server;
