//! Core library for the chatcast live-stream event relay.
//!
//! Owns the single-active-session coordinator, the upstream client
//! boundary, the event translator, and the subscriber fan-out hub.
//! The HTTP/WebSocket surface lives in `chatcast-api`.

pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod relay;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
