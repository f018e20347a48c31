//! HTTP and WebSocket surface for the live-stream event relay.
//!
//! Control operations are plain JSON endpoints; relayed events reach
//! viewers over the WebSocket fan-out.

pub mod http;

pub use http::{create_router, AppState};
