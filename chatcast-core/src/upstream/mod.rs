//! Upstream live-provider boundary.
//!
//! The actual live-stream protocol is owned by an external collaborator;
//! this module only defines the typed interface the relay consumes: a
//! client with an async connect/disconnect lifecycle plus a channel of
//! enumerated [`LiveEvent`]s, and a factory so the coordinator can be
//! wired with test doubles.

pub mod connector;
mod events;

pub use connector::ConnectorClientFactory;
pub use events::{ChatEvent, GiftEvent, LikeEvent, LiveEvent, LiveUser, RoomState};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Receiving half of an upstream event channel.
pub type LiveEventReceiver = mpsc::UnboundedReceiver<LiveEvent>;

/// Options passed when establishing an upstream connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub enable_extended_gift_info: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            enable_extended_gift_info: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("disconnect failed: {0}")]
    Disconnect(String),

    #[error("not connected")]
    NotConnected,
}

/// Handle to one upstream live-stream connection.
///
/// Lifecycle events and content events arrive on the [`LiveEventReceiver`]
/// returned by the factory, not as return values of these calls: `connect`
/// only initiates the handshake, the `Connected` confirmation follows
/// asynchronously.
#[async_trait]
pub trait LiveClient: Send + Sync {
    async fn connect(&self) -> Result<(), UpstreamError>;
    async fn disconnect(&self) -> Result<(), UpstreamError>;
}

/// Builds upstream clients; injectable so the coordinator can be tested
/// without a live provider.
pub trait LiveClientFactory: Send + Sync {
    fn create(
        &self,
        stream_id: &str,
        options: ConnectOptions,
    ) -> (Arc<dyn LiveClient>, LiveEventReceiver);
}
