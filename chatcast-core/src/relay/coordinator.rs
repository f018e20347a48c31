//! Single-active-session relay coordinator.
//!
//! Owns the one session slot, wires upstream events to subscriber
//! broadcasts, and enforces that no two upstream sessions are ever live at
//! the same time. Start/stop requests are serialized by an operation lock;
//! the slot itself is only ever mutated under a synchronous lock, never
//! across an await, so a request always observes and tears down whatever
//! in-progress handle came before it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::hub::MessageHub;
use crate::relay::message::OutboundMessage;
use crate::relay::translator;
use crate::upstream::{
    ConnectOptions, LiveClient, LiveClientFactory, LiveEvent, LiveEventReceiver,
};

/// The one upstream session: identifier, target stream, and client handle.
struct Session {
    id: u64,
    stream_id: String,
    client: Arc<dyn LiveClient>,
}

type Slot = Arc<Mutex<Option<Session>>>;

pub struct SessionCoordinator {
    factory: Arc<dyn LiveClientFactory>,
    hub: MessageHub,
    slot: Slot,
    /// Serializes start/stop requests; upstream-driven transitions only
    /// touch the slot lock and never wait on this.
    ops: tokio::sync::Mutex<()>,
    next_session_id: AtomicU64,
    connect_options: ConnectOptions,
}

impl SessionCoordinator {
    #[must_use]
    pub fn new(factory: Arc<dyn LiveClientFactory>, hub: MessageHub) -> Self {
        Self {
            factory,
            hub,
            slot: Arc::new(Mutex::new(None)),
            ops: tokio::sync::Mutex::new(()),
            next_session_id: AtomicU64::new(1),
            connect_options: ConnectOptions::default(),
        }
    }

    /// Override the options passed to the factory on every start.
    #[must_use]
    pub fn with_connect_options(mut self, options: ConnectOptions) -> Self {
        self.connect_options = options;
        self
    }

    /// Stream identifier of the current session, if one is present.
    #[must_use]
    pub fn current_stream_id(&self) -> Option<String> {
        self.slot.lock().as_ref().map(|s| s.stream_id.clone())
    }

    /// Start relaying the given stream, tearing down any prior session first.
    ///
    /// Returns the start acknowledgment; the `connected` confirmation
    /// arrives later as a broadcast once the upstream handshake completes.
    pub async fn start_session(&self, stream_id: &str) -> Result<String, Error> {
        let stream_id = stream_id.trim();
        if stream_id.is_empty() {
            return Err(Error::InvalidArgument("streamId is required".to_string()));
        }

        let _op = self.ops.lock().await;

        // Tear down whatever was there, connected or still connecting.
        // Teardown failure is logged only; the slot is already cleared.
        let previous = self.slot.lock().take();
        if let Some(previous) = previous {
            info!(stream_id = %previous.stream_id, "Disconnecting previous session");
            if let Err(e) = previous.client.disconnect().await {
                warn!(
                    stream_id = %previous.stream_id,
                    "Failed to disconnect previous session: {e}"
                );
            }
        }

        info!(stream_id = %stream_id, "Connecting to upstream live stream");

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (client, events) = self
            .factory
            .create(stream_id, self.connect_options.clone());

        tokio::spawn(run_event_pump(
            id,
            stream_id.to_string(),
            events,
            self.hub.clone(),
            Arc::clone(&self.slot),
        ));

        *self.slot.lock() = Some(Session {
            id,
            stream_id: stream_id.to_string(),
            client: client.clone(),
        });

        if let Err(e) = client.connect().await {
            error!(stream_id = %stream_id, "Failed to start upstream connection: {e}");
            take_session_if(&self.slot, id);
            if let Err(e2) = client.disconnect().await {
                warn!(
                    stream_id = %stream_id,
                    "Disconnect after failed connect also failed: {e2}"
                );
            }
            return Err(Error::UpstreamConnect(e.to_string()));
        }

        Ok(format!("Connection process to {stream_id} started."))
    }

    /// Stop the current session.
    ///
    /// The slot is cleared unconditionally once a stop has been accepted,
    /// even when the upstream disconnect fails. Known limitation: a
    /// disconnect that failed only to report success can orphan a live
    /// upstream connection; clearing anyway keeps the relay usable.
    pub async fn stop_session(&self) -> Result<String, Error> {
        let _op = self.ops.lock().await;

        let Some(session) = self.slot.lock().take() else {
            return Err(Error::NoActiveSession);
        };

        match session.client.disconnect().await {
            Ok(()) => {
                info!(stream_id = %session.stream_id, "Upstream session disconnected");
                Ok("Upstream session disconnected.".to_string())
            }
            Err(e) => {
                error!(
                    stream_id = %session.stream_id,
                    "Failed to disconnect upstream session: {e}"
                );
                Err(Error::UpstreamDisconnect(e.to_string()))
            }
        }
    }
}

/// Take the session out of the slot, but only if it is still the one the
/// caller knows about. A stale pump must never clear a newer session.
fn take_session_if(slot: &Mutex<Option<Session>>, session_id: u64) -> Option<Session> {
    let mut guard = slot.lock();
    if guard.as_ref().is_some_and(|s| s.id == session_id) {
        guard.take()
    } else {
        None
    }
}

/// Per-session event pump: translates upstream events into broadcasts and
/// applies the slot transitions. Ends when the event channel closes, which
/// happens once the session's client handle has been dropped everywhere.
async fn run_event_pump(
    session_id: u64,
    stream_id: String,
    mut events: LiveEventReceiver,
    hub: MessageHub,
    slot: Slot,
) {
    while let Some(event) = events.recv().await {
        match event {
            LiveEvent::Connected { state } => {
                info!(stream_id = %stream_id, room_id = %state.room_id, "Upstream connected");
                hub.broadcast(&OutboundMessage::Connected {
                    message: format!("Connected to live stream: {stream_id}"),
                    state,
                });
            }
            LiveEvent::Disconnected { reason } => {
                info!(
                    stream_id = %stream_id,
                    reason = reason.as_deref().unwrap_or(""),
                    "Upstream disconnected"
                );
                hub.broadcast(&OutboundMessage::Disconnected {
                    message: "Disconnected from live stream".to_string(),
                });
                take_session_if(&slot, session_id);
            }
            LiveEvent::Error { message } => {
                error!(stream_id = %stream_id, "Upstream connection error: {message}");
                hub.broadcast(&OutboundMessage::Error {
                    message: "Upstream connection error".to_string(),
                    error: message,
                });
                // Never leave an errored session half-alive: clear the slot,
                // then best-effort disconnect the handle we took out.
                if let Some(session) = take_session_if(&slot, session_id) {
                    if let Err(e) = session.client.disconnect().await {
                        warn!(
                            stream_id = %stream_id,
                            "Disconnect after upstream error failed: {e}"
                        );
                    }
                }
            }
            LiveEvent::Chat(chat) => {
                debug!(
                    stream_id = %stream_id,
                    user = %chat.user.unique_id,
                    "Relaying chat message"
                );
                hub.broadcast(&translator::chat_message(&chat));
            }
            LiveEvent::Gift(gift) => {
                debug!(
                    stream_id = %stream_id,
                    user = %gift.user.unique_id,
                    gift = %gift.gift_name,
                    "Relaying gift"
                );
                hub.broadcast(&translator::gift_message(&gift));
            }
            LiveEvent::Like(like) => {
                debug!(
                    stream_id = %stream_id,
                    user = %like.user.unique_id,
                    "Relaying like"
                );
                hub.broadcast(&translator::like_message(&like));
            }
        }
    }
}
