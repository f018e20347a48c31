//! Provider-connector bridge client.
//!
//! The live-stream protocol itself (handshake signing, message decoding)
//! is owned by an external connector sidecar. This client attaches to the
//! sidecar's WebSocket event feed for one stream identifier and forwards
//! the decoded JSON frames as [`LiveEvent`]s on the session's event channel.
//!
//! Teardown is modelled as a cancellation token: `disconnect` cancels the
//! reader task, which closes the socket and emits a final `Disconnected`
//! event, mirroring the disconnect notification of the upstream library.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{
    ConnectOptions, LiveClient, LiveClientFactory, LiveEvent, LiveEventReceiver, UpstreamError,
};

type ConnectorSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Factory producing [`ConnectorClient`]s against a fixed sidecar endpoint.
pub struct ConnectorClientFactory {
    endpoint: Url,
    connect_timeout: Duration,
}

impl ConnectorClientFactory {
    #[must_use]
    pub fn new(endpoint: Url, connect_timeout: Duration) -> Self {
        Self {
            endpoint,
            connect_timeout,
        }
    }
}

impl LiveClientFactory for ConnectorClientFactory {
    fn create(
        &self,
        stream_id: &str,
        options: ConnectOptions,
    ) -> (Arc<dyn LiveClient>, LiveEventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();

        let client = Arc::new(ConnectorClient {
            stream_id: stream_id.to_string(),
            feed_url: event_feed_url(&self.endpoint, stream_id, &options),
            connect_timeout: self.connect_timeout,
            events,
            shutdown: CancellationToken::new(),
            reader: Mutex::new(None),
        });

        (client, receiver)
    }
}

/// Event feed URL for one stream: the sidecar endpoint plus the stream
/// identifier and connection options as query parameters.
fn event_feed_url(endpoint: &Url, stream_id: &str, options: &ConnectOptions) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("uniqueId", stream_id)
        .append_pair(
            "extendedGiftInfo",
            if options.enable_extended_gift_info {
                "true"
            } else {
                "false"
            },
        );
    url
}

pub struct ConnectorClient {
    stream_id: String,
    feed_url: Url,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<LiveEvent>,
    shutdown: CancellationToken,
    reader: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait::async_trait]
impl LiveClient for ConnectorClient {
    async fn connect(&self) -> Result<(), UpstreamError> {
        if self.reader.lock().is_some() {
            return Err(UpstreamError::Connect("already connected".to_string()));
        }

        let (socket, _response) =
            tokio::time::timeout(self.connect_timeout, connect_async(self.feed_url.as_str()))
                .await
                .map_err(|_| {
                    UpstreamError::Connect(format!(
                        "connector handshake timed out after {}s",
                        self.connect_timeout.as_secs()
                    ))
                })?
                .map_err(|e| UpstreamError::Connect(e.to_string()))?;

        debug!(stream_id = %self.stream_id, "Connector event feed attached");

        let handle = tokio::spawn(read_loop(
            socket,
            self.events.clone(),
            self.shutdown.clone(),
            self.stream_id.clone(),
        ));
        *self.reader.lock() = Some(handle);

        Ok(())
    }

    async fn disconnect(&self) -> Result<(), UpstreamError> {
        let Some(handle) = self.reader.lock().take() else {
            return Err(UpstreamError::NotConnected);
        };

        self.shutdown.cancel();
        handle
            .await
            .map_err(|e| UpstreamError::Disconnect(e.to_string()))
    }
}

/// Forward connector frames onto the event channel until the feed ends,
/// a transport error occurs, or the client is disconnected.
async fn read_loop(
    mut socket: ConnectorSocket,
    events: mpsc::UnboundedSender<LiveEvent>,
    shutdown: CancellationToken,
    stream_id: String,
) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                let _ = socket.close(None).await;
                let _ = events.send(LiveEvent::Disconnected {
                    reason: Some("client disconnect".to_string()),
                });
                return;
            }
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<LiveEvent>(text.as_str()) {
                        Ok(event) => {
                            // Receiver gone means the session was torn down.
                            if events.send(event).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(stream_id = %stream_id, "Ignoring undecodable connector frame: {e}");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    let _ = events.send(LiveEvent::Disconnected {
                        reason: Some("event feed closed".to_string()),
                    });
                    return;
                }
                Some(Ok(_)) => {} // ping/pong/binary: nothing to relay
                Some(Err(e)) => {
                    let _ = events.send(LiveEvent::Error {
                        message: e.to_string(),
                    });
                    return;
                }
            }
        }
    }
}
