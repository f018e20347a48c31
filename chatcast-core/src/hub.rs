//! In-memory fan-out hub for connected viewers.
//!
//! Broadcast is fire-and-forget: the relay never waits for, retries, or
//! acknowledges delivery to individual subscribers. A subscriber whose
//! channel is gone is evicted during the broadcast that discovers it.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::relay::message::OutboundMessage;

/// Handle for a viewer connection subscription
pub type ConnectionId = String;

/// Message sender for a viewer connection
pub type MessageSender = mpsc::UnboundedSender<OutboundMessage>;

#[derive(Clone, Default)]
pub struct MessageHub {
    subscribers: Arc<DashMap<ConnectionId, MessageSender>>,
}

impl MessageHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a viewer; returns the receiving half of its channel.
    pub fn subscribe(&self, connection_id: ConnectionId) -> mpsc::UnboundedReceiver<OutboundMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(connection_id.clone(), tx);

        info!(connection_id = %connection_id, "Viewer subscribed");
        rx
    }

    pub fn unsubscribe(&self, connection_id: &str) {
        if self.subscribers.remove(connection_id).is_some() {
            info!(connection_id = %connection_id, "Viewer unsubscribed");
        } else {
            warn!(
                connection_id = %connection_id,
                "Attempted to unsubscribe unknown connection"
            );
        }
    }

    /// Broadcast a message to every attached subscriber.
    ///
    /// Returns the number of subscribers the message was handed to.
    pub fn broadcast(&self, message: &OutboundMessage) -> usize {
        let mut sent_count = 0;
        let mut failed_connections = Vec::new();

        for entry in self.subscribers.iter() {
            if entry.value().send(message.clone()).is_ok() {
                sent_count += 1;
            } else {
                failed_connections.push(entry.key().clone());
            }
        }

        for connection_id in failed_connections {
            warn!(
                connection_id = %connection_id,
                "Subscriber channel closed, evicting"
            );
            self.unsubscribe(&connection_id);
        }

        if sent_count > 0 {
            debug!(
                sent_count = sent_count,
                message_kind = %message.kind(),
                "Broadcast complete"
            );
        }

        sent_count
    }

    /// Send a message to one subscriber only (the `status` greeting on attach).
    pub fn send_to(&self, connection_id: &str, message: OutboundMessage) -> bool {
        self.subscribers
            .get(connection_id)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(text: &str) -> OutboundMessage {
        OutboundMessage::Status {
            message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_and_broadcast() {
        let hub = MessageHub::new();
        let mut rx = hub.subscribe("conn1".to_string());

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.broadcast(&status("hello")), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind(), "status");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let hub = MessageHub::new();
        let mut rx1 = hub.subscribe("conn1".to_string());
        let mut rx2 = hub.subscribe("conn2".to_string());

        assert_eq!(hub.broadcast(&status("hello")), 2);
        assert_eq!(rx1.recv().await.unwrap().kind(), "status");
        assert_eq!(rx2.recv().await.unwrap().kind(), "status");
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_subscriber() {
        let hub = MessageHub::new();
        let _rx = hub.subscribe("conn1".to_string());
        assert_eq!(hub.subscriber_count(), 1);

        hub.unsubscribe("conn1");
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.broadcast(&status("hello")), 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_evicted_on_broadcast() {
        let hub = MessageHub::new();
        let rx = hub.subscribe("conn1".to_string());
        drop(rx);

        assert_eq!(hub.broadcast(&status("hello")), 0);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_send_to_targets_one_subscriber() {
        let hub = MessageHub::new();
        let mut rx1 = hub.subscribe("conn1".to_string());
        let mut rx2 = hub.subscribe("conn2".to_string());

        assert!(hub.send_to("conn1", status("just you")));
        assert!(!hub.send_to("missing", status("nobody")));

        assert_eq!(rx1.recv().await.unwrap().kind(), "status");
        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(50), rx2.recv())
                .await
                .is_err(),
            "conn2 should not have received the message"
        );
    }
}
