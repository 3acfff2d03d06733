/**
 * Message Broadcasting
 *
 * This module provides the broadcast hub shared by the WebSocket
 * endpoints and by background tasks that want to notify connected
 * clients.
 *
 * # Broadcasting
 *
 * Messages are fanned out using `tokio::sync::broadcast`: every
 * subscriber receives a copy of each text frame. There are no delivery
 * guarantees - a subscriber that lags far enough behind simply misses
 * frames, and a broadcast with no subscribers is dropped.
 */
use tokio::sync::broadcast;

/// Channel capacity per subscriber before a slow reader starts lagging.
const CHANNEL_CAPACITY: usize = 1000;

/// Broadcast hub carrying plain text frames to all WebSocket subscribers.
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<String>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Broadcaster { tx }
    }

    /// Subscribe to the hub. The receiver only sees frames broadcast
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Send a text frame to every current subscriber.
    ///
    /// Returns the number of subscribers that received the frame (0 when
    /// nobody is connected, which is not an error).
    pub fn broadcast(&self, message: impl Into<String>) -> usize {
        match self.tx.send(message.into()) {
            Ok(subscriber_count) => {
                tracing::debug!("broadcast reached {} subscribers", subscriber_count);
                subscriber_count
            }
            Err(_) => {
                // No subscribers, that's okay
                0
            }
        }
    }

    /// Number of currently attached subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_no_subscribers() {
        let hub = Broadcaster::new();
        assert_eq!(hub.broadcast("hello"), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let hub = Broadcaster::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.broadcast("hello"), 2);
        assert_eq!(a.recv().await.unwrap(), "hello");
        assert_eq!(b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_subscriber_only_sees_later_frames() {
        let hub = Broadcaster::new();
        hub.broadcast("before");

        let mut rx = hub.subscribe();
        hub.broadcast("after");

        assert_eq!(rx.recv().await.unwrap(), "after");
    }

    #[tokio::test]
    async fn test_receiver_count_drops_on_disconnect() {
        let hub = Broadcaster::new();
        let rx = hub.subscribe();
        assert_eq!(hub.receiver_count(), 1);
        drop(rx);
        assert_eq!(hub.receiver_count(), 0);
    }
}
