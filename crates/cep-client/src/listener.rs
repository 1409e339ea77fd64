use async_trait::async_trait;
use cep_core::Notification;
use tokio::sync::mpsc;

/// Capability interface for receiving asynchronous traffic from a
/// session. Implemented by callers, consumed by the receive loop.
///
/// Only notifications ever arrive here: every other inbound packet
/// shape is filtered out with a diagnostic before dispatch.
#[async_trait]
pub trait PacketListener: Send + Sync {
    /// Called once per inbound notification, in connection arrival
    /// order. The receive loop does not read the next packet until
    /// every listener has returned.
    async fn on_notification(&self, notification: Notification);

    /// Called at most once, when the session terminates on a transport
    /// failure. Not called on an explicit close.
    async fn on_connection_error(&self);
}

/// Listener that forwards notifications into a bounded channel,
/// decoupling a slow consumer from the receive loop. Delivery order is
/// preserved; a full channel drops the notification with a diagnostic
/// rather than stalling the loop. On connection error the channel is
/// closed, so the consumer observes end-of-stream.
pub struct ChannelListener {
    tx: parking_lot::Mutex<Option<mpsc::Sender<Notification>>>,
}

impl ChannelListener {
    /// Create the listener and the receiving half of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx: parking_lot::Mutex::new(Some(tx)),
            },
            rx,
        )
    }
}

#[async_trait]
impl PacketListener for ChannelListener {
    async fn on_notification(&self, notification: Notification) {
        let tx = self.tx.lock();
        match tx.as_ref() {
            Some(tx) => {
                if let Err(e) = tx.try_send(notification) {
                    tracing::warn!(error = %e, "notification channel unavailable, dropping");
                }
            }
            None => {
                tracing::warn!("notification after connection error, dropping");
            }
        }
    }

    async fn on_connection_error(&self) {
        // Dropping the sender closes the stream for the consumer.
        self.tx.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cep_core::EventType;

    fn notification(id: u32) -> Notification {
        Notification {
            event_type: EventType::new(id),
            attributes: vec![],
            timestamp: i64::from(id),
        }
    }

    #[tokio::test]
    async fn forwards_in_order() {
        let (listener, mut rx) = ChannelListener::new(8);
        listener.on_notification(notification(1)).await;
        listener.on_notification(notification(2)).await;
        listener.on_notification(notification(3)).await;

        assert_eq!(rx.recv().await.unwrap().event_type, EventType::new(1));
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::new(2));
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::new(3));
    }

    #[tokio::test]
    async fn full_channel_drops_newest() {
        let (listener, mut rx) = ChannelListener::new(1);
        listener.on_notification(notification(1)).await;
        listener.on_notification(notification(2)).await; // dropped

        assert_eq!(rx.recv().await.unwrap().event_type, EventType::new(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn connection_error_closes_stream() {
        let (listener, mut rx) = ChannelListener::new(8);
        listener.on_notification(notification(1)).await;
        listener.on_connection_error().await;

        assert_eq!(rx.recv().await.unwrap().event_type, EventType::new(1));
        assert!(rx.recv().await.is_none());
    }
}
