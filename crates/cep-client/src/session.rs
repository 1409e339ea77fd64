use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cep_core::{ClientError, EngineType, EventType, Packet, Publication, Subscription};
use cep_telemetry::ClientMetrics;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::listener::PacketListener;
use crate::rules::{self, ParsedRule};
use crate::transport::{self, TransportError};

/// Where a session is in its lifecycle. `Terminated` is absorbing: no
/// operation succeeds after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Listening,
    Terminated,
}

/// One client session bound to one server endpoint.
///
/// The session owns the connection exclusively. The receive loop is
/// the only reader; send operations go through a write mutex so
/// concurrent callers cannot interleave partial frames.
pub struct Session {
    peer: String,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    /// Read half, unclaimed until `start()` takes it.
    reader: parking_lot::Mutex<Option<OwnedReadHalf>>,
    listeners: Arc<Mutex<Vec<Arc<dyn PacketListener>>>>,
    connected: Arc<AtomicBool>,
    listening: Arc<AtomicBool>,
    recv_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<ClientMetrics>,
}

impl Session {
    /// Connect eagerly to the server endpoint. An unreachable endpoint
    /// fails here; nothing retries.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let stream = transport::connect(host, port).await?;
        let peer = format!("{host}:{port}");
        let (reader, writer) = stream.into_split();
        tracing::info!(peer = %peer, "session connected");

        Ok(Self {
            peer,
            writer: Arc::new(Mutex::new(writer)),
            reader: parking_lot::Mutex::new(Some(reader)),
            listeners: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(AtomicBool::new(true)),
            listening: Arc::new(AtomicBool::new(false)),
            recv_task: parking_lot::Mutex::new(None),
            metrics: Arc::new(ClientMetrics::default()),
        })
    }

    /// Register a listener for inbound notifications and connection
    /// failures. Listeners registered after the loop starts see only
    /// packets decoded after registration.
    pub async fn add_listener(&self, listener: Arc<dyn PacketListener>) {
        self.listeners.lock().await.push(listener);
    }

    pub fn state(&self) -> SessionState {
        if !self.connected.load(Ordering::SeqCst) {
            SessionState::Terminated
        } else if self.listening.load(Ordering::SeqCst) {
            SessionState::Listening
        } else {
            SessionState::Connected
        }
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Start the background receive loop. Claims the read half;
    /// starting twice is an error.
    pub fn start(&self) -> Result<(), ClientError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }
        let reader = self
            .reader
            .lock()
            .take()
            .ok_or_else(|| ClientError::Argument("receive loop already started".into()))?;
        self.listening.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(receive_loop(
            reader,
            self.peer.clone(),
            Arc::clone(&self.listeners),
            Arc::clone(&self.connected),
            Arc::clone(&self.listening),
            Arc::clone(&self.metrics),
        ));
        *self.recv_task.lock() = Some(handle);
        tracing::info!(peer = %self.peer, "receive loop started");
        Ok(())
    }

    /// Send one packet. Blocks until the write completes or fails. A
    /// failed write is reported and not retried; the session stays
    /// connected and the caller decides.
    pub async fn send(&self, packet: &Packet) -> Result<(), ClientError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }
        let mut writer = self.writer.lock().await;
        match transport::write_packet(&mut *writer, packet).await {
            Ok(()) => {
                self.metrics.packets_sent.increment();
                tracing::debug!(
                    packet = packet.packet_type(),
                    event_type = %packet.event_type(),
                    "packet sent"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.send_failures.increment();
                Err(ClientError::Send(e.to_string()))
            }
        }
    }

    /// Submit a parsed rule to run on the given execution engine.
    pub async fn submit_rule(
        &self,
        rule: ParsedRule,
        engine: EngineType,
    ) -> Result<(), ClientError> {
        self.send(&rules::build_submission(rule, engine)).await
    }

    /// Subscribe to a non-empty set of event types. One packet per id,
    /// sent independently: a failed send cancels nothing, and every
    /// outcome is reported.
    #[allow(clippy::type_complexity)]
    pub async fn subscribe(
        &self,
        types: &[EventType],
    ) -> Result<Vec<(EventType, Result<(), ClientError>)>, ClientError> {
        if types.is_empty() {
            return Err(ClientError::Argument("subscription set is empty".into()));
        }
        let mut results = Vec::with_capacity(types.len());
        for &event_type in types {
            let outcome = self
                .send(&Packet::Subscription(Subscription { event_type }))
                .await;
            results.push((event_type, outcome));
        }
        Ok(results)
    }

    /// Publish an event built from parallel key/value slices. Pair
    /// validation happens before any I/O.
    pub async fn publish<K, V>(
        &self,
        event_type: EventType,
        keys: &[K],
        values: &[V],
    ) -> Result<(), ClientError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let publication = Publication::from_pairs(event_type, keys, values)?;
        self.send(&Packet::Publication(publication)).await
    }

    /// Tear the session down. Absorbing: every later operation fails
    /// with `NotConnected`. Listeners do not get a connection-error
    /// callback for an explicit close.
    pub async fn close(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        self.listening.store(false, Ordering::SeqCst);
        if let Some(handle) = self.recv_task.lock().take() {
            handle.abort();
        }
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
        tracing::info!(peer = %self.peer, "session closed");
    }
}

/// Background reader: decodes whole packets off the connection and
/// dispatches notifications to listeners in registration order. The
/// loop tolerates malformed frames and unexpected packet shapes; only
/// a connection-level fault ends it.
async fn receive_loop(
    mut reader: OwnedReadHalf,
    peer: String,
    listeners: Arc<Mutex<Vec<Arc<dyn PacketListener>>>>,
    connected: Arc<AtomicBool>,
    listening: Arc<AtomicBool>,
    metrics: Arc<ClientMetrics>,
) {
    loop {
        match transport::read_packet(&mut reader).await {
            Ok(Packet::Notification(notification)) => {
                metrics.notifications_received.increment();
                let listeners = listeners.lock().await;
                for listener in listeners.iter() {
                    listener.on_notification(notification.clone()).await;
                }
            }
            Ok(other) => {
                // The server should only ever push notifications.
                metrics.malformed_dropped.increment();
                tracing::warn!(packet = other.packet_type(), "ignoring unexpected packet");
            }
            Err(TransportError::Decode(e)) => {
                metrics.malformed_dropped.increment();
                tracing::warn!(error = %e, "ignoring malformed packet");
            }
            Err(e) => {
                listening.store(false, Ordering::SeqCst);
                // Exactly one report, and none if close() got here first.
                if connected.swap(false, Ordering::SeqCst) {
                    tracing::error!(peer = %peer, error = %e, "connection lost");
                    let listeners = listeners.lock().await;
                    for listener in listeners.iter() {
                        listener.on_connection_error().await;
                    }
                }
                break;
            }
        }
    }
}
