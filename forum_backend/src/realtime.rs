//! Connection registry and mutation-notify bridge for the real-time channel.
//!
//! The registry is the sole owner of the active connection set. Set mutation
//! and snapshotting happen under a mutex; delivery happens outside it through
//! each connection's bounded outbound queue, so a slow or dead connection can
//! neither block the broadcast loop nor hold the lock across I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Per-connection outbound queue depth. A connection that stops draining its
/// queue is evicted once the queue fills.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

pub type ConnectionId = Uuid;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
    #[error("outbound queue full for connection {0}")]
    Backlogged(ConnectionId),
    #[error("connection {0} is not registered")]
    Unknown(ConnectionId),
}

/// One active real-time session, tagged with the client identifier supplied
/// at handshake time.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    client_id: i64,
    sender: mpsc::Sender<String>,
}

impl ConnectionHandle {
    /// Creates a handle plus the receiving end of its outbound queue. The
    /// session's socket pump owns the receiver; the registry owns the handle.
    pub fn new(client_id: i64) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let handle = Self {
            id: Uuid::new_v4(),
            client_id,
            sender,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        self.sender
            .try_send(message.to_owned())
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => DeliveryError::Backlogged(self.id),
                mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(self.id),
            })
    }
}

/// Tracks the set of open connections and provides the delivery primitives.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: ConnectionHandle) {
        let id = handle.id;
        let client_id = handle.client_id;
        self.lock().insert(id, handle);
        tracing::info!(connection_id = %id, client_id, "connection registered");
    }

    /// No-op when the connection is already gone, so the disconnect path and
    /// broadcast-side eviction can race without erroring.
    pub fn unregister(&self, id: ConnectionId) {
        if self.lock().remove(&id).is_some() {
            tracing::info!(connection_id = %id, "connection unregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Delivers to exactly one connection. Does not evict on failure; the
    /// caller owns the session lifecycle.
    pub fn send(&self, id: ConnectionId, message: &str) -> Result<(), DeliveryError> {
        let handle = self
            .lock()
            .get(&id)
            .cloned()
            .ok_or(DeliveryError::Unknown(id))?;
        handle.deliver(message)
    }

    /// Delivers to every connection registered at call time. Each delivery is
    /// independent: failures are collected, the failing connections evicted,
    /// and the remaining deliveries proceed. Returns the delivered count.
    pub fn broadcast(&self, message: &str) -> usize {
        let snapshot: Vec<ConnectionHandle> = self.lock().values().cloned().collect();

        let mut delivered = 0;
        let mut failed = Vec::new();
        for handle in &snapshot {
            match handle.deliver(message) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        connection_id = %handle.id,
                        client_id = handle.client_id,
                        error = %err,
                        "dropping connection after failed delivery"
                    );
                    failed.push(handle.id);
                }
            }
        }
        for id in failed {
            self.unregister(id);
        }
        delivered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, ConnectionHandle>> {
        // A poisoned set is still a valid set; recover rather than propagate.
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decouples mutation success from broadcast delivery. Handlers call
/// `notify` once, after the mutation is confirmed committed; delivery
/// failures stay inside the registry and never reach the mutating caller.
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn notify(&self, message: &str) {
        let delivered = self.registry.broadcast(message);
        tracing::debug!(delivered, message, "mutation event broadcast");
    }
}
