//! Connection gateway for WebSocket peers
//!
//! The `Gateway` tracks every live connection and the bounded queue feeding
//! its write loop. It implements [`Outbox`], so the room broadcaster can push
//! frames to peers without knowing about sockets.
//!
//! # Architecture
//!
//! ```text
//! RoomBroadcaster ──deliver──▶ Gateway ──try_send──▶ bounded mpsc ──▶ write loop ──▶ Client
//!                                 │
//!                           queue full?
//!                                 │
//!                 drop policy: discard frame / disconnect policy: evict peer
//! ```

use crate::config::SlowConsumerPolicy;
use crate::core::connection::{Connection, ConnectionId};
use crate::core::outbox::{Delivery, Outbox};
use crate::core::protocol::OutboundFrame;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Notify, mpsc};

/// A handle to a single WebSocket connection
struct PeerHandle {
    /// Sender to push frames to the client's write loop
    tx: mpsc::Sender<OutboundFrame>,
    /// Signalled when the peer must be disconnected
    evict: Arc<Notify>,
}

/// Receiving side handed to the socket task on accept
pub struct PeerReceiver {
    /// Frames to write to the client, in order
    pub frames: mpsc::Receiver<OutboundFrame>,
    /// Resolves when the gateway evicts this peer
    pub evicted: Arc<Notify>,
}

/// Manages all live connections
///
/// Uses a std `RwLock`: `deliver` is synchronous and every critical section
/// is a map lookup or insert.
pub struct Gateway {
    peers: RwLock<HashMap<ConnectionId, PeerHandle>>,
    buffer: usize,
    policy: SlowConsumerPolicy,
}

impl Gateway {
    /// Create a gateway whose peers each get a queue of `buffer` frames
    pub fn new(buffer: usize, policy: SlowConsumerPolicy) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
            policy,
        }
    }

    /// Register a new connection
    ///
    /// Returns the connection record (open, unjoined) and the receiver the
    /// socket task drains into the WebSocket.
    pub fn accept(&self) -> (Connection, PeerReceiver) {
        let id = ConnectionId::new();
        let (tx, frames) = mpsc::channel(self.buffer);
        let evict = Arc::new(Notify::new());

        let handle = PeerHandle {
            tx,
            evict: evict.clone(),
        };

        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), handle);

        tracing::info!(connection_id = %id, "New client connected");

        (
            Connection::new(id),
            PeerReceiver {
                frames,
                evicted: evict,
            },
        )
    }

    /// Queue `frame` for `to` without blocking
    ///
    /// Unknown or closed peers are skipped. A full queue is resolved by the
    /// configured [`SlowConsumerPolicy`].
    pub fn send(&self, to: &ConnectionId, frame: OutboundFrame) -> Delivery {
        let result = {
            let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
            let Some(peer) = peers.get(to) else {
                return Delivery::Skipped;
            };
            peer.tx.try_send(frame)
        };

        match result {
            Ok(()) => Delivery::Delivered,
            // Write loop is gone; the read loop will clean up shortly
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Skipped,
            Err(mpsc::error::TrySendError::Full(_)) => match self.policy {
                SlowConsumerPolicy::Drop => {
                    tracing::warn!(connection_id = %to, "Outbound queue full, dropping frame");
                    Delivery::Dropped
                }
                SlowConsumerPolicy::Disconnect => {
                    self.evict(to);
                    Delivery::Evicted
                }
            },
        }
    }

    /// Forget a connection and mark its record closed
    pub fn close(&self, conn: &mut Connection) {
        conn.mark_closed();
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(conn.id());
        tracing::info!(connection_id = %conn.id(), "Client disconnected");
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop the peer's handle and wake its socket task
    ///
    /// Once removed, further sends to the peer are skipped; the socket task
    /// runs the normal leave/close path.
    fn evict(&self, id: &ConnectionId) {
        let removed = self
            .peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        if let Some(peer) = removed {
            tracing::warn!(connection_id = %id, "Evicting slow consumer");
            peer.evict.notify_one();
        }
    }
}

impl Outbox for Gateway {
    fn deliver(&self, to: &ConnectionId, frame: OutboundFrame) -> Delivery {
        self.send(to, frame)
    }
}
