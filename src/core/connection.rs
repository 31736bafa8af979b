//! Per-connection identity and membership state
//!
//! A [`Connection`] is owned by the socket task that serves it. The room
//! registry only ever stores its [`ConnectionId`].
//!
//! ```text
//! Unjoined ──join(r)──▶ Member(r) ──join(r')──▶ Member(r')   (leaves r first)
//!     │                     │
//!     └──────close──────────┴──────▶ Closed
//! ```

use crate::core::protocol::DEFAULT_USER_NAME;
use std::fmt;
use uuid::Uuid;

/// Opaque, never reused identity of a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        Self(format!("conn_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room membership of a connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No join processed yet
    #[default]
    Unjoined,
    /// Member of exactly one room
    Member { room: String, user_name: String },
}

/// One live peer session
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    open: bool,
}

impl Connection {
    /// Create an open, unjoined connection
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: ConnectionState::Unjoined,
            open: true,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// The room this connection belongs to, if any
    pub fn room(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Member { room, .. } => Some(room),
            ConnectionState::Unjoined => None,
        }
    }

    /// Display name; `"Anonymous"` until a join records one
    pub fn user_name(&self) -> &str {
        match &self.state {
            ConnectionState::Member { user_name, .. } => user_name,
            ConnectionState::Unjoined => DEFAULT_USER_NAME,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn enter_room(&mut self, room: String, user_name: String) {
        self.state = ConnectionState::Member { room, user_name };
    }

    /// Reset to `Unjoined`, returning the previous membership
    pub(crate) fn leave_room(&mut self) -> ConnectionState {
        std::mem::take(&mut self.state)
    }

    pub(crate) fn mark_closed(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("conn_"));
        assert_eq!(a.to_string(), a.as_str());
    }

    #[test]
    fn test_new_connection_is_open_and_unjoined() {
        let conn = Connection::new(ConnectionId::new());

        assert!(conn.is_open());
        assert_eq!(conn.room(), None);
        assert_eq!(conn.user_name(), "Anonymous");
        assert_eq!(conn.state(), &ConnectionState::Unjoined);
    }

    #[test]
    fn test_membership_transitions() {
        let mut conn = Connection::new(ConnectionId::new());

        conn.enter_room("r1".to_string(), "alice".to_string());
        assert_eq!(conn.room(), Some("r1"));
        assert_eq!(conn.user_name(), "alice");

        let previous = conn.leave_room();
        assert_eq!(
            previous,
            ConnectionState::Member {
                room: "r1".to_string(),
                user_name: "alice".to_string(),
            }
        );
        assert_eq!(conn.room(), None);

        conn.mark_closed();
        assert!(!conn.is_open());
    }
}
