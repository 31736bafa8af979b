//! Room registry: room identifier → member set
//!
//! Plain data with no locking of its own. The [`RoomBroadcaster`](super::RoomBroadcaster)
//! owns the only instance and mutates it under its lock.
//!
//! Invariant: a room is present iff it has at least one member. Rooms are
//! created by the first [`insert`](RoomRegistry::insert) and deleted by the
//! [`remove`](RoomRegistry::remove) that empties them.

use crate::core::connection::ConnectionId;
use std::collections::{HashMap, HashSet};

/// A named broadcast group
#[derive(Debug, Default)]
pub struct Room {
    members: HashSet<ConnectionId>,
}

impl Room {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Outcome of adding a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// The room did not exist before this call
    pub room_created: bool,
    /// The member was not already present
    pub member_added: bool,
}

/// Outcome of removing a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// The member was present
    pub member_removed: bool,
    /// The room became empty and was deleted
    pub room_deleted: bool,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to `room`, creating the room on first use
    ///
    /// Adding an existing member is a no-op.
    pub fn insert(&mut self, room: &str, member: &ConnectionId) -> Insertion {
        let room_created = !self.rooms.contains_key(room);
        let entry = self.rooms.entry(room.to_string()).or_default();
        let member_added = entry.members.insert(member.clone());

        Insertion {
            room_created,
            member_added,
        }
    }

    /// Remove `member` from `room`, deleting the room if it becomes empty
    pub fn remove(&mut self, room: &str, member: &ConnectionId) -> Removal {
        let Some(entry) = self.rooms.get_mut(room) else {
            return Removal {
                member_removed: false,
                room_deleted: false,
            };
        };

        let member_removed = entry.members.remove(member);
        let room_deleted = entry.is_empty();
        if room_deleted {
            self.rooms.remove(room);
        }

        Removal {
            member_removed,
            room_deleted,
        }
    }

    /// Snapshot of the members of `room`, without `exclude`
    ///
    /// Fan-outs iterate this copy after releasing the lock, so concurrent
    /// joins and leaves never mutate a set that is being walked.
    pub fn members_except(&self, room: &str, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|r| r.members.iter().filter(|id| *id != exclude).cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_room(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    /// Number of members in `room` (0 when the room does not exist)
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(Room::len).unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room identifiers, sorted
    pub fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }
}
