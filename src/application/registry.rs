//! The room registry - ambient per-room state under one roof.
//!
//! Owns, per room: today's resolved schedule (the cache broadcasts read),
//! the set of live subscriber connections, and the mutation lock that
//! serializes mutation-plus-propagation sequences against that room. One
//! registry is constructed at startup and handed to every component as an
//! `Arc`; nothing here is a free-floating global.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::domain::foundation::RoomName;
use crate::domain::Period;

/// Unique identifier for one subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frames handed to a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A serialized snapshot to deliver
    Payload(String),
    /// Close the connection (room deleted or renamed out from under it)
    Close,
}

/// Sending half of a connection's outbound channel.
pub type OutboundSender = mpsc::UnboundedSender<OutboundFrame>;

struct RoomEntry {
    resolved: Vec<Period>,
    mutation_lock: Arc<Mutex<()>>,
}

impl RoomEntry {
    fn new() -> Self {
        Self {
            resolved: Vec::new(),
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Default)]
struct Inner {
    /// Every known room, with its resolved-schedule cache.
    rooms: HashMap<RoomName, RoomEntry>,
    /// Subscriber sets, present only for rooms that currently have
    /// subscribers. The entry is discarded when its last subscriber leaves.
    subscribers: HashMap<RoomName, HashMap<ConnectionId, OutboundSender>>,
}

/// Registry of known rooms, their resolved schedules, and their live
/// subscribers.
#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<Inner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room with an empty resolved cache. Idempotent; an
    /// existing room's cache and subscribers are left alone.
    pub fn insert_room(&self, room: RoomName) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        inner.rooms.entry(room).or_insert_with(RoomEntry::new);
    }

    /// Drop a room entirely: its cache, its mutation lock, and its
    /// subscriber set. Every live subscriber is told to close; clients must
    /// re-send a room name when they reconnect.
    pub fn remove_room(&self, room: &str) {
        let dropped = {
            let mut inner = self.inner.write().expect("registry lock poisoned");
            inner.rooms.remove(room);
            inner.subscribers.remove(room)
        };
        if let Some(subscribers) = dropped {
            tracing::info!(
                room = %room,
                connections = subscribers.len(),
                "force-closing subscribers of dropped room"
            );
            for sender in subscribers.into_values() {
                let _ = sender.send(OutboundFrame::Close);
            }
        }
    }

    /// Whether a room is known.
    pub fn known(&self, room: &str) -> bool {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .rooms
            .contains_key(room)
    }

    /// Names of all known rooms.
    pub fn rooms(&self) -> Vec<RoomName> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .rooms
            .keys()
            .cloned()
            .collect()
    }

    /// Today's resolved schedule for a room (empty if unknown or not yet
    /// resolved).
    pub fn resolved(&self, room: &str) -> Vec<Period> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .rooms
            .get(room)
            .map(|entry| entry.resolved.clone())
            .unwrap_or_default()
    }

    /// Replace a room's resolved-schedule cache.
    pub fn set_resolved(&self, room: &str, periods: Vec<Period>) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if let Some(entry) = inner.rooms.get_mut(room) {
            entry.resolved = periods;
        }
    }

    /// The mutation lock serializing writes against a room, or `None` if
    /// the room is unknown. Hold the lock from the first document read to
    /// the last write of a mutation sequence.
    pub fn mutation_lock(&self, room: &str) -> Option<Arc<Mutex<()>>> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .rooms
            .get(room)
            .map(|entry| Arc::clone(&entry.mutation_lock))
    }

    /// Add a subscriber to a known room. Returns `false` (and drops the
    /// sender) if the room is unknown.
    pub fn subscribe(&self, room: &str, id: ConnectionId, sender: OutboundSender) -> bool {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        let Some((key, _)) = inner.rooms.get_key_value(room) else {
            return false;
        };
        let key = key.clone();
        inner.subscribers.entry(key).or_default().insert(id, sender);
        true
    }

    /// Remove one subscriber. When this empties the room's subscriber set,
    /// the set entry itself is discarded.
    pub fn unsubscribe(&self, room: &str, id: &ConnectionId) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if let Some(set) = inner.subscribers.get_mut(room) {
            set.remove(id);
            if set.is_empty() {
                inner.subscribers.remove(room);
            }
        }
    }

    /// A point-in-time copy of a room's subscriber senders, so fan-out can
    /// iterate without holding the registry lock while connections come and
    /// go underneath it.
    pub fn subscriber_snapshot(&self, room: &str) -> Vec<OutboundSender> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .subscribers
            .get(room)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a room currently has any live subscribers.
    pub fn has_subscribers(&self, room: &str) -> bool {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .subscribers
            .contains_key(room)
    }

    #[cfg(test)]
    fn subscriber_set_exists(&self, room: &str) -> bool {
        self.inner
            .read()
            .unwrap()
            .subscribers
            .contains_key(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomName {
        RoomName::new(name).unwrap()
    }

    fn channel() -> (OutboundSender, mpsc::UnboundedReceiver<OutboundFrame>) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn subscribe_requires_known_room() {
        let registry = RoomRegistry::new();
        let (tx, _rx) = channel();
        assert!(!registry.subscribe("nowhere", ConnectionId::new(), tx));

        registry.insert_room(room("Room 1"));
        let (tx, _rx) = channel();
        assert!(registry.subscribe("Room 1", ConnectionId::new(), tx));
        assert!(registry.has_subscribers("Room 1"));
    }

    #[test]
    fn last_unsubscribe_discards_the_set_entry() {
        let registry = RoomRegistry::new();
        registry.insert_room(room("Room 1"));

        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let (tx_a, _rx_a) = channel();
        let (tx_b, _rx_b) = channel();
        registry.subscribe("Room 1", a, tx_a);
        registry.subscribe("Room 1", b, tx_b);

        registry.unsubscribe("Room 1", &a);
        assert!(registry.subscriber_set_exists("Room 1"));

        registry.unsubscribe("Room 1", &b);
        assert!(!registry.subscriber_set_exists("Room 1"));
        // the room itself is still known
        assert!(registry.known("Room 1"));
    }

    #[test]
    fn remove_room_closes_subscribers() {
        let registry = RoomRegistry::new();
        registry.insert_room(room("Room 1"));
        let (tx, mut rx) = channel();
        registry.subscribe("Room 1", ConnectionId::new(), tx);

        registry.remove_room("Room 1");

        assert!(!registry.known("Room 1"));
        assert!(!registry.has_subscribers("Room 1"));
        assert_eq!(rx.try_recv(), Ok(OutboundFrame::Close));
    }

    #[test]
    fn resolved_cache_round_trip() {
        let registry = RoomRegistry::new();
        registry.insert_room(room("Room 1"));
        assert!(registry.resolved("Room 1").is_empty());

        let periods = vec![Period {
            name: "P1".to_string(),
            start: "08:00".to_string(),
            end: "09:00".to_string(),
        }];
        registry.set_resolved("Room 1", periods.clone());
        assert_eq!(registry.resolved("Room 1"), periods);

        // unknown rooms read as empty, not as an error
        assert!(registry.resolved("nowhere").is_empty());
    }

    #[test]
    fn insert_room_is_idempotent() {
        let registry = RoomRegistry::new();
        registry.insert_room(room("Room 1"));
        registry.set_resolved(
            "Room 1",
            vec![Period {
                name: "P1".to_string(),
                start: "08:00".to_string(),
                end: "09:00".to_string(),
            }],
        );
        registry.insert_room(room("Room 1"));
        assert_eq!(registry.resolved("Room 1").len(), 1);
    }

    #[test]
    fn mutation_lock_absent_for_unknown_room() {
        let registry = RoomRegistry::new();
        assert!(registry.mutation_lock("nowhere").is_none());
        registry.insert_room(room("Room 1"));
        assert!(registry.mutation_lock("Room 1").is_some());
    }

    #[tokio::test]
    async fn mutation_lock_serializes_holders() {
        let registry = RoomRegistry::new();
        registry.insert_room(room("Room 1"));
        let lock = registry.mutation_lock("Room 1").unwrap();
        let guard = lock.lock().await;
        let second = registry.mutation_lock("Room 1").unwrap();
        assert!(second.try_lock().is_err());
        drop(guard);
        assert!(second.try_lock().is_ok());
    }
}
