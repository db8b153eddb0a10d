//! Ordered lifecycle queue shared by the notification and confirmation engines
//!
//! Every entry starts `Active`, may move to `Leaving` exactly once, and is then
//! deleted outright. There is no `Removed` phase: removal is deletion.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Identifier of a queued item, unique within one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Raw ordinal
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a queued item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Rendered normally
    Active,
    /// Exit animation is playing; the item is deleted when it ends
    Leaving,
}

/// Event emitted whenever an engine's queue changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A new item was enqueued
    Pushed(ItemId),
    /// An item moved from `Active` to `Leaving`
    Leaving(ItemId),
    /// An item was deleted from the queue
    Removed(ItemId),
}

/// Allocates strictly increasing ids starting at 1
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Hand out the next id
    pub fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }
}

/// A queued item
#[derive(Debug, Clone)]
pub struct Entry<T> {
    /// Identifier assigned at creation
    pub id: ItemId,
    /// Engine-specific data
    pub payload: T,
    /// Current phase
    pub phase: Phase,
}

/// Insertion-ordered queue with unique ids
#[derive(Debug)]
pub struct LifecycleQueue<T> {
    entries: VecDeque<Entry<T>>,
}

impl<T> Default for LifecycleQueue<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T> LifecycleQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new `Active` entry at the front (most recent first)
    pub fn push_front(&mut self, id: ItemId, payload: T) {
        self.entries.push_front(Entry {
            id,
            payload,
            phase: Phase::Active,
        });
    }

    /// Insert a new `Active` entry at the back (oldest first)
    pub fn push_back(&mut self, id: ItemId, payload: T) {
        self.entries.push_back(Entry {
            id,
            payload,
            phase: Phase::Active,
        });
    }

    /// Look up an entry
    pub fn get(&self, id: ItemId) -> Option<&Entry<T>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look up an entry mutably
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Entry<T>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Move an entry from `Active` to `Leaving`
    ///
    /// Returns `true` only for the first transition; unknown ids and entries
    /// already leaving are left untouched.
    pub fn begin_leave(&mut self, id: ItemId) -> bool {
        match self.get_mut(id) {
            Some(entry) if entry.phase == Phase::Active => {
                entry.phase = Phase::Leaving;
                true
            }
            _ => false,
        }
    }

    /// Delete an entry
    pub fn remove(&mut self, id: ItemId) -> Option<Entry<T>> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    /// Delete every entry, returning them in display order
    pub fn drain(&mut self) -> Vec<Entry<T>> {
        self.entries.drain(..).collect()
    }

    /// Entries in display order
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    /// Number of entries, leaving ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a.get(), 1);
        assert!(b > a);
    }

    #[test]
    fn test_push_front_and_back_order() {
        let mut ids = IdAllocator::default();
        let mut front = LifecycleQueue::new();
        let mut back = LifecycleQueue::new();
        for name in ["a", "b", "c"] {
            let id = ids.next_id();
            front.push_front(id, name);
            back.push_back(id, name);
        }

        let front: Vec<_> = front.iter().map(|e| e.payload).collect();
        let back: Vec<_> = back.iter().map(|e| e.payload).collect();
        assert_eq!(front, vec!["c", "b", "a"]);
        assert_eq!(back, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_begin_leave_only_once() {
        let mut ids = IdAllocator::default();
        let mut queue = LifecycleQueue::new();
        let id = ids.next_id();
        queue.push_back(id, ());

        assert!(queue.begin_leave(id));
        assert!(!queue.begin_leave(id));
        assert_eq!(queue.get(id).unwrap().phase, Phase::Leaving);
        assert!(!queue.begin_leave(ids.next_id()));
    }

    #[test]
    fn test_remove_and_drain() {
        let mut ids = IdAllocator::default();
        let mut queue = LifecycleQueue::new();
        let a = ids.next_id();
        let b = ids.next_id();
        queue.push_back(a, 1);
        queue.push_back(b, 2);

        assert_eq!(queue.remove(a).map(|e| e.payload), Some(1));
        assert!(queue.remove(a).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let mut ids = IdAllocator::default();
        let json = serde_json::to_string(&QueueEvent::Leaving(ids.next_id())).unwrap();
        assert_eq!(json, r#"{"type":"leaving","id":1}"#);
    }
}
