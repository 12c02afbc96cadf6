//! Change events delivered to store subscribers.
//!
//! Every UI surface (bell icon, list page) registers a callback and
//! receives the reason for the change together with an immutable snapshot.

use crate::models::Notification;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Event: notifications-changed
/// Name the UI shell uses when forwarding store changes to the frontend.
pub const NOTIFICATIONS_CHANGED_EVENT: &str = "notifications-changed";

/// Immutable view of the store at one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    /// Newest first, in arrival order.
    pub entries: Vec<Notification>,

    /// Number of entries with `is_read == false`.
    pub unread_count: usize,

    /// Increases by one on every state change.
    pub version: u64,
}

impl NotificationSnapshot {
    pub(crate) fn new(entries: Vec<Notification>, version: u64) -> Self {
        let unread_count = entries.iter().filter(|n| !n.is_read).count();
        Self {
            entries,
            unread_count,
            version,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// The `limit` newest entries, for the bell dropdown.
    pub fn recent(&self, limit: usize) -> &[Notification] {
        &self.entries[..self.entries.len().min(limit)]
    }

    /// Unread entries in store order.
    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(|n| !n.is_read)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Why the store changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReason {
    /// Entries were replaced by a server snapshot.
    SnapshotLoaded { count: usize },

    /// A push event was merged as a new provisional entry.
    PushMerged { id: i64 },

    /// One entry was marked read.
    MarkedRead { id: i64 },

    /// Every entry was marked read.
    AllMarkedRead,

    /// The session ended and entries were dropped.
    Cleared,
}

/// Payload delivered to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct StoreChange {
    pub reason: ChangeReason,
    pub snapshot: Arc<NotificationSnapshot>,
}

type Callback = Arc<dyn Fn(&StoreChange) + Send + Sync>;

/// Registered subscriber callbacks.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback)>>,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&StoreChange) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sub_id, _)| *sub_id != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver a change to every subscriber.
    ///
    /// Callbacks run without the registry lock held, so they may subscribe
    /// or unsubscribe.
    pub(crate) fn publish(&self, change: &StoreChange) {
        let callbacks: Vec<Callback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(change);
        }
    }
}

/// Handle for a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
