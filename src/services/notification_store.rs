//! Session notification store.
//!
//! Reconciles the persisted notification history with the live push stream:
//! - Snapshot loads replace the collection wholesale
//! - Push events merge one at a time, deduplicated by `(title, message)`
//! - Read state is applied locally first, then mirrored to the server
//!   for persisted entries only
//!
//! The unread count is always derived from the entries.

use crate::error::AppError;
use crate::models::{Notification, PushEvent};
use crate::services::identity::{IdentityClass, IdentityClassifier, ProvisionalIdMinter};
use crate::services::notification_client::NotificationApi;
use crate::services::store_events::{
    ChangeReason, NotificationSnapshot, StoreChange, SubscriberRegistry, Subscription,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of merging one push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// Prepended as a new provisional entry.
    Merged { id: i64 },

    /// An entry with the same fingerprint already exists.
    Duplicate,
}

/// Result of a mark-read or mark-all-read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadOutcome {
    /// Entry absent or already read. Nothing was sent.
    Unchanged,

    /// Applied locally; provisional entries have no server counterpart.
    LocalOnly,

    /// Applied locally and acknowledged by the server.
    Confirmed,

    /// Applied locally; the server no longer has the entry.
    AlreadyGone,

    /// Applied locally; the server call failed and was not retried.
    RemoteFailed,
}

/// Result of an explicit refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The snapshot replaced the store contents.
    Loaded { count: usize },

    /// Fetch or validation failed; previous entries were kept.
    Kept { error: AppError },
}

struct StoreState {
    entries: Vec<Notification>,
    version: u64,
    published: Arc<NotificationSnapshot>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            version: 0,
            published: Arc::new(NotificationSnapshot::default()),
        }
    }

    /// Publish the current entries as a new snapshot version.
    fn commit(&mut self) -> Arc<NotificationSnapshot> {
        self.version += 1;
        self.published = Arc::new(NotificationSnapshot::new(
            self.entries.clone(),
            self.version,
        ));
        Arc::clone(&self.published)
    }
}

/// Merged, deduplicated notification collection for one session.
///
/// Shared by every UI surface; construct one per signed-in session.
pub struct NotificationStore<A> {
    api: A,
    classifier: IdentityClassifier,
    minter: ProvisionalIdMinter,
    state: Mutex<StoreState>,
    subscribers: Arc<SubscriberRegistry>,
}

impl<A: NotificationApi> NotificationStore<A> {
    /// Create an empty store.
    pub fn new(api: A, classifier: IdentityClassifier) -> Self {
        Self {
            api,
            classifier,
            minter: ProvisionalIdMinter::new(classifier),
            state: Mutex::new(StoreState::new()),
            subscribers: Arc::new(SubscriberRegistry::default()),
        }
    }

    pub fn classifier(&self) -> IdentityClassifier {
        self.classifier
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a mutation and notify subscribers if it reports a change.
    ///
    /// The state lock is released before callbacks run.
    fn update<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<Notification>) -> Option<(ChangeReason, R)>,
    ) -> Option<R> {
        let (change, result) = {
            let mut state = self.lock_state();
            let (reason, result) = mutate(&mut state.entries)?;
            let snapshot = state.commit();
            (StoreChange { reason, snapshot }, result)
        };

        self.subscribers.publish(&change);
        Some(result)
    }

    /// Current immutable view of the store.
    pub fn get_snapshot(&self) -> Arc<NotificationSnapshot> {
        Arc::clone(&self.lock_state().published)
    }

    pub fn unread_count(&self) -> usize {
        self.lock_state().published.unread_count
    }

    /// Register a change callback. Dropping the returned handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreChange) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check a server listing before it replaces local state.
    fn validate_snapshot(&self, list: &[Notification]) -> Result<(), AppError> {
        let mut seen = HashSet::with_capacity(list.len());

        for notification in list {
            if notification.id <= 0 {
                return Err(AppError::malformed_snapshot(format!(
                    "Notification id {} is not a valid server id",
                    notification.id
                )));
            }
            if self.classifier.classify(notification.id) != IdentityClass::Persisted {
                return Err(AppError::malformed_snapshot(format!(
                    "Notification id {} falls in the provisional range (threshold {})",
                    notification.id,
                    self.classifier.threshold()
                )));
            }
            if !seen.insert(notification.id) {
                return Err(AppError::malformed_snapshot(format!(
                    "Notification id {} appears more than once",
                    notification.id
                )));
            }
        }

        Ok(())
    }

    /// Replace every entry with a server snapshot.
    ///
    /// The list is kept in the order given. Provisional entries not in the
    /// list are dropped. On validation failure the previous state is kept.
    /// Only call this from an explicit refresh, never from push handling.
    pub fn load_snapshot(&self, list: Vec<Notification>) -> Result<usize, AppError> {
        self.validate_snapshot(&list)?;

        let count = list.len();
        self.update(|entries| {
            *entries = list;
            Some((ChangeReason::SnapshotLoaded { count }, ()))
        });

        log::debug!("[notifications] Loaded snapshot with {} entries", count);
        Ok(count)
    }

    /// Fetch the persisted history and load it.
    ///
    /// Failures are logged and leave the store untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        let result = match self.api.fetch_all().await {
            Ok(list) => self.load_snapshot(list),
            Err(e) => Err(e),
        };

        match result {
            Ok(count) => RefreshOutcome::Loaded { count },
            Err(error) => {
                log::warn!(
                    "[notifications] Refresh failed, keeping previous state: {}",
                    error
                );
                RefreshOutcome::Kept { error }
            }
        }
    }

    /// Merge one push event.
    pub fn merge_push(&self, event: PushEvent) -> MergeOutcome {
        self.merge_push_at(event, Utc::now())
    }

    /// Merge one push event, stamping a new entry with `now`.
    pub fn merge_push_at(&self, event: PushEvent, now: DateTime<Utc>) -> MergeOutcome {
        let outcome = self.update(|entries| {
            let duplicate = entries
                .iter()
                .any(|n| n.fingerprint() == (event.title.as_str(), event.body.as_str()));
            if duplicate {
                return None;
            }

            let id = self.minter.mint_at(now.timestamp_millis());
            entries.insert(0, event.into_notification(id, now));
            Some((ChangeReason::PushMerged { id }, id))
        });

        match outcome {
            Some(id) => {
                log::debug!("[notifications] Merged push event as provisional {}", id);
                MergeOutcome::Merged { id }
            }
            None => {
                log::debug!("[notifications] Dropped duplicate push event");
                MergeOutcome::Duplicate
            }
        }
    }

    /// Set one entry read locally and classify it.
    ///
    /// Returns `None` if the entry is absent or already read.
    pub(crate) fn apply_read(&self, id: i64) -> Option<IdentityClass> {
        self.update(|entries| {
            let entry = entries.iter_mut().find(|n| n.id == id && !n.is_read)?;
            entry.is_read = true;
            Some((ChangeReason::MarkedRead { id }, ()))
        })?;
        Some(self.classifier.classify(id))
    }

    /// Mirror a local read to the server when the entry is persisted.
    pub(crate) async fn push_read(&self, id: i64, class: IdentityClass) -> ReadOutcome {
        match class {
            IdentityClass::Provisional => ReadOutcome::LocalOnly,
            IdentityClass::Persisted => {
                Self::remote_outcome(self.api.mark_read(id).await, "mark_read")
            }
        }
    }

    /// Mark one entry read.
    ///
    /// The local change is visible to subscribers before any remote call.
    /// Remote failures are never rolled back.
    pub async fn mark_read(&self, id: i64) -> ReadOutcome {
        match self.apply_read(id) {
            Some(class) => self.push_read(id, class).await,
            None => ReadOutcome::Unchanged,
        }
    }

    /// Set every entry read locally. Returns false if nothing was unread.
    pub(crate) fn apply_all_read(&self) -> bool {
        self.update(|entries| {
            let mut changed = false;
            for entry in entries.iter_mut().filter(|n| !n.is_read) {
                entry.is_read = true;
                changed = true;
            }
            changed.then_some((ChangeReason::AllMarkedRead, ()))
        })
        .is_some()
    }

    /// One remote mark-all-read covering every persisted entry.
    pub(crate) async fn push_all_read(&self) -> ReadOutcome {
        Self::remote_outcome(self.api.mark_all_read().await, "mark_all_read")
    }

    /// Mark every entry read, then issue one remote mark-all-read.
    pub async fn mark_all_read(&self) -> ReadOutcome {
        if !self.apply_all_read() {
            log::debug!("[notifications] mark_all_read with no unread entries");
        }
        self.push_all_read().await
    }

    fn remote_outcome(result: Result<(), AppError>, operation: &str) -> ReadOutcome {
        match result {
            Ok(()) => ReadOutcome::Confirmed,
            Err(e) if e.is_not_found() => {
                log::debug!("[notifications] {} target already gone: {}", operation, e);
                ReadOutcome::AlreadyGone
            }
            Err(e) => {
                log::warn!(
                    "[notifications] {} failed, keeping local state: {}",
                    operation,
                    e
                );
                ReadOutcome::RemoteFailed
            }
        }
    }

    /// Drop every entry. Used on sign-out.
    pub fn clear(&self) {
        self.update(|entries| {
            entries.clear();
            Some((ChangeReason::Cleared, ()))
        });
    }
}
