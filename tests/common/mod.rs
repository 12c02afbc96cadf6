//! Shared test doubles for integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use shelter_notify::models::{Notification, NotificationType, RelatedObjectType};
use shelter_notify::services::NotificationApi;
use shelter_notify::AppError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Which failure a remote write should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBehavior {
    Succeed,
    NotFound,
    Offline,
}

#[derive(Default)]
struct Inner {
    snapshots: Mutex<VecDeque<Result<Vec<Notification>, AppError>>>,
    fetch_calls: AtomicUsize,
    mark_read_calls: Mutex<Vec<i64>>,
    mark_all_calls: AtomicUsize,
    write_behavior: Mutex<Option<WriteBehavior>>,
}

/// In-memory notification API that records every call.
///
/// Clones share state so a test can keep a handle after giving one to a store.
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Inner>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `fetch_all`.
    pub fn queue_snapshot(&self, list: Vec<Notification>) {
        self.inner.snapshots.lock().unwrap().push_back(Ok(list));
    }

    pub fn queue_fetch_error(&self, error: AppError) {
        self.inner.snapshots.lock().unwrap().push_back(Err(error));
    }

    pub fn set_write_behavior(&self, behavior: WriteBehavior) {
        *self.inner.write_behavior.lock().unwrap() = Some(behavior);
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn mark_read_calls(&self) -> Vec<i64> {
        self.inner.mark_read_calls.lock().unwrap().clone()
    }

    pub fn mark_all_calls(&self) -> usize {
        self.inner.mark_all_calls.load(Ordering::SeqCst)
    }

    fn write_result(&self, id: Option<i64>) -> Result<(), AppError> {
        match self
            .inner
            .write_behavior
            .lock()
            .unwrap()
            .unwrap_or(WriteBehavior::Succeed)
        {
            WriteBehavior::Succeed => Ok(()),
            WriteBehavior::NotFound => Err(AppError::not_found_with_id(
                "Notification",
                id.map(|i| i.to_string()).unwrap_or_default(),
            )),
            WriteBehavior::Offline => Err(AppError::network("Failed to connect to server")),
        }
    }
}

impl NotificationApi for MockApi {
    async fn fetch_all(&self) -> Result<Vec<Notification>, AppError> {
        self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        self.inner.mark_read_calls.lock().unwrap().push(id);
        self.write_result(Some(id))
    }

    async fn mark_all_read(&self) -> Result<(), AppError> {
        self.inner.mark_all_calls.fetch_add(1, Ordering::SeqCst);
        self.write_result(None)
    }
}

/// A persisted notification as the server would return it.
pub fn persisted(id: i64, title: &str, message: &str, is_read: bool) -> Notification {
    Notification {
        id,
        title: title.to_string(),
        message: message.to_string(),
        notification_type: NotificationType::ReportUpdate,
        related_object_type: Some(RelatedObjectType::Report),
        related_object_id: Some(id),
        is_read,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}
