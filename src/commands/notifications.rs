//! Notification command handlers.
//!
//! Entry points the UI shell calls on behalf of the bell icon and the
//! notification list page. Remote failures never reach the caller; only
//! invalid requests return an error.

use crate::error::AppError;
use crate::models::{Notification, Route};
use crate::services::notification_client::NotificationApi;
use crate::services::notification_store::{ReadOutcome, RefreshOutcome};
use crate::services::session::NotificationSession;
use crate::services::store_events::NotificationSnapshot;
use serde::Serialize;
use std::sync::Arc;

/// Bell dropdown contents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentNotifications {
    pub entries: Vec<Notification>,
    pub unread_count: usize,
}

/// Result of clicking a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedNotification {
    pub id: i64,
    /// Screen to navigate to, if the notification points anywhere.
    pub route: Option<Route>,
    /// Frontend path for `route`.
    pub path: Option<String>,
    pub read: ReadOutcome,
}

/// Get every notification with the unread count.
pub async fn get_notifications<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
) -> Result<Arc<NotificationSnapshot>, AppError> {
    Ok(session.store().get_snapshot())
}

/// Get the newest notifications for the bell icon.
pub async fn get_recent_notifications<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
) -> Result<RecentNotifications, AppError> {
    let snapshot = session.store().get_snapshot();
    Ok(RecentNotifications {
        entries: snapshot.recent(session.settings().store.recent_limit).to_vec(),
        unread_count: snapshot.unread_count,
    })
}

/// Reload from the server.
///
/// Returns the resulting snapshot, which is the previous one if the reload failed.
pub async fn refresh_notifications<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
) -> Result<Arc<NotificationSnapshot>, AppError> {
    if let RefreshOutcome::Kept { error } = session.refresh().await {
        log::debug!("[notifications] Refresh command kept old state: {}", error);
    }
    Ok(session.store().get_snapshot())
}

/// Mark one notification read.
pub async fn mark_notification_read<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
    id: i64,
) -> Result<ReadOutcome, AppError> {
    Ok(session.store().mark_read(id).await)
}

/// Mark all notifications read.
pub async fn mark_all_notifications_read<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
) -> Result<ReadOutcome, AppError> {
    Ok(session.store().mark_all_read().await)
}

/// Open a notification: mark it read and resolve where it leads.
pub async fn open_notification<A: NotificationApi + 'static>(
    session: &NotificationSession<A>,
    id: i64,
) -> Result<OpenedNotification, AppError> {
    let snapshot = session.store().get_snapshot();
    let notification = snapshot
        .get(id)
        .ok_or_else(|| AppError::not_found_with_id("Notification", id.to_string()))?;
    let route = Route::for_notification(notification);

    let read = session.store().mark_read(id).await;

    Ok(OpenedNotification {
        id,
        path: route.as_ref().map(Route::path),
        route,
        read,
    })
}
