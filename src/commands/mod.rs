//! UI command handlers.
//!
//! This module contains the operations exposed to the dashboard frontend.
//! Commands are organized by functionality:
//! - `notifications`: bell icon, list page, mark-read and click-through

pub mod notifications;

pub use notifications::{
    get_notifications, get_recent_notifications, mark_all_notifications_read,
    mark_notification_read, open_notification, refresh_notifications, OpenedNotification,
    RecentNotifications,
};
