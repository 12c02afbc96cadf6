//! Data models for the application.
//!
//! These models represent the notifications held in the session store and
//! the values exchanged with the UI layer.

pub mod navigation;
pub mod notification;

// Re-exports for convenient access
pub use navigation::Route;
pub use notification::{Notification, NotificationType, PushEvent, RelatedObjectType};
