//! Business logic services.
//!
//! This module contains the notification synchronization core: the HTTP
//! client for persisted notifications, the push stream listener, the
//! session store and the identity partition they share.
//!
//! Services are independent of any UI toolkit.

pub mod identity;
pub mod notification_client;
pub mod notification_store;
pub mod session;
pub mod store_events;
pub mod stream_listener;

pub use identity::{IdentityClass, IdentityClassifier, ProvisionalIdMinter};
pub use notification_client::{ApiConfig, NotificationApi, NotificationClient};
pub use notification_store::{MergeOutcome, NotificationStore, ReadOutcome, RefreshOutcome};
pub use session::NotificationSession;
pub use store_events::{ChangeReason, NotificationSnapshot, StoreChange, Subscription};
pub use stream_listener::{push_channel, ListenerStats, PushReceiver, PushSender, StreamListener};
