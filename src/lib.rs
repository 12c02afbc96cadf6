//! Shelter Notify - notification synchronization core for the shelter
//! operations dashboard.
//!
//! Keeps the persisted notification history and the live push stream in
//! one deduplicated store with a single unread count, shared by every UI
//! surface of a signed-in session.

pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod settings;

pub use error::AppError;
pub use services::{NotificationSession, NotificationStore};
pub use settings::{load_settings, save_settings, AppSettings};
