//! Authenticated session lifecycle.
//!
//! A session owns the single notification store shared by every UI
//! surface. Signing in creates the store, loads the first snapshot and
//! then starts the push listener; signing out stops the listener and drops
//! all entries.

use crate::error::AppError;
use crate::models::PushEvent;
use crate::services::identity::IdentityClassifier;
use crate::services::notification_client::{NotificationApi, NotificationClient};
use crate::services::notification_store::{NotificationStore, ReadOutcome, RefreshOutcome};
use crate::services::stream_listener::{ListenerStats, StreamListener};
use crate::settings::AppSettings;
use futures::Stream;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Notification state for one signed-in principal.
pub struct NotificationSession<A> {
    store: Arc<NotificationStore<A>>,
    settings: AppSettings,
    cancel_token: CancellationToken,
    listener: Option<JoinHandle<ListenerStats>>,
    runtime: Handle,
}

impl NotificationSession<NotificationClient> {
    /// Sign in against the configured HTTP API.
    pub async fn connect<S>(settings: AppSettings, push_events: S) -> Result<Self, AppError>
    where
        S: Stream<Item = PushEvent> + Unpin + Send + 'static,
    {
        let client = NotificationClient::new(settings.api.clone())?;
        Self::sign_in(settings, client, push_events).await
    }
}

impl<A> NotificationSession<A>
where
    A: NotificationApi + 'static,
{
    /// Start a session: load the first snapshot, then start the push listener.
    ///
    /// A failed initial load is logged; the session starts empty and the
    /// next refresh retries.
    pub async fn sign_in<S>(settings: AppSettings, api: A, push_events: S) -> Result<Self, AppError>
    where
        S: Stream<Item = PushEvent> + Unpin + Send + 'static,
    {
        settings.validate()?;

        let classifier = IdentityClassifier::new(settings.store.partition_threshold);
        let store = Arc::new(NotificationStore::new(api, classifier));

        // Pushes queued during the first fetch merge after the snapshot.
        match store.refresh().await {
            RefreshOutcome::Loaded { count } => {
                log::info!("[notifications] Session started with {} notifications", count)
            }
            RefreshOutcome::Kept { .. } => {
                log::info!("[notifications] Session started without initial snapshot")
            }
        }

        let runtime = Handle::current();
        let cancel_token = CancellationToken::new();
        let listener_store = Arc::clone(&store);
        let listener_cancel = cancel_token.clone();
        let listener = runtime.spawn(async move {
            StreamListener::new(push_events)
                .run(&listener_store, listener_cancel)
                .await
        });

        Ok(Self {
            store,
            settings,
            cancel_token,
            listener: Some(listener),
            runtime,
        })
    }

    /// The store shared by every subscriber of this session.
    pub fn store(&self) -> &Arc<NotificationStore<A>> {
        &self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Whether the push listener is still consuming events.
    pub fn is_listening(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Explicit user refresh.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.store.refresh().await
    }

    /// Mark one entry read without waiting for the server.
    ///
    /// The local change is applied before this returns; only the remote
    /// call runs on the session's runtime, so any thread may call this.
    /// Returns `None` when the entry is absent or already read.
    pub fn spawn_mark_read(&self, id: i64) -> Option<JoinHandle<ReadOutcome>> {
        let class = self.store.apply_read(id)?;

        let store = Arc::clone(&self.store);
        Some(
            self.runtime
                .spawn(async move { store.push_read(id, class).await }),
        )
    }

    /// Mark every entry read without waiting for the server.
    pub fn spawn_mark_all_read(&self) -> JoinHandle<ReadOutcome> {
        self.store.apply_all_read();

        let store = Arc::clone(&self.store);
        self.runtime
            .spawn(async move { store.push_all_read().await })
    }

    /// End the session: stop the listener and drop every entry.
    pub async fn sign_out(mut self) -> ListenerStats {
        self.cancel_token.cancel();

        let stats = match self.listener.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                log::error!("[notifications] Push listener task failed: {}", e);
                ListenerStats::default()
            }),
            None => ListenerStats::default(),
        };

        self.store.clear();
        log::info!(
            "[notifications] Session ended ({} push events received)",
            stats.received
        );
        stats
    }
}

impl<A> Drop for NotificationSession<A> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
