//! Push stream consumption.
//!
//! The push transport is external; it feeds raw events into a
//! [`PushSender`] and the listener forwards them to the store one at a
//! time, in arrival order.

use crate::error::AppError;
use crate::models::PushEvent;
use crate::services::notification_client::NotificationApi;
use crate::services::notification_store::{MergeOutcome, NotificationStore};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Counters reported when a listener stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Events taken from the stream.
    pub received: u64,

    /// Events that became new entries.
    pub merged: u64,

    /// Events dropped as duplicates.
    pub duplicates: u64,
}

/// Forwards push events from a stream into a store.
pub struct StreamListener<S> {
    events: S,
}

impl<S> StreamListener<S>
where
    S: Stream<Item = PushEvent> + Unpin,
{
    pub fn new(events: S) -> Self {
        Self { events }
    }

    /// Consume events until the stream ends or `cancel` fires.
    pub async fn run<A: NotificationApi>(
        mut self,
        store: &NotificationStore<A>,
        cancel: CancellationToken,
    ) -> ListenerStats {
        let mut stats = ListenerStats::default();

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("[notifications] Push listener cancelled");
                    break;
                }
                event = self.events.next() => event,
            };

            let Some(event) = event else {
                log::info!("[notifications] Push stream ended");
                break;
            };

            stats.received += 1;
            match store.merge_push(event) {
                MergeOutcome::Merged { .. } => stats.merged += 1,
                MergeOutcome::Duplicate => stats.duplicates += 1,
            }
        }

        stats
    }
}

/// Push payload as delivered by the transport.
///
/// Accepts the flat `{title, body, type}` form and the
/// `{notification: {title, body}, data: {type}}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPush {
    Flat(PushEvent),
    Envelope {
        notification: EnvelopeNotification,
        #[serde(default)]
        data: EnvelopeData,
    },
}

#[derive(Debug, Deserialize)]
struct EnvelopeNotification {
    title: String,
    body: String,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    #[serde(rename = "type", default)]
    event_type: String,
}

/// Decode a raw transport payload into a push event.
pub fn decode_push_payload(payload: &str) -> Result<PushEvent, AppError> {
    let raw: RawPush = serde_json::from_str(payload)
        .map_err(|e| AppError::invalid_input(format!("Unrecognized push payload: {}", e)))?;

    Ok(match raw {
        RawPush::Flat(event) => event,
        RawPush::Envelope { notification, data } => {
            PushEvent::new(notification.title, notification.body, data.event_type)
        }
    })
}

/// Transport-facing end of the push channel.
#[derive(Debug, Clone)]
pub struct PushSender {
    tx: mpsc::UnboundedSender<PushEvent>,
}

/// Listener-facing end of the push channel.
pub type PushReceiver = mpsc::UnboundedReceiver<PushEvent>;

/// Create an unbounded push channel.
///
/// Sending never blocks the transport.
pub fn push_channel() -> (PushSender, PushReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (PushSender { tx }, rx)
}

impl PushSender {
    /// Queue an event. Fails if the session has ended.
    pub fn send(&self, event: PushEvent) -> Result<(), AppError> {
        self.tx
            .unbounded_send(event)
            .map_err(|_| AppError::internal("Push listener not running"))
    }

    /// Decode and queue a raw payload. Malformed payloads are dropped.
    pub fn send_raw(&self, payload: &str) -> Result<(), AppError> {
        match decode_push_payload(payload) {
            Ok(event) => self.send(event),
            Err(e) => {
                log::warn!("[notifications] Dropping push payload: {}", e);
                Ok(())
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
