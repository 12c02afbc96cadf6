//! Identifier partitioning between persisted and provisional notifications.
//!
//! Persisted ids are small sequential integers assigned by the server.
//! Provisional ids are minted locally from wall-clock milliseconds, which
//! always lands above the partition threshold.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Default boundary between the two id classes.
///
/// Wall-clock milliseconds have exceeded this since 1973; no shelter
/// accumulates this many persisted notifications.
pub const DEFAULT_PARTITION_THRESHOLD: i64 = 100_000_000_000;

/// Which side of the partition an id falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityClass {
    /// Server-assigned; has a remote counterpart.
    Persisted,
    /// Client-minted from a push event; local only.
    Provisional,
}

/// Decides whether an id refers to a persisted or provisional notification.
///
/// This is the only place ids are compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityClassifier {
    threshold: i64,
}

impl IdentityClassifier {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn classify(&self, id: i64) -> IdentityClass {
        if id < self.threshold {
            IdentityClass::Persisted
        } else {
            IdentityClass::Provisional
        }
    }

    pub fn is_persisted(&self, id: i64) -> bool {
        self.classify(id) == IdentityClass::Persisted
    }
}

impl Default for IdentityClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_THRESHOLD)
    }
}

/// Mints provisional ids from the wall clock.
///
/// Ids are strictly increasing within one minter, even if the clock stalls
/// or steps backwards, and never fall below the classifier's threshold.
#[derive(Debug)]
pub struct ProvisionalIdMinter {
    floor: i64,
    last: AtomicI64,
}

impl ProvisionalIdMinter {
    pub fn new(classifier: IdentityClassifier) -> Self {
        Self {
            floor: classifier.threshold(),
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Mint an id from the current time.
    pub fn mint(&self) -> i64 {
        self.mint_at(Utc::now().timestamp_millis())
    }

    /// Mint an id as if the clock read `now_millis`.
    pub fn mint_at(&self, now_millis: i64) -> i64 {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(last.saturating_add(1)).max(self.floor);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }
}
