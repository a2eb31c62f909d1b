//! Background refresh bookkeeping
//!
//! Fresh-path reads return immediately and refresh the slot in a spawned
//! task. This module tracks those tasks so they can be awaited, keeps at most
//! one in flight, and reports what happened over an optional channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Messages sent from background refreshes to whoever listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMessage {
    /// A background refresh was spawned
    RefreshStarted,
    /// The slot now holds a payload produced at this time
    PayloadUpdated { fetched_at_epoch_millis: i64 },
    /// The fetch failed; the slot was left untouched
    RefreshFailed(String),
    /// A refresh was already in flight, so none was spawned
    RefreshSkipped,
}

/// Tracks background refresh tasks for one cache
#[derive(Debug, Default)]
pub struct BackgroundRefresh {
    in_flight: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    events: Option<mpsc::Sender<RefreshMessage>>,
}

impl BackgroundRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report refresh outcomes on `events`
    pub fn with_events(mut self, events: mpsc::Sender<RefreshMessage>) -> Self {
        self.events = Some(events);
        self
    }

    /// Claims the single in-flight slot
    ///
    /// Returns `None` if a refresh is already running. The slot is released
    /// when the returned guard drops.
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// A sender that background tasks can carry
    pub fn notifier(&self) -> Notifier {
        Notifier {
            events: self.events.clone(),
        }
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.lock_tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Waits until every tracked refresh has finished
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = std::mem::take(&mut *self.lock_tasks());
            if pending.is_empty() {
                return;
            }
            for result in futures::future::join_all(pending).await {
                if let Err(e) = result {
                    warn!(error = %e, "background refresh task did not complete");
                }
            }
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the in-flight slot on drop
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Cloneable handle for emitting [`RefreshMessage`]s
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    events: Option<mpsc::Sender<RefreshMessage>>,
}

impl Notifier {
    /// Sends without waiting; messages are dropped if the listener is
    /// gone or lagging.
    pub fn send(&self, message: RefreshMessage) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_refresh_can_be_in_flight() {
        let refresh = BackgroundRefresh::new();

        let guard = refresh.try_begin().expect("first claim succeeds");
        assert!(refresh.is_in_flight());
        assert!(refresh.try_begin().is_none());

        drop(guard);
        assert!(!refresh.is_in_flight());
        assert!(refresh.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_settle_waits_for_tracked_tasks() {
        let refresh = BackgroundRefresh::new();
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        refresh.track(tokio::spawn(async move {
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        }));

        refresh.settle().await;
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_settle_with_nothing_tracked_returns() {
        BackgroundRefresh::new().settle().await;
    }

    #[tokio::test]
    async fn test_notifier_delivers_to_listener() {
        let (tx, mut rx) = mpsc::channel(4);
        let refresh = BackgroundRefresh::new().with_events(tx);

        refresh.notifier().send(RefreshMessage::RefreshStarted);

        assert_eq!(rx.try_recv().ok(), Some(RefreshMessage::RefreshStarted));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notifier_without_listener_is_silent() {
        Notifier::default().send(RefreshMessage::RefreshSkipped);
    }
}
