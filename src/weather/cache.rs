//! Staleness-aware, offline-first weather cache
//!
//! [`WeatherCache::get_current`] always produces a payload. Depending on
//! connectivity and the age of what is persisted it:
//!
//! | online | persisted | stale | result |
//! |---|---|---|---|
//! | no  | yes | any | persisted payload, no fetch |
//! | no  | no  | -   | synthetic payload (not persisted) |
//! | yes | yes | no  | persisted payload; refresh spawned in the background |
//! | yes | yes | yes | fetch now; persisted payload if the fetch fails |
//! | yes | no  | -   | fetch now; synthetic payload if the fetch fails |
//!
//! Fetch errors never reach the caller. A slot that cannot be read counts as
//! empty, and a failed write is logged without affecting the returned value.

use chrono::{FixedOffset, Offset, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::refresh::{BackgroundRefresh, Notifier, RefreshMessage};
use super::source::{FetchError, WeatherSource};
use super::synthetic::synthetic_payload;
use super::CachedPayload;
use crate::cache::SlotStore;
use crate::clock::Clock;
use crate::connectivity::Connectivity;

pub type PayloadStore = dyn SlotStore<CachedPayload>;

/// The weather cache with its injected collaborators
pub struct WeatherCache {
    store: Arc<PayloadStore>,
    source: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
    connectivity: Arc<dyn Connectivity>,
    /// Farm's shift from UTC; dates synthetic weeks
    utc_offset: FixedOffset,
    refresh: BackgroundRefresh,
}

impl WeatherCache {
    pub fn new(
        store: Arc<PayloadStore>,
        source: Arc<dyn WeatherSource>,
        clock: Arc<dyn Clock>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            store,
            source,
            clock,
            connectivity,
            utc_offset: Utc.fix(),
            refresh: BackgroundRefresh::new(),
        }
    }

    /// Date synthetic weeks from the farm's calendar day instead of UTC's
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Report background refresh outcomes on `events`
    pub fn with_events(mut self, events: mpsc::Sender<RefreshMessage>) -> Self {
        self.refresh = self.refresh.with_events(events);
        self
    }

    /// Current weather, possibly stale, never an error
    ///
    /// Must be called from within a tokio runtime: the fresh path spawns its
    /// refresh with `tokio::spawn`.
    pub async fn get_current(&self) -> CachedPayload {
        let persisted = self.load_persisted();
        let online = self.connectivity.is_online().await;
        let now_millis = self.clock.now_millis();

        match (online, persisted) {
            (false, Some(payload)) => {
                debug!(
                    age_ms = payload.age_millis(now_millis),
                    "offline; serving persisted weather"
                );
                payload
            }
            (false, None) => {
                info!("offline with nothing cached; serving synthetic weather");
                synthetic_payload(self.clock.now(), self.utc_offset)
            }
            (true, Some(payload)) if !payload.is_stale(now_millis) => {
                debug!(
                    age_ms = payload.age_millis(now_millis),
                    "serving cached weather; refreshing in background"
                );
                self.spawn_background_refresh();
                payload
            }
            (true, Some(payload)) => {
                info!(
                    age_ms = payload.age_millis(now_millis),
                    "cached weather is stale; fetching"
                );
                match self.fetch_and_persist().await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(error = %e, "weather fetch failed; serving stale cache");
                        payload
                    }
                }
            }
            (true, None) => {
                info!("no cached weather; fetching");
                match self.fetch_and_persist().await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(error = %e, "weather fetch failed; serving synthetic weather");
                        synthetic_payload(self.clock.now(), self.utc_offset)
                    }
                }
            }
        }
    }

    /// Waits for every outstanding background refresh to finish
    pub async fn settle(&self) {
        self.refresh.settle().await;
    }

    /// Whether a background refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_in_flight()
    }

    /// The persisted payload, if there is a readable, well-formed one
    pub fn load_persisted(&self) -> Option<CachedPayload> {
        match self.store.load() {
            Ok(Some(payload)) if payload.is_valid() => Some(payload),
            Ok(Some(_)) => {
                warn!("persisted weather violates shape invariants; ignoring it");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read weather cache; treating as empty");
                None
            }
        }
    }

    async fn fetch_and_persist(&self) -> Result<CachedPayload, FetchError> {
        let fresh = self.source.fetch().await?;
        persist(self.store.as_ref(), &fresh);
        Ok(fresh)
    }

    fn spawn_background_refresh(&self) {
        let notifier = self.refresh.notifier();
        let Some(guard) = self.refresh.try_begin() else {
            debug!("background weather refresh already in flight");
            notifier.send(RefreshMessage::RefreshSkipped);
            return;
        };

        let store = Arc::clone(&self.store);
        let source = Arc::clone(&self.source);
        notifier.send(RefreshMessage::RefreshStarted);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            background_refresh(store, source.as_ref(), &notifier).await;
        });
        self.refresh.track(handle);
    }
}

async fn background_refresh(store: Arc<PayloadStore>, source: &dyn WeatherSource, notifier: &Notifier) {
    match source.fetch().await {
        Ok(fresh) => {
            let fetched_at_epoch_millis = fresh.fetched_at_epoch_millis;
            // slot writes hit the filesystem; keep them off the async workers
            let stored = tokio::task::spawn_blocking(move || persist(store.as_ref(), &fresh))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "weather cache write task failed");
                    false
                });
            if stored {
                debug!(fetched_at_epoch_millis, "background weather refresh stored");
                notifier.send(RefreshMessage::PayloadUpdated {
                    fetched_at_epoch_millis,
                });
            } else {
                notifier.send(RefreshMessage::RefreshFailed(
                    "could not persist refreshed weather".to_string(),
                ));
            }
        }
        Err(e) => {
            debug!(error = %e, "background weather refresh failed; keeping cache");
            notifier.send(RefreshMessage::RefreshFailed(e.to_string()));
        }
    }
}

/// Replaces the slot; returns whether the write succeeded
fn persist(store: &PayloadStore, payload: &CachedPayload) -> bool {
    match store.save(payload) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not persist weather cache");
            false
        }
    }
}
