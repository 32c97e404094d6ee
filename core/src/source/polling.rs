// Polling fallback for platforms without push focus notifications
use super::{FocusHandler, FocusSource, SubscriptionHandle};
use crate::event::AccessibleElement;
use crate::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Reads whichever element currently has focus
pub trait FocusProbe: Send + Sync + 'static {
    fn focused(&self) -> Result<Option<Arc<dyn AccessibleElement>>>;
}

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: std::env::var("NARRATOR_POLL_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(500),
        }
    }
}

/// Delivers the focused element to subscribers on every tick.
///
/// Repeats are expected; `FocusAnnouncer` suppresses them.
pub struct PollingFocusSource<P: FocusProbe> {
    probe: Arc<P>,
    cfg: PollingConfig,
    tasks: DashMap<SubscriptionHandle, JoinHandle<()>>,
}

impl<P: FocusProbe> PollingFocusSource<P> {
    pub fn new(probe: P, cfg: PollingConfig) -> Self {
        Self {
            probe: Arc::new(probe),
            cfg,
            tasks: DashMap::new(),
        }
    }

    pub fn active_polls(&self) -> usize {
        self.tasks.len()
    }
}

#[async_trait]
impl<P: FocusProbe> FocusSource for PollingFocusSource<P> {
    async fn subscribe(&self, handler: FocusHandler) -> Result<SubscriptionHandle> {
        let handle = SubscriptionHandle::new("poll");
        let probe = Arc::clone(&self.probe);
        let period = Duration::from_millis(self.cfg.interval_ms);

        let join = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let p = Arc::clone(&probe);
                match task::spawn_blocking(move || p.focused()).await {
                    Ok(Ok(Some(element))) => handler(element),
                    Ok(Ok(None)) => debug!(target: "source", "Nothing focused"),
                    Ok(Err(e)) => warn!(target: "source", error = %e, "Focus probe failed"),
                    Err(e) => warn!(target: "source", error = %e, "Focus probe task failed"),
                }
            }
        });

        self.tasks.insert(handle.clone(), join);
        info!(
            target: "source",
            subscription = %handle,
            interval_ms = self.cfg.interval_ms,
            "Polling focus every interval"
        );
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()> {
        if let Some((_, join)) = self.tasks.remove(handle) {
            join.abort();
            info!(target: "source", subscription = %handle, "Focus polling stopped");
        }
        Ok(())
    }
}

impl<P: FocusProbe> Drop for PollingFocusSource<P> {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
    }
}
