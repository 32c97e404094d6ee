// Announcement queue implementation
use crate::event::{AnnouncementKind, SpeechRequest};
use crate::speech::Speaker;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Queue configuration; missing fields keep their env-driven defaults
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pending requests kept before focus announcements start being evicted
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: std::env::var("NARRATOR_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|c| *c > 0)
                .unwrap_or(32),
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub spoken: u64,
    pub failed: u64,
    pub dropped_focus: u64,
    pub discarded: u64,
    pub rejected: u64,
    pub pending: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<SpeechRequest>,
    closed: bool,
    stats: QueueStats,
}

struct QueueInner {
    state: Mutex<QueueState>,
    ready: Notify,
    capacity: usize,
}

/// FIFO of speech requests with a single consumer.
///
/// `enqueue` never blocks. Past `capacity` the oldest pending focus
/// announcement is evicted; key and system announcements are never dropped.
#[derive(Clone)]
pub struct AnnouncementQueue {
    inner: Arc<QueueInner>,
}

impl AnnouncementQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                ready: Notify::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn from_config(cfg: &QueueConfig) -> Self {
        Self::new(cfg.capacity)
    }

    /// Append a request. Returns `false` if the queue has been closed.
    pub fn enqueue(&self, request: SpeechRequest) -> bool {
        {
            let mut state = self.lock();
            if state.closed {
                state.stats.rejected += 1;
                warn!(target: "speech", text = %request.text, "Queue closed; request rejected");
                return false;
            }

            if state.pending.len() >= self.inner.capacity {
                let oldest_focus = state
                    .pending
                    .iter()
                    .position(|r| r.kind == AnnouncementKind::Focus);
                if let Some(idx) = oldest_focus {
                    if let Some(evicted) = state.pending.remove(idx) {
                        state.stats.dropped_focus += 1;
                        debug!(target: "speech", text = %evicted.text, "Evicted stale focus announcement");
                    }
                }
            }

            state.pending.push_back(request);
            state.stats.enqueued += 1;
            state.stats.pending = state.pending.len();
        }
        self.inner.ready.notify_one();
        true
    }

    /// Wait for the next request. `None` once the queue is closed; anything
    /// still pending at that point is discarded.
    pub async fn next(&self) -> Option<SpeechRequest> {
        loop {
            {
                let mut state = self.lock();
                if state.closed {
                    let discarded = state.pending.len() as u64;
                    if discarded > 0 {
                        state.pending.clear();
                        state.stats.discarded += discarded;
                        state.stats.pending = 0;
                        info!(target: "speech", discarded, "Discarded pending announcements on shutdown");
                    }
                    return None;
                }
                if let Some(req) = state.pending.pop_front() {
                    state.stats.pending = state.pending.len();
                    return Some(req);
                }
            }
            self.inner.ready.notified().await;
        }
    }

    /// Stop accepting requests and wake the consumer
    pub fn close(&self) {
        self.lock().closed = true;
        self.inner.ready.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Snapshot of pending requests in delivery order
    pub fn pending(&self) -> Vec<SpeechRequest> {
        self.lock().pending.iter().cloned().collect()
    }

    pub fn stats(&self) -> QueueStats {
        self.lock().stats.clone()
    }

    fn record(&self, f: impl FnOnce(&mut QueueStats)) {
        f(&mut self.lock().stats);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Dedicated consumer that feeds the speaker one request at a time
pub struct SpeechWorker {
    queue: AnnouncementQueue,
    handle: JoinHandle<()>,
}

impl SpeechWorker {
    pub fn spawn(queue: AnnouncementQueue, speaker: Arc<dyn Speaker>) -> Self {
        let q = queue.clone();
        let handle = tokio::spawn(async move {
            info!(target: "speech", "Speech worker started");
            while let Some(req) = q.next().await {
                if req.text.trim().is_empty() {
                    debug!(target: "speech", "Skipping empty announcement");
                    continue;
                }

                // The next request is not popped until playback returns, so
                // at most one request is ever in flight.
                let spk = Arc::clone(&speaker);
                let text = req.text.clone();
                match task::spawn_blocking(move || spk.speak(&text)).await {
                    Ok(Ok(())) => q.record(|s| s.spoken += 1),
                    Ok(Err(e)) => {
                        q.record(|s| s.failed += 1);
                        warn!(target: "speech", error = %e, text = %req.text, "Speech failed; dropping request");
                    }
                    Err(e) => {
                        q.record(|s| s.failed += 1);
                        warn!(target: "speech", error = %e, text = %req.text, "Speech task aborted; dropping request");
                    }
                }
            }
            info!(target: "speech", "Speech worker stopped");
        });
        Self { queue, handle }
    }

    pub fn queue(&self) -> &AnnouncementQueue {
        &self.queue
    }

    /// Close the queue, let the in-flight request finish and discard the rest
    pub async fn shutdown(self) -> QueueStats {
        self.queue.close();
        if let Err(e) = self.handle.await {
            warn!(target: "speech", error = %e, "Speech worker join failed");
        }
        self.queue.stats()
    }
}
