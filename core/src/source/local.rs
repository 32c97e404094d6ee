// In-process event source
use super::{FocusHandler, FocusSource, KeyHandler, KeySource, SubscriptionHandle};
use crate::event::{AccessibleElement, KeyEvent};
use crate::{NarratorError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Focus and key source driven from inside the process.
///
/// Anything that can observe focus or keys (a test, a script reader, a
/// platform hook running on its own thread) calls `emit_focus` / `emit_key`
/// and every registered handler is invoked synchronously.
#[derive(Default)]
pub struct LocalEventSource {
    focus_handlers: DashMap<SubscriptionHandle, FocusHandler>,
    key_handlers: DashMap<SubscriptionHandle, KeyHandler>,
    refuse_subscriptions: AtomicBool,
}

impl LocalEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make further subscription attempts fail, as an unavailable
    /// accessibility service would.
    pub fn refuse_subscriptions(&self, refuse: bool) {
        self.refuse_subscriptions.store(refuse, Ordering::SeqCst);
    }

    /// Deliver a focus change to every subscriber. Returns the number of
    /// handlers invoked.
    pub fn emit_focus(&self, element: Arc<dyn AccessibleElement>) -> usize {
        let handlers: Vec<FocusHandler> =
            self.focus_handlers.iter().map(|e| Arc::clone(e.value())).collect();
        for h in &handlers {
            h(Arc::clone(&element));
        }
        handlers.len()
    }

    pub fn emit_key(&self, event: KeyEvent) -> usize {
        let handlers: Vec<KeyHandler> =
            self.key_handlers.iter().map(|e| Arc::clone(e.value())).collect();
        for h in &handlers {
            h(event.clone());
        }
        handlers.len()
    }

    pub fn focus_subscribers(&self) -> usize {
        self.focus_handlers.len()
    }

    pub fn key_subscribers(&self) -> usize {
        self.key_handlers.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.refuse_subscriptions.load(Ordering::SeqCst) {
            return Err(NarratorError::Subscription(
                "event source is not accepting subscriptions".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FocusSource for LocalEventSource {
    async fn subscribe(&self, handler: FocusHandler) -> Result<SubscriptionHandle> {
        self.check_available()?;
        let handle = SubscriptionHandle::new("focus");
        self.focus_handlers.insert(handle.clone(), handler);
        info!(target: "source", subscription = %handle, "Focus handler registered");
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()> {
        if self.focus_handlers.remove(handle).is_none() {
            debug!(target: "source", subscription = %handle, "Unknown focus subscription");
        }
        info!(target: "source", subscription = %handle, "Focus handler removed");
        Ok(())
    }
}

#[async_trait]
impl KeySource for LocalEventSource {
    async fn on_key_press(&self, handler: KeyHandler) -> Result<()> {
        self.check_available()?;
        let handle = SubscriptionHandle::new("key");
        self.key_handlers.insert(handle.clone(), handler);
        info!(target: "source", subscription = %handle, "Key handler registered");
        Ok(())
    }
}
