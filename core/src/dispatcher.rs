//! Event dispatcher.
//!
//! Bridges the focus and key sources into the announcers. Source callbacks
//! only post a `Notification` into an unbounded inbox, so a source is never
//! blocked and nothing is dropped. `pump` drains the inbox one message at a
//! time until the shutdown flag is raised, then removes the focus
//! subscription before returning.

use crate::announcer::{FocusAnnouncer, KeyAnnouncer};
use crate::event::{AccessibleElement, KeyEvent};
use crate::source::{FocusHandler, FocusSource, KeyHandler, KeySource, SubscriptionHandle};
use crate::{NarratorError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Raw message delivered by a source
pub enum Notification {
    Focus(Arc<dyn AccessibleElement>),
    Key(KeyEvent),
}

pub struct EventDispatcher {
    focus_source: Arc<dyn FocusSource>,
    key_source: Arc<dyn KeySource>,
    focus: Arc<FocusAnnouncer>,
    keys: Arc<KeyAnnouncer>,
    inbox_tx: mpsc::UnboundedSender<Notification>,
    inbox_rx: mpsc::UnboundedReceiver<Notification>,
    subscription: Option<SubscriptionHandle>,
    keys_registered: bool,
}

impl EventDispatcher {
    pub fn new(
        focus_source: Arc<dyn FocusSource>,
        key_source: Arc<dyn KeySource>,
        focus: Arc<FocusAnnouncer>,
        keys: Arc<KeyAnnouncer>,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            focus_source,
            key_source,
            focus,
            keys,
            inbox_tx,
            inbox_rx,
            subscription: None,
            keys_registered: false,
        }
    }

    /// Register with both sources. Calling again registers nothing new.
    pub async fn start(&mut self) -> Result<()> {
        if self.subscription.is_none() {
            let tx = self.inbox_tx.clone();
            let handler: FocusHandler = Arc::new(move |element| {
                if tx.send(Notification::Focus(element)).is_err() {
                    debug!(target: "dispatcher", "Inbox closed; focus event ignored");
                }
            });
            let handle = self
                .focus_source
                .subscribe(handler)
                .await
                .map_err(as_subscription_error)?;
            info!(target: "dispatcher", subscription = %handle, "Subscribed to focus changes");
            self.subscription = Some(handle);
        }

        if !self.keys_registered {
            let tx = self.inbox_tx.clone();
            let handler: KeyHandler = Arc::new(move |event| {
                if tx.send(Notification::Key(event)).is_err() {
                    debug!(target: "dispatcher", "Inbox closed; key event ignored");
                }
            });
            if let Err(e) = self.key_source.on_key_press(handler).await {
                // Leave nothing half-registered behind
                self.unsubscribe_focus().await;
                return Err(as_subscription_error(e));
            }
            info!(target: "dispatcher", "Listening for key presses");
            self.keys_registered = true;
        }
        Ok(())
    }

    /// Service the inbox until `shutdown` becomes true. The focus
    /// subscription is removed on every exit path.
    pub async fn pump(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        if self.subscription.is_none() {
            return Err(NarratorError::Dispatcher(
                "pump called before start".into(),
            ));
        }

        info!(target: "dispatcher", "Message pump running");
        loop {
            if *shutdown.borrow() {
                info!(target: "dispatcher", "Shutdown requested");
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        warn!(target: "dispatcher", "Shutdown signal dropped; stopping pump");
                        break;
                    }
                }
                msg = self.inbox_rx.recv() => match msg {
                    Some(n) => self.dispatch(n),
                    None => break,
                },
            }
        }

        self.unsubscribe_focus().await;
        info!(target: "dispatcher", "Message pump stopped");
        Ok(())
    }

    /// Handle one notification. Faults are contained here.
    pub fn dispatch(&self, notification: Notification) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match notification {
            Notification::Focus(element) => {
                self.focus.on_focus_changed(element.as_ref());
            }
            Notification::Key(event) => {
                self.keys.on_key_pressed(&event);
            }
        }));
        if let Err(payload) = outcome {
            error!(
                target: "dispatcher",
                fault = %panic_message(payload.as_ref()),
                "Event handler fault; continuing"
            );
        }
    }

    pub fn is_started(&self) -> bool {
        self.subscription.is_some() && self.keys_registered
    }

    pub fn subscription(&self) -> Option<&SubscriptionHandle> {
        self.subscription.as_ref()
    }

    async fn unsubscribe_focus(&mut self) {
        if let Some(handle) = self.subscription.take() {
            match self.focus_source.unsubscribe(&handle).await {
                Ok(()) => info!(target: "dispatcher", subscription = %handle, "Unsubscribed from focus changes"),
                Err(e) => error!(target: "dispatcher", subscription = %handle, error = %e, "Failed to unsubscribe"),
            }
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        // Reached only when the pump never finished (never run, or its
        // future was dropped mid-await).
        if let Some(handle) = self.subscription.take() {
            let source = Arc::clone(&self.focus_source);
            match tokio::runtime::Handle::try_current() {
                Ok(rt) => {
                    rt.spawn(async move {
                        if let Err(e) = source.unsubscribe(&handle).await {
                            error!(target: "dispatcher", subscription = %handle, error = %e, "Failed to unsubscribe");
                        }
                    });
                }
                Err(_) => {
                    warn!(target: "dispatcher", subscription = %handle, "No runtime to unsubscribe on drop")
                }
            }
        }
    }
}

fn as_subscription_error(e: NarratorError) -> NarratorError {
    match e {
        NarratorError::Subscription(_) => e,
        other => NarratorError::Subscription(other.to_string()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
