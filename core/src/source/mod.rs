//! Event source capabilities.
//!
//! A `FocusSource` delivers accessibility focus changes and a `KeySource`
//! delivers key presses. Handlers are invoked on the source's own thread or
//! task and must return quickly; the dispatcher's handlers only post to its
//! inbox.

mod local;
mod polling;

pub use local::LocalEventSource;
pub use polling::{FocusProbe, PollingConfig, PollingFocusSource};

use crate::event::{AccessibleElement, KeyEvent};
use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type FocusHandler = Arc<dyn Fn(Arc<dyn AccessibleElement>) + Send + Sync>;
pub type KeyHandler = Arc<dyn Fn(KeyEvent) + Send + Sync>;

/// Token returned by `FocusSource::subscribe`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(String);

impl SubscriptionHandle {
    pub fn new(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(format!("sub_{}_{}", prefix, NEXT.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait FocusSource: Send + Sync {
    async fn subscribe(&self, handler: FocusHandler) -> Result<SubscriptionHandle>;

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()>;
}

#[async_trait]
pub trait KeySource: Send + Sync {
    async fn on_key_press(&self, handler: KeyHandler) -> Result<()>;
}
