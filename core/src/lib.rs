// Narrator Core Library
// Focus and keyboard announcement pipeline

pub mod announcer;
pub mod dispatcher;
pub mod event;
pub mod queue;
pub mod source;
pub mod speech;

// Export core types
pub use announcer::{FocusAnnouncer, FocusOutcome, KeyAnnouncer, KeyNameTable};
pub use dispatcher::{EventDispatcher, Notification};
pub use event::{AccessibleElement, AnnouncementKind, FocusEvent, KeyEvent, SpeechRequest};
pub use queue::{AnnouncementQueue, QueueConfig, QueueStats, SpeechWorker};
pub use source::{
    FocusHandler, FocusProbe, FocusSource, KeyHandler, KeySource, LocalEventSource,
    PollingFocusSource, SubscriptionHandle,
};
pub use speech::{select_voice, Speaker, VoiceDescriptor, VoiceSettings};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Attribute read failed: {0}")]
    TransientAttribute(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Speech engine error: {0}")]
    SpeechEngine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatcher error: {0}")]
    Dispatcher(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, NarratorError>;
