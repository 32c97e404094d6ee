use crate::event::{AccessibleElement, SpeechRequest};
use crate::queue::AnnouncementQueue;
use crate::Result;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of handling one focus notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Phrase was forwarded to the queue
    Announced(String),
    /// Same phrase as the last announcement
    Duplicate,
    /// Neither control type nor name produced any text
    Empty,
    /// Attributes could not be read
    Failed,
    /// Queue is closed; the last announcement is left as it was
    Rejected,
}

#[derive(Debug, Default)]
struct AnnouncementState {
    last_spoken_focus_text: String,
}

/// Turns focus changes into deduplicated speech requests
pub struct FocusAnnouncer {
    queue: AnnouncementQueue,
    state: Mutex<AnnouncementState>,
}

impl FocusAnnouncer {
    pub fn new(queue: AnnouncementQueue) -> Self {
        Self {
            queue,
            state: Mutex::new(AnnouncementState::default()),
        }
    }

    pub fn on_focus_changed(&self, element: &dyn AccessibleElement) -> FocusOutcome {
        let phrase = match read_phrase(element) {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!(target: "focus", "Focused element has no type or name");
                return FocusOutcome::Empty;
            }
            Err(e) => {
                warn!(target: "focus", error = %e, "Dropping focus event");
                return FocusOutcome::Failed;
            }
        };

        // Compare, update and forward under one lock so two events with the
        // same phrase can never both reach the queue.
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if state.last_spoken_focus_text == phrase {
            debug!(target: "focus", text = %phrase, "Duplicate focus announcement suppressed");
            return FocusOutcome::Duplicate;
        }
        if !self.queue.enqueue(SpeechRequest::focus(phrase.clone())) {
            return FocusOutcome::Rejected;
        }
        info!(target: "focus", text = %phrase, "Focus changed");
        state.last_spoken_focus_text = phrase.clone();
        FocusOutcome::Announced(phrase)
    }

    pub fn last_spoken(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last_spoken_focus_text
            .clone()
    }

    /// Forget the last announcement so the current focus is spoken again
    pub fn reset(&self) {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last_spoken_focus_text
            .clear();
    }
}

fn read_phrase(element: &dyn AccessibleElement) -> Result<Option<String>> {
    let control_type = element.control_type()?;
    let name = element.name()?.unwrap_or_default();
    Ok(compose_phrase(&control_type, &name))
}

pub(crate) fn compose_phrase(control_type: &str, name: &str) -> Option<String> {
    let text = if name.is_empty() {
        control_type.to_string()
    } else {
        format!("{}: {}", control_type, name)
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
