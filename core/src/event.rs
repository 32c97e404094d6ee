// Event model shared by sources, announcers and the speech queue
use crate::Result;

/// A UI element that received keyboard focus.
///
/// Attributes are read on demand; the element may have disappeared between
/// the notification and the read, in which case the read fails with
/// `NarratorError::TransientAttribute`.
pub trait AccessibleElement: Send + Sync {
    /// Localized control type label ("Button", "Edit", ...)
    fn control_type(&self) -> Result<String>;

    /// Accessible name, if the element has one
    fn name(&self) -> Result<Option<String>>;
}

/// Resolved focus snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub control_type: String,
    pub name: Option<String>,
}

impl FocusEvent {
    pub fn new(control_type: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            control_type: control_type.into(),
            name: if name.is_empty() { None } else { Some(name) },
        }
    }
}

impl AccessibleElement for FocusEvent {
    fn control_type(&self) -> Result<String> {
        Ok(self.control_type.clone())
    }

    fn name(&self) -> Result<Option<String>> {
        Ok(self.name.clone())
    }
}

/// One physical key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Single printable character or a named key such as "space" or "enter"
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Producer of a speech request; only consulted by the queue overflow policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnouncementKind {
    Focus,
    Key,
    System,
}

/// Text handed to the speaker exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub kind: AnnouncementKind,
}

impl SpeechRequest {
    pub fn focus(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AnnouncementKind::Focus,
        }
    }

    pub fn key(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AnnouncementKind::Key,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AnnouncementKind::System,
        }
    }
}
