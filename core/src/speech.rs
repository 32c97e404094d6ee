//! Speech output capability.
//!
//! A `Speaker` wraps a synthesis engine. `speak` blocks until playback has
//! finished, so callers run it off the async executor (see `SpeechWorker`).

use crate::Result;
use tracing::info;

/// Voice advertised by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDescriptor {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Engine tuning applied once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// Words per minute
    pub rate: u32,
    /// 0.0 - 1.0
    pub volume: f32,
    /// Engine-specific voice id; `None` keeps the engine default
    pub voice_id: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: std::env::var("NARRATOR_RATE")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(180),
            volume: std::env::var("NARRATOR_VOLUME")
                .ok()
                .and_then(|s| s.parse::<f32>().ok())
                .map(|v| v.clamp(0.0, 1.0))
                .unwrap_or(1.0),
            voice_id: std::env::var("NARRATOR_VOICE").ok().filter(|s| !s.is_empty()),
        }
    }
}

pub trait Speaker: Send + Sync {
    /// Speak `text`, returning once playback completes.
    fn speak(&self, text: &str) -> Result<()>;

    fn configure(&mut self, settings: VoiceSettings) -> Result<()>;

    fn list_voices(&self) -> Result<Vec<VoiceDescriptor>>;
}

/// Pick the first voice whose id contains one of `tags`, or whose name does
/// (case-insensitive). `None` means the engine default should be kept.
pub fn select_voice<'a>(voices: &'a [VoiceDescriptor], tags: &[String]) -> Option<&'a VoiceDescriptor> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        return None;
    }

    let found = voices.iter().find(|v| {
        let id = v.id.to_lowercase();
        let name = v.name.to_lowercase();
        tags.iter().any(|t| id.contains(t.as_str()) || name.contains(t.as_str()))
    });

    match found {
        Some(v) => info!(target: "speech", voice = %v.name, id = %v.id, "Selected voice"),
        None => info!(target: "speech", tags = ?tags, "No matching voice; using engine default"),
    }
    found
}
