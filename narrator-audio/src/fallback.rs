use narrator_core::{Result, Speaker, VoiceDescriptor, VoiceSettings};
use tracing::info;

/// Used when no engine is installed: announcements only reach the log
#[derive(Debug, Default)]
pub struct LogSpeaker {
    settings: Option<VoiceSettings>,
}

impl LogSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Option<&VoiceSettings> {
        self.settings.as_ref()
    }
}

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        info!(target: "tts", text = %text, "Speak (no engine)");
        Ok(())
    }

    fn configure(&mut self, settings: VoiceSettings) -> Result<()> {
        self.settings = Some(settings);
        Ok(())
    }

    fn list_voices(&self) -> Result<Vec<VoiceDescriptor>> {
        Ok(Vec::new())
    }
}
