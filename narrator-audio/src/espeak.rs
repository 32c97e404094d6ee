//! espeak-ng back-end. espeak plays audio itself, so `speak` just runs the
//! binary and waits for it to exit.

use narrator_core::{NarratorError, Result, Speaker, VoiceDescriptor, VoiceSettings};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

pub struct EspeakSpeaker {
    bin: PathBuf,
    settings: VoiceSettings,
}

impl EspeakSpeaker {
    pub fn new(bin: PathBuf) -> Self {
        Self {
            bin,
            settings: VoiceSettings {
                rate: 180,
                volume: 1.0,
                voice_id: None,
            },
        }
    }

    /// Arguments for one utterance
    pub fn command_args(&self, text: &str) -> Vec<String> {
        let wpm = self.settings.rate.clamp(80, 450);
        let amp = (100.0 * self.settings.volume).round().clamp(0.0, 200.0) as i32;
        let mut args = Vec::new();
        if let Some(voice) = self.settings.voice_id.as_deref().filter(|v| !v.is_empty()) {
            args.push("-v".to_string());
            args.push(voice.to_string());
        }
        args.push("-s".to_string());
        args.push(wpm.to_string());
        args.push("-a".to_string());
        args.push(amp.to_string());
        // End of options, so text starting with '-' is not parsed as a flag
        args.push("--".to_string());
        args.push(text.to_string());
        args
    }
}

impl Speaker for EspeakSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let args = self.command_args(text);
        debug!(target: "tts", bin = ?self.bin, args = ?args, "Running espeak-ng");
        let output = Command::new(&self.bin)
            .args(&args)
            .output()
            .map_err(|e| NarratorError::SpeechEngine(format!("espeak-ng failed to start: {}", e)))?;
        if !output.status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "espeak-ng failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    fn configure(&mut self, settings: VoiceSettings) -> Result<()> {
        self.settings = settings;
        Ok(())
    }

    fn list_voices(&self) -> Result<Vec<VoiceDescriptor>> {
        let output = Command::new(&self.bin).arg("--voices").output()?;
        if !output.status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "espeak-ng --voices failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: Pty, Language, Age/Gender, VoiceName, File, Other Languages.
/// The language code doubles as the id accepted by `-v`.
pub fn parse_voice_list(listing: &str) -> Vec<VoiceDescriptor> {
    listing
        .lines()
        .skip_while(|l| !l.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(VoiceDescriptor {
                id: cols[1].to_string(),
                name: cols[3].replace('_', " "),
                language: cols[1].to_string(),
            })
        })
        .collect()
}
