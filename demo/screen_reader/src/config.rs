use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use narrator_audio::TtsConfig;
use narrator_core::{QueueConfig, VoiceSettings};

/// High-level configuration for the screen reader
#[derive(Clone, Debug)]
pub struct ScreenReaderConfig {
    pub queue: QueueConfig,
    pub voice: VoiceSettings,
    /// Voice is chosen by matching these against voice ids and names
    pub voice_tags: Vec<String>,
    pub tts: TtsConfig,
    /// Extra or replacement key names
    pub keys: HashMap<String, String>,
    /// Spoken once at startup
    pub greeting: Option<String>,
}

impl Default for ScreenReaderConfig {
    fn default() -> Self {
        let tags = std::env::var("NARRATOR_VOICE_TAGS").unwrap_or_else(|_| "ko_,korean".into());
        Self {
            queue: QueueConfig::default(),
            voice: VoiceSettings::default(),
            voice_tags: split_tags(&tags),
            tts: TtsConfig::default(),
            keys: HashMap::new(),
            greeting: Some("스크린리더 초기화 완료".into()),
        }
    }
}

impl ScreenReaderConfig {
    /// Load configuration from a TOML file (path via SCREEN_READER_CONFIG or
    /// ./screen_reader.toml), overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path =
            std::env::var("SCREEN_READER_CONFIG").unwrap_or_else(|_| "screen_reader.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "screen_reader", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "screen_reader", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "screen_reader", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        toml::from_str::<ScreenReaderToml>(s).map(|t| t.overlay(base))
    }
}

fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ScreenReaderToml {
    pub greeting: Option<String>,
    pub queue: Option<QueueConfig>,
    pub speech: Option<SpeechToml>,
    pub keys: Option<HashMap<String, String>>,
}

impl ScreenReaderToml {
    fn overlay(self, mut base: ScreenReaderConfig) -> ScreenReaderConfig {
        if let Some(g) = self.greeting {
            // An empty greeting turns it off
            base.greeting = if g.trim().is_empty() { None } else { Some(g) };
        }
        if let Some(q) = self.queue {
            base.queue.capacity = q.capacity.max(1);
        }
        if let Some(s) = self.speech {
            s.apply(&mut base);
        }
        if let Some(k) = self.keys {
            base.keys.extend(k);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct SpeechToml {
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub voice: Option<String>,
    pub voice_tags: Option<Vec<String>>,
    pub espeak_bin: Option<PathBuf>,
    pub piper_bin: Option<PathBuf>,
    pub piper_voice: Option<PathBuf>,
    pub piper_voice_dir: Option<PathBuf>,
    pub player: Option<String>,
    pub temp_dir: Option<PathBuf>,
}
impl SpeechToml {
    fn apply(self, c: &mut ScreenReaderConfig) {
        if let Some(x) = self.rate {
            c.voice.rate = x;
        }
        if let Some(x) = self.volume {
            c.voice.volume = x.clamp(0.0, 1.0);
        }
        if let Some(x) = self.voice {
            c.voice.voice_id = Some(x);
        }
        if let Some(x) = self.voice_tags {
            c.voice_tags = x
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(x) = self.espeak_bin {
            c.tts.espeak_bin = Some(x);
        }
        if let Some(x) = self.piper_bin {
            c.tts.piper_bin = Some(x);
        }
        if let Some(x) = self.piper_voice {
            c.tts.piper_voice = Some(x);
        }
        if let Some(x) = self.piper_voice_dir {
            c.tts.piper_voice_dir = Some(x);
        }
        if let Some(x) = self.player {
            c.tts.player = Some(x);
        }
        if let Some(x) = self.temp_dir {
            c.tts.temp_dir = x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ScreenReaderConfig {
        ScreenReaderConfig {
            queue: QueueConfig { capacity: 32 },
            voice: VoiceSettings {
                rate: 180,
                volume: 1.0,
                voice_id: None,
            },
            voice_tags: vec!["ko_".into(), "korean".into()],
            tts: TtsConfig {
                temp_dir: PathBuf::from("/tmp"),
                piper_bin: None,
                piper_voice: None,
                piper_voice_dir: None,
                espeak_bin: None,
                player: None,
            },
            keys: HashMap::new(),
            greeting: Some("hello".into()),
        }
    }

    #[test]
    fn toml_overlays_defaults() {
        let cfg = ScreenReaderConfig::from_toml_str(
            r#"
greeting = ""

[queue]
capacity = 8

[speech]
rate = 220
volume = 3.0
voice_tags = ["EN", " "]
espeak_bin = "/opt/espeak/bin/espeak-ng"

[keys]
enter = "리턴"
f1 = "도움말"
"#,
            base(),
        )
        .unwrap();

        assert_eq!(cfg.greeting, None);
        assert_eq!(cfg.queue.capacity, 8);
        assert_eq!(cfg.voice.rate, 220);
        assert_eq!(cfg.voice.volume, 1.0);
        assert_eq!(cfg.voice_tags, vec!["en"]);
        assert_eq!(cfg.tts.espeak_bin, Some(PathBuf::from("/opt/espeak/bin/espeak-ng")));
        assert_eq!(cfg.keys.get("f1").map(String::as_str), Some("도움말"));
    }

    #[test]
    fn queue_section_deserializes_into_queue_config() {
        let cfg = ScreenReaderConfig::from_toml_str("[queue]\ncapacity = 0\n", base()).unwrap();
        assert_eq!(cfg.queue.capacity, 1);
    }

    #[test]
    fn empty_toml_keeps_base() {
        let cfg = ScreenReaderConfig::from_toml_str("", base()).unwrap();
        assert_eq!(cfg.greeting.as_deref(), Some("hello"));
        assert_eq!(cfg.queue.capacity, 32);
        assert!(cfg.keys.is_empty());
    }
}
