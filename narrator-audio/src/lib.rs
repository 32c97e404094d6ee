//! Speech back-ends for the narrator pipeline.
//!
//! Each back-end implements `narrator_core::Speaker` on top of a local CLI
//! engine, with graceful degradation:
//! - Prefer Piper (higher quality, requires a voice model)
//! - Fallback to espeak-ng (widely available)
//! - If neither is present, log the text and return OK
//!
//! Env overrides:
//! - PIPER_BIN, PIPER_VOICE, PIPER_VOICE_DIR
//! - ESPEAK_BIN
//! - TTS_TEMP_DIR, TTS_PLAYER

pub(crate) mod utils;

pub mod espeak;
pub mod fallback;
pub mod piper;

pub use espeak::EspeakSpeaker;
pub use fallback::LogSpeaker;
pub use piper::PiperSpeaker;

use narrator_core::Speaker;
use std::path::PathBuf;
use tracing::{info, warn};
use utils::get_from_env_or_path;

#[derive(Clone, Debug)]
pub struct TtsConfig {
    pub temp_dir: PathBuf,
    pub piper_bin: Option<PathBuf>,
    pub piper_voice: Option<PathBuf>,
    pub piper_voice_dir: Option<PathBuf>,
    pub espeak_bin: Option<PathBuf>,
    /// aplay | paplay | ffplay
    pub player: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::var("TTS_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            piper_bin: get_from_env_or_path("PIPER_BIN", "piper"),
            piper_voice: std::env::var("PIPER_VOICE").ok().map(PathBuf::from),
            piper_voice_dir: std::env::var("PIPER_VOICE_DIR").ok().map(PathBuf::from),
            espeak_bin: get_from_env_or_path("ESPEAK_BIN", "espeak-ng")
                .or_else(|| utils::get_from_path("espeak")),
            player: std::env::var("TTS_PLAYER").ok().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Piper,
    Espeak,
    LogOnly,
}

/// Piper needs a binary plus at least one voice model
pub fn select_engine(cfg: &TtsConfig) -> EngineKind {
    let has_model = cfg.piper_voice.is_some()
        || cfg
            .piper_voice_dir
            .as_deref()
            .and_then(piper::first_model)
            .is_some();
    if cfg.piper_bin.is_some() && has_model {
        return EngineKind::Piper;
    }
    if cfg.espeak_bin.is_some() {
        return EngineKind::Espeak;
    }
    EngineKind::LogOnly
}

/// Build the best available speaker. Configure it before sharing it.
pub fn detect_speaker(cfg: &TtsConfig) -> Box<dyn Speaker> {
    match (select_engine(cfg), &cfg.piper_bin, &cfg.espeak_bin) {
        (EngineKind::Piper, Some(bin), _) => {
            info!(target: "tts", bin = ?bin, "Using Piper");
            Box::new(PiperSpeaker::new(bin.clone(), cfg.clone()))
        }
        (EngineKind::Espeak, _, Some(bin)) => {
            info!(target: "tts", bin = ?bin, "Using espeak-ng");
            Box::new(EspeakSpeaker::new(bin.clone()))
        }
        _ => {
            warn!(target: "tts", "No TTS engine detected. Printing only.");
            Box::new(LogSpeaker::new())
        }
    }
}
