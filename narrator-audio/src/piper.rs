//! Piper back-end: synthesize to a temporary WAV, then play it.

use crate::utils::{gen_id, get_from_path};
use crate::TtsConfig;
use narrator_core::{NarratorError, Result, Speaker, VoiceDescriptor, VoiceSettings};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

const DEFAULT_RATE_WPM: f32 = 180.0;

pub struct PiperSpeaker {
    bin: PathBuf,
    cfg: TtsConfig,
    settings: VoiceSettings,
    voice_path: Option<PathBuf>,
}

impl PiperSpeaker {
    pub fn new(bin: PathBuf, cfg: TtsConfig) -> Self {
        // Without an explicit model the first one in the voice dir is the default
        let voice_path = cfg
            .piper_voice
            .clone()
            .or_else(|| cfg.piper_voice_dir.as_deref().and_then(first_model));
        Self {
            bin,
            cfg,
            settings: VoiceSettings {
                rate: DEFAULT_RATE_WPM as u32,
                volume: 1.0,
                voice_id: None,
            },
            voice_path,
        }
    }

    /// Model used for synthesis, if any
    pub fn voice_model(&self) -> Option<&Path> {
        self.voice_path.as_deref()
    }

    /// Piper speaks slower as length_scale grows
    pub fn length_scale(&self) -> f32 {
        let rate = self.settings.rate.max(1) as f32;
        (DEFAULT_RATE_WPM / rate).clamp(0.5, 2.0)
    }

    fn resolve_voice(&self, voice: &str) -> Option<PathBuf> {
        let vh = PathBuf::from(voice);
        if vh.exists() {
            return Some(vh);
        }
        let dir = self.cfg.piper_voice_dir.as_ref()?;
        let candidate = dir.join(voice);
        if candidate.exists() {
            return Some(candidate);
        }
        let with_ext = dir.join(format!("{}.onnx", voice));
        if with_ext.exists() {
            return Some(with_ext);
        }
        None
    }

    fn synthesize(&self, text: &str, out_wav: &Path) -> Result<()> {
        let voice_path = self.voice_path.as_ref().ok_or_else(|| {
            NarratorError::SpeechEngine("Piper voice not found; set PIPER_VOICE or a voice id".into())
        })?;

        let mut cmd = Command::new(&self.bin);
        cmd.arg("-m").arg(voice_path);
        cmd.arg("-f").arg(out_wav);
        cmd.arg("--length_scale")
            .arg(format!("{:.2}", self.length_scale()));
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(target: "tts", command = ?cmd, "Running piper");
        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "Piper failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    fn play(&self, wav_path: &Path) -> Result<()> {
        let Some(player) = select_player(self.cfg.player.as_deref()) else {
            return Err(NarratorError::SpeechEngine(
                "no audio player found (aplay, paplay or ffplay)".into(),
            ));
        };
        let status = match player.file_name().and_then(|s| s.to_str()).unwrap_or("") {
            "ffplay" => Command::new(&player)
                .arg("-autoexit")
                .arg("-nodisp")
                .arg("-loglevel")
                .arg("quiet")
                .arg(wav_path)
                .status()?,
            _ => Command::new(&player).arg(wav_path).status()?,
        };
        if !status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "{} exited with {}",
                player.display(),
                status
            )));
        }
        Ok(())
    }
}

impl Speaker for PiperSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let wav_path = self.cfg.temp_dir.join(format!("narrator_{}.wav", gen_id()));
        let result = self.synthesize(text, &wav_path).and_then(|_| {
            if (self.settings.volume - 1.0).abs() > f32::EPSILON {
                if let Err(e) = scale_wav_pcm16_inplace(&wav_path, self.settings.volume) {
                    warn!(target: "tts", error = %e, "Failed to scale volume for WAV");
                }
            }
            self.play(&wav_path)
        });
        if wav_path.exists() {
            if let Err(e) = fs::remove_file(&wav_path) {
                debug!(target: "tts", path = ?wav_path, error = %e, "Could not remove WAV");
            }
        }
        result
    }

    fn configure(&mut self, settings: VoiceSettings) -> Result<()> {
        if let Some(voice) = settings.voice_id.as_deref() {
            match self.resolve_voice(voice) {
                Some(p) => {
                    info!(target: "tts", voice = ?p, "Piper voice selected");
                    self.voice_path = Some(p);
                }
                None => warn!(target: "tts", voice = %voice, "Piper voice not found; keeping default"),
            }
        }
        self.settings = settings;
        Ok(())
    }

    fn list_voices(&self) -> Result<Vec<VoiceDescriptor>> {
        let Some(dir) = self.cfg.piper_voice_dir.as_ref() else {
            return Ok(self
                .voice_path
                .as_deref()
                .and_then(voice_from_model)
                .into_iter()
                .collect());
        };
        let mut voices: Vec<VoiceDescriptor> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_model(p))
            .filter_map(|p| voice_from_model(&p))
            .collect();
        voices.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(voices)
    }
}

/// Alphabetically first `*.onnx` model in `dir`
pub(crate) fn first_model(dir: &Path) -> Option<PathBuf> {
    let mut models: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_model(p))
        .collect();
    models.sort();
    models.into_iter().next()
}

fn is_model(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|x| x.to_str()) == Some("onnx")
}

/// Piper models are named `<lang>_<REGION>-<name>-<quality>.onnx`
fn voice_from_model(path: &Path) -> Option<VoiceDescriptor> {
    let stem = path.file_stem()?.to_str()?.to_string();
    let language = stem.split('-').next().unwrap_or_default().to_string();
    let name = stem.split('-').skip(1).collect::<Vec<_>>().join(" ");
    Some(VoiceDescriptor {
        id: stem.clone(),
        name: if name.is_empty() { stem } else { name },
        language,
    })
}

fn select_player(pref: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = pref.and_then(get_from_path) {
        return Some(p);
    }
    get_from_path("aplay")
        .or_else(|| get_from_path("paplay"))
        .or_else(|| get_from_path("ffplay"))
}

/// Scale 16-bit PCM samples of a RIFF/WAVE file in place
pub fn scale_wav_pcm16_inplace(path: &Path, gain: f32) -> std::io::Result<()> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;

    if buf.len() < 12 || &buf[0..4] != b"RIFF" || &buf[8..12] != b"WAVE" {
        return Ok(());
    }
    let mut idx = 12;
    let mut data = None;
    while idx + 8 <= buf.len() {
        let chunk_id = &buf[idx..idx + 4];
        let sz =
            u32::from_le_bytes([buf[idx + 4], buf[idx + 5], buf[idx + 6], buf[idx + 7]]) as usize;
        if chunk_id == b"data" {
            let start = idx + 8;
            data = Some((start, (start + sz).min(buf.len())));
            break;
        }
        idx += 8 + sz;
    }
    if let Some((start, end)) = data {
        for chunk in buf[start..end].chunks_exact_mut(2) {
            let s = i16::from_le_bytes([chunk[0], chunk[1]]);
            let scaled = (s as f32 * gain).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            chunk.copy_from_slice(&scaled.to_le_bytes());
        }
        let mut out = File::create(path)?;
        out.write_all(&buf)?;
    }
    Ok(())
}
