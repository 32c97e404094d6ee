use narrator_audio::espeak::parse_voice_list;
use narrator_audio::piper::scale_wav_pcm16_inplace;
use narrator_audio::{select_engine, EngineKind, EspeakSpeaker, LogSpeaker, PiperSpeaker, TtsConfig};
use narrator_core::{select_voice, Speaker, VoiceSettings};
use std::path::PathBuf;

const VOICES: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-us           --/M      English_(America)  gmw/en-US            (en 2)
 5  ko              --/M      Korean             ko
 5  ja              --/M      Japanese           jpx/ja
";

fn empty_cfg() -> TtsConfig {
    TtsConfig {
        temp_dir: std::env::temp_dir(),
        piper_bin: None,
        piper_voice: None,
        piper_voice_dir: None,
        espeak_bin: None,
        player: None,
    }
}

#[test]
fn parses_espeak_voice_listing() {
    let voices = parse_voice_list(VOICES);
    assert_eq!(voices.len(), 4);
    assert_eq!(voices[1].id, "en-us");
    assert_eq!(voices[1].name, "English (America)");
    assert_eq!(voices[2].id, "ko");
    assert_eq!(voices[2].name, "Korean");
}

#[test]
fn korean_espeak_voice_is_found_by_name() {
    let voices = parse_voice_list(VOICES);
    let tags = vec!["ko_".to_string(), "korean".to_string()];
    let picked = select_voice(&voices, &tags).expect("korean voice");
    assert_eq!(picked.id, "ko");
}

#[test]
fn espeak_arguments_follow_settings() {
    let mut speaker = EspeakSpeaker::new(PathBuf::from("espeak-ng"));
    speaker
        .configure(VoiceSettings {
            rate: 180,
            volume: 0.5,
            voice_id: Some("ko".into()),
        })
        .unwrap();
    assert_eq!(
        speaker.command_args("버튼: 확인"),
        vec!["-v", "ko", "-s", "180", "-a", "50", "--", "버튼: 확인"]
    );

    speaker
        .configure(VoiceSettings {
            rate: 1000,
            volume: 1.0,
            voice_id: None,
        })
        .unwrap();
    assert_eq!(
        speaker.command_args("-"),
        vec!["-s", "450", "-a", "100", "--", "-"]
    );
}

#[test]
fn piper_rate_maps_to_length_scale() {
    let mut speaker = PiperSpeaker::new(PathBuf::from("piper"), empty_cfg());
    assert!((speaker.length_scale() - 1.0).abs() < 1e-6);

    speaker
        .configure(VoiceSettings {
            rate: 360,
            volume: 1.0,
            voice_id: None,
        })
        .unwrap();
    assert!((speaker.length_scale() - 0.5).abs() < 1e-6);
}

#[test]
fn engine_selection_degrades_gracefully() {
    let mut cfg = empty_cfg();
    assert_eq!(select_engine(&cfg), EngineKind::LogOnly);

    cfg.espeak_bin = Some(PathBuf::from("/usr/bin/espeak-ng"));
    assert_eq!(select_engine(&cfg), EngineKind::Espeak);

    // Piper without any voice model is not usable
    cfg.piper_bin = Some(PathBuf::from("/usr/bin/piper"));
    assert_eq!(select_engine(&cfg), EngineKind::Espeak);

    cfg.piper_voice = Some(PathBuf::from("ko_KR-kss-medium.onnx"));
    assert_eq!(select_engine(&cfg), EngineKind::Piper);
}

#[test]
fn piper_falls_back_to_first_model_when_no_voice_matches() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("en_US-lessac-medium.onnx"), b"")?;

    let mut cfg = empty_cfg();
    cfg.piper_bin = Some(PathBuf::from("/usr/bin/piper"));
    cfg.espeak_bin = Some(PathBuf::from("/usr/bin/espeak-ng"));
    cfg.piper_voice_dir = Some(dir.path().to_path_buf());
    assert_eq!(select_engine(&cfg), EngineKind::Piper);

    let mut speaker = PiperSpeaker::new(PathBuf::from("/usr/bin/piper"), cfg);
    let voices = speaker.list_voices().unwrap();
    let tags = vec!["ko_".to_string(), "korean".to_string()];
    assert!(select_voice(&voices, &tags).is_none());

    speaker
        .configure(VoiceSettings {
            rate: 180,
            volume: 1.0,
            voice_id: None,
        })
        .unwrap();
    assert_eq!(
        speaker.voice_model(),
        Some(dir.path().join("en_US-lessac-medium.onnx").as_path())
    );
    Ok(())
}

#[test]
fn voice_dir_without_models_selects_espeak() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("README.txt"), b"no models here")?;

    let mut cfg = empty_cfg();
    cfg.piper_bin = Some(PathBuf::from("/usr/bin/piper"));
    cfg.espeak_bin = Some(PathBuf::from("/usr/bin/espeak-ng"));
    cfg.piper_voice_dir = Some(dir.path().to_path_buf());
    assert_eq!(select_engine(&cfg), EngineKind::Espeak);
    Ok(())
}

#[test]
fn log_speaker_always_succeeds() {
    let mut speaker = LogSpeaker::new();
    speaker.configure(VoiceSettings::default()).unwrap();
    assert!(speaker.settings().is_some());
    assert!(speaker.speak("Button: OK").is_ok());
    assert!(speaker.list_voices().unwrap().is_empty());
}

#[test]
fn wav_volume_scaling_halves_samples() -> std::io::Result<()> {
    let samples: [i16; 4] = [1000, -1000, 20000, -32768];
    let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&((36 + data.len()) as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&16_000u32.to_le_bytes());
    wav.extend_from_slice(&32_000u32.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data.len() as u32).to_le_bytes());
    wav.extend_from_slice(&data);

    let path = std::env::temp_dir().join(format!("narrator_scale_{}.wav", std::process::id()));
    std::fs::write(&path, &wav)?;
    scale_wav_pcm16_inplace(&path, 0.5)?;
    let out = std::fs::read(&path)?;
    std::fs::remove_file(&path)?;

    let scaled: Vec<i16> = out[44..]
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect();
    assert_eq!(scaled, vec![500, -500, 10000, -16384]);
    Ok(())
}
