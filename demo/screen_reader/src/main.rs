mod config;
mod script;

use config::ScreenReaderConfig;
use narrator_core::{
    select_voice, AnnouncementQueue, EventDispatcher, FocusAnnouncer, KeyAnnouncer, KeyNameTable,
    LocalEventSource, Speaker, SpeechRequest, SpeechWorker,
};
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,narrator_core=info,screen_reader=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        target: "screen_reader",
        "Starting screen reader: Focus/Keys → Announcers → Queue → TTS"
    );

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = ScreenReaderConfig::load();

    // 1) Speech engine, tuned once before it is shared
    let mut speaker = narrator_audio::detect_speaker(&cfg.tts);
    let mut voice = cfg.voice.clone();
    if voice.voice_id.is_none() {
        match speaker.list_voices() {
            Ok(voices) => {
                voice.voice_id = select_voice(&voices, &cfg.voice_tags).map(|v| v.id.clone());
            }
            Err(e) => warn!(target: "screen_reader", error = %e, "Could not list voices"),
        }
    }
    if let Err(e) = speaker.configure(voice) {
        warn!(target: "screen_reader", error = %e, "Could not configure voice; using engine defaults");
    }
    let speaker: Arc<dyn Speaker> = Arc::from(speaker);

    // 2) Queue + dedicated speech worker
    let queue = AnnouncementQueue::from_config(&cfg.queue);
    let worker = SpeechWorker::spawn(queue.clone(), Arc::clone(&speaker));
    if let Some(greeting) = &cfg.greeting {
        queue.enqueue(SpeechRequest::system(greeting.clone()));
    }

    // 3) Announcers
    let focus = Arc::new(FocusAnnouncer::new(queue.clone()));
    let table = KeyNameTable::korean().with_overrides(cfg.keys.clone());
    let keys = Arc::new(KeyAnnouncer::new(queue.clone(), table));

    // 4) Sources + dispatcher
    let source = Arc::new(LocalEventSource::new());
    let mut dispatcher = EventDispatcher::new(source.clone(), source.clone(), focus, keys);
    if let Err(e) = dispatcher.start().await {
        error!(target: "screen_reader", error = %e, "Could not subscribe to focus/key events");
        worker.shutdown().await;
        return Err(e.into());
    }
    let _input = script::spawn_stdin_reader(Arc::clone(&source))?;

    // Ctrl+C raises the shutdown flag checked by the pump
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(raise_on_signal(signal::ctrl_c(), shutdown_tx));

    info!(target: "screen_reader", "Screen reader running. Press Ctrl+C to exit.");
    let pumped = dispatcher.pump(shutdown_rx).await;

    // In-flight speech finishes; anything still queued is discarded
    let stats = worker.shutdown().await;
    info!(
        target: "screen_reader",
        spoken = stats.spoken,
        failed = stats.failed,
        dropped_focus = stats.dropped_focus,
        discarded = stats.discarded,
        "Screen reader stopped"
    );

    pumped?;
    Ok(())
}

/// Raise the shutdown flag once `signal` fires.
///
/// If the handler cannot be installed the reader keeps running. The sender is
/// held forever because dropping it also stops the pump.
async fn raise_on_signal<F>(signal: F, shutdown_tx: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!(target: "screen_reader", "Shutting down...");
            let _ = shutdown_tx.send(true);
        }
        Err(e) => {
            error!(
                target: "screen_reader",
                error = %e,
                "Failed to listen for Ctrl+C; the reader keeps running"
            );
            std::future::pending::<()>().await;
        }
    }
}
