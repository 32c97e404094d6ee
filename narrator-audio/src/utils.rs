//! Shared helpers for the CLI speech engines.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a simple unique id based on current time in nanoseconds.
/// Sufficient for naming short-lived WAV files.
#[inline]
pub(crate) fn gen_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}", nanos)
}

pub(crate) fn get_from_env_or_path(env_key: &str, default_bin: &str) -> Option<PathBuf> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Some(pb);
        }
    }
    get_from_path(default_bin)
}

pub(crate) fn get_from_path(bin: &str) -> Option<PathBuf> {
    // A path-like string is taken as-is
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return if p.exists() { Some(p) } else { None };
    }

    if let Some(paths_os) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths_os) {
            let candidate = dir.join(bin);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}
