use crate::event::{KeyEvent, SpeechRequest};
use crate::queue::AnnouncementQueue;
use std::collections::HashMap;
use tracing::info;

/// Localized names for non-printable keys. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct KeyNameTable {
    names: HashMap<String, String>,
}

impl KeyNameTable {
    /// Korean names for the common special keys
    pub fn korean() -> Self {
        Self::from_entries([
            ("space", "스페이스"),
            ("enter", "엔터"),
            ("backspace", "백스페이스"),
            ("tab", "탭"),
            ("shift", "쉬프트"),
            ("ctrl", "컨트롤"),
            ("alt", "알트"),
            ("delete", "딜리트"),
            ("caps lock", "캡스락"),
            ("esc", "이스케이프"),
            ("up", "위 방향키"),
            ("down", "아래 방향키"),
            ("left", "왼쪽 방향키"),
            ("right", "오른쪽 방향키"),
        ])
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace entries, consuming the table (the result is read-only)
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in overrides {
            self.names.insert(k.into(), v.into());
        }
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Speaks every key press; no deduplication
pub struct KeyAnnouncer {
    queue: AnnouncementQueue,
    table: KeyNameTable,
}

impl KeyAnnouncer {
    pub fn new(queue: AnnouncementQueue, table: KeyNameTable) -> Self {
        Self { queue, table }
    }

    pub fn on_key_pressed(&self, event: &KeyEvent) -> String {
        let phrase = self.phrase_for(&event.key);
        info!(target: "keys", key = %event.key, text = %phrase, "Key pressed");
        self.queue.enqueue(SpeechRequest::key(phrase.clone()));
        phrase
    }

    pub fn phrase_for(&self, key: &str) -> String {
        if key.chars().count() == 1 {
            return key.to_string();
        }
        self.table.lookup(key).unwrap_or(key).to_string()
    }

    pub fn table(&self) -> &KeyNameTable {
        &self.table
    }
}
