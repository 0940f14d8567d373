//! Durable high scores and session history, kept as JSON documents in a
//! small key-value store.
//!
//! Reads never fail: a missing or corrupt document reads as empty.

use crate::passage::Language;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HIGH_SCORES_KEY: &str = "high_scores";
pub const HISTORY_KEY: &str = "history";
pub const MAX_HIGH_SCORES: usize = 10;
pub const MAX_HISTORY: usize = 20;
/// Leaderboard rows shown per language
pub const SHOWN_PER_LANGUAGE: usize = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub wpm: u32,
    pub accuracy: u32,
    pub language: Language,
    pub duration: u32,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(flatten)]
    pub score: HighScore,
}

impl HistoryEntry {
    /// Entry stamped with the current time; the id is the unix time in milliseconds
    pub fn now(wpm: u32, accuracy: u32, language: Language, duration: u32) -> Self {
        let date = Utc::now();
        Self {
            id: date.timestamp_millis().to_string(),
            score: HighScore {
                wpm,
                accuracy,
                language,
                duration,
                date,
            },
        }
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("could not read {key}: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub trait ScoreStore {
    /// All stored high scores, in stored order (wpm descending)
    fn high_scores(&self) -> Vec<HighScore>;

    /// Records `entry` and reports whether it beat the previous best for its language
    fn save_high_score(&mut self, entry: &HighScore) -> Result<bool, StoreError>;

    /// Most recent first
    fn history(&self) -> Vec<HistoryEntry>;

    fn save_history(&mut self, entry: &HistoryEntry) -> Result<(), StoreError>;

    fn clear_history(&mut self) -> Result<(), StoreError>;

    fn best_score(&self, language: Language) -> Option<HighScore> {
        self.high_scores()
            .into_iter()
            .filter(|s| s.language == language)
            .max_by_key(|s| s.wpm)
    }

    /// Best `n` scores for one language
    fn top_scores(&self, language: Language, n: usize) -> Vec<HighScore> {
        self.high_scores()
            .into_iter()
            .filter(|s| s.language == language)
            .sorted_by_key(|s| Reverse(s.wpm))
            .take(n)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scoreboard<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> Scoreboard<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn read_list<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.kv.get(key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring malformed {key}: {e}");
            Vec::new()
        })
    }

    fn write_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let data = serde_json::to_string(items)?;
        self.kv.set(key, &data)
    }
}

impl Scoreboard<FileKeyValueStore> {
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(FileKeyValueStore::new(dir))
    }
}

impl<K: KeyValueStore> ScoreStore for Scoreboard<K> {
    fn high_scores(&self) -> Vec<HighScore> {
        self.read_list(HIGH_SCORES_KEY)
    }

    fn save_high_score(&mut self, entry: &HighScore) -> Result<bool, StoreError> {
        let mut scores = self.high_scores();
        let top = scores
            .iter()
            .filter(|s| s.language == entry.language)
            .map(|s| s.wpm)
            .max()
            .unwrap_or(0);
        let is_new = entry.wpm > top;

        scores.push(entry.clone());
        scores.sort_by_key(|s| Reverse(s.wpm));
        scores.truncate(MAX_HIGH_SCORES);
        self.write_list(HIGH_SCORES_KEY, &scores)?;

        if is_new {
            log::info!("new {} high score: {} wpm", entry.language, entry.wpm);
        }
        Ok(is_new)
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.read_list(HISTORY_KEY)
    }

    fn save_history(&mut self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let mut history = self.history();
        history.insert(0, entry.clone());
        history.truncate(MAX_HISTORY);
        self.write_list(HISTORY_KEY, &history)
    }

    fn clear_history(&mut self) -> Result<(), StoreError> {
        self.kv.remove(HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn score(wpm: u32, language: Language) -> HighScore {
        HighScore {
            wpm,
            accuracy: 95,
            language,
            duration: 60,
            date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn memory_board() -> Scoreboard<MemoryKeyValueStore> {
        Scoreboard::new(MemoryKeyValueStore::default())
    }

    #[test]
    fn test_empty_store_reads_empty() {
        let board = memory_board();
        assert!(board.high_scores().is_empty());
        assert!(board.history().is_empty());
        assert_eq!(board.best_score(Language::English), None);
    }

    #[test]
    fn test_malformed_documents_read_empty() {
        let mut kv = MemoryKeyValueStore::default();
        kv.set(HIGH_SCORES_KEY, "{not json").unwrap();
        kv.set(HISTORY_KEY, "[{\"wpm\": \"fast\"}]").unwrap();
        let board = Scoreboard::new(kv);
        assert!(board.high_scores().is_empty());
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_save_high_score_reports_new_best_per_language() {
        let mut board = memory_board();
        assert!(board.save_high_score(&score(40, Language::English)).unwrap());
        assert!(!board.save_high_score(&score(35, Language::English)).unwrap());
        // other language has its own best
        assert!(board.save_high_score(&score(20, Language::Nepali)).unwrap());
        // ties are not new
        assert!(!board.save_high_score(&score(40, Language::English)).unwrap());

        let wpms: Vec<u32> = board.high_scores().iter().map(|s| s.wpm).collect();
        assert_eq!(wpms, vec![40, 40, 35, 20]);
    }

    #[test]
    fn test_zero_wpm_is_never_a_high_score() {
        let mut board = memory_board();
        assert!(!board.save_high_score(&score(0, Language::English)).unwrap());
        assert_eq!(board.high_scores().len(), 1);
    }

    #[test]
    fn test_high_scores_capped_at_ten_across_languages() {
        let mut board = memory_board();
        for wpm in 1..=8 {
            board.save_high_score(&score(wpm, Language::English)).unwrap();
        }
        for wpm in 11..=14 {
            board.save_high_score(&score(wpm, Language::Nepali)).unwrap();
        }
        let scores = board.high_scores();
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.first().unwrap().wpm, 14);
        assert_eq!(scores.last().unwrap().wpm, 3);
        assert!(scores.windows(2).all(|w| w[0].wpm >= w[1].wpm));
    }

    #[test]
    fn test_top_scores_and_best_score_filter_by_language() {
        let mut board = memory_board();
        for wpm in [10, 50, 30, 20, 60, 40, 70] {
            board.save_high_score(&score(wpm, Language::Nepali)).unwrap();
        }
        board.save_high_score(&score(99, Language::English)).unwrap();

        let top: Vec<u32> = board
            .top_scores(Language::Nepali, SHOWN_PER_LANGUAGE)
            .iter()
            .map(|s| s.wpm)
            .collect();
        assert_eq!(top, vec![70, 60, 50, 40, 30]);
        assert_eq!(board.best_score(Language::Nepali).unwrap().wpm, 70);
        assert_eq!(board.best_score(Language::English).unwrap().wpm, 99);
    }

    #[test]
    fn test_history_keeps_twenty_most_recent_first() {
        let mut board = memory_board();
        for i in 0..25u32 {
            let entry = HistoryEntry {
                id: i.to_string(),
                score: score(i, Language::English),
            };
            board.save_history(&entry).unwrap();
        }
        let history = board.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].id, "24");
        assert_eq!(history[19].id, "5");
    }

    #[test]
    fn test_clear_history() {
        let mut board = memory_board();
        board
            .save_history(&HistoryEntry::now(30, 90, Language::Nepali, 30))
            .unwrap();
        assert_eq!(board.history().len(), 1);
        board.clear_history().unwrap();
        assert!(board.history().is_empty());
        // clearing twice is fine
        board.clear_history().unwrap();
    }

    #[test]
    fn test_history_entry_json_is_flat() {
        let entry = HistoryEntry {
            id: "1700000000000".into(),
            score: score(42, Language::Nepali),
        };
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["wpm"], 42);
        assert_eq!(json["language"], "nepali");
        assert_eq!(json["duration"], 60);
        assert!(json["date"].as_str().unwrap().starts_with("2026-01-01T00:00:00"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = Scoreboard::open(dir.path().join("data"));
        assert!(board.save_high_score(&score(33, Language::English)).unwrap());

        let reopened = Scoreboard::open(dir.path().join("data"));
        assert_eq!(reopened.high_scores(), vec![score(33, Language::English)]);
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.json"), b"\xff\xfe garbage").unwrap();
        let board = Scoreboard::open(dir.path());
        assert!(board.history().is_empty());
    }
}
