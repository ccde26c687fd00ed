//! Leaderboard payloads and local high scores
//!
//! `ScoreSubmission` carries the same bounds checks the leaderboard service
//! enforces, so bad entries are rejected before they leave the client.
//! The local top 10 is persisted to LocalStorage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
pub const MAX_SUBMITTED_SCORE: u64 = 9_999_999;
pub const MAX_SUBMITTED_LEVEL: u32 = 999;
/// Longest name kept after trimming (characters)
pub const MAX_NAME_LEN: usize = 16;

/// Submissions allowed per name inside one window
pub const RATE_LIMIT_COUNT: usize = 6;
/// Window length in seconds
pub const RATE_LIMIT_WINDOW_SECS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("name is empty")]
    EmptyName,
    #[error("score {0} is out of range")]
    ScoreOutOfRange(u64),
    #[error("level {0} is out of range")]
    LevelOutOfRange(u32),
    #[error("too many submissions for {name}, retry in {retry_after:.1}s")]
    RateLimited { name: String, retry_after: f64 },
}

/// One leaderboard entry as posted to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u64,
    pub level: u32,
}

impl ScoreSubmission {
    /// Name is trimmed and capped; bounds are checked by `validate`
    pub fn new(name: &str, score: u64, level: u32) -> Self {
        Self {
            name: name.trim().chars().take(MAX_NAME_LEN).collect(),
            score,
            level,
        }
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.name.trim().is_empty() {
            return Err(SubmissionError::EmptyName);
        }
        if self.score > MAX_SUBMITTED_SCORE {
            return Err(SubmissionError::ScoreOutOfRange(self.score));
        }
        if !(1..=MAX_SUBMITTED_LEVEL).contains(&self.level) {
            return Err(SubmissionError::LevelOutOfRange(self.level));
        }
        Ok(())
    }

    /// Rate-limit key: trimmed, lowercased name
    pub fn limiter_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Fixed-window limiter keyed by player name
///
/// A name's window opens with its first submission and lasts
/// `RATE_LIMIT_WINDOW_SECS`. Expired windows are dropped on every check.
#[derive(Debug, Clone, Default)]
pub struct NameRateLimiter {
    windows: HashMap<String, RateWindow>,
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    start: f64,
    count: usize,
}

impl RateWindow {
    fn expired(&self, now: f64) -> bool {
        now - self.start >= RATE_LIMIT_WINDOW_SECS
    }
}

impl NameRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission at `now` (seconds) if the name has budget left
    pub fn check(&mut self, submission: &ScoreSubmission, now: f64) -> Result<(), SubmissionError> {
        self.prune(now);

        let window = self
            .windows
            .entry(submission.limiter_key())
            .or_insert(RateWindow { start: now, count: 0 });

        if window.count >= RATE_LIMIT_COUNT {
            return Err(SubmissionError::RateLimited {
                name: submission.name.clone(),
                retry_after: (window.start + RATE_LIMIT_WINDOW_SECS - now).max(0.0),
            });
        }
        window.count += 1;
        Ok(())
    }

    /// Forget names whose window has closed
    pub fn prune(&mut self, now: f64) {
        self.windows.retain(|_, w| !w.expired(now));
    }

    /// Names with an open window
    pub fn tracked_names(&self) -> usize {
        self.windows.len()
    }

    /// Validate then rate-limit
    pub fn admit(&mut self, submission: &ScoreSubmission, now: f64) -> Result<(), SubmissionError> {
        submission.validate()?;
        self.check(submission, now)
    }
}

/// Best score ever reached on this device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore(pub u64);

impl BestScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rocket_corridor_best";

    /// Parse a stored value; anything unreadable counts as no best yet
    pub fn parse(stored: &str) -> Self {
        Self(stored.trim().parse().unwrap_or(0))
    }

    /// Raise the best to `score`; returns true if it changed
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.0 {
            self.0 = score;
            true
        } else {
            false
        }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        match storage.and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten()) {
            Some(value) => {
                let best = Self::parse(&value);
                log::info!("Loaded best score {}", best.0);
                best
            }
            None => Self::default(),
        }
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.0.to_string());
            log::info!("Best score saved ({})", self.0);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Level reached (1-based)
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Local top scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rocket_corridor_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a validated submission; returns the 1-based rank if it made the board
    pub fn add(&mut self, submission: &ScoreSubmission, timestamp: f64) -> Option<usize> {
        if submission.validate().is_err() || !self.qualifies(submission.score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: submission.name.clone(),
            score: submission.score,
            level: submission.level,
            timestamp,
        };

        // Ties go after existing entries
        let pos = self.entries.iter().position(|e| submission.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_bounds() {
        assert!(ScoreSubmission::new("ace", 170, 1).validate().is_ok());
        assert!(ScoreSubmission::new("ace", 0, 999).validate().is_ok());
        assert_eq!(
            ScoreSubmission::new("   ", 10, 1).validate(),
            Err(SubmissionError::EmptyName)
        );
        assert_eq!(
            ScoreSubmission::new("ace", 10_000_000, 1).validate(),
            Err(SubmissionError::ScoreOutOfRange(10_000_000))
        );
        assert_eq!(
            ScoreSubmission::new("ace", 10, 0).validate(),
            Err(SubmissionError::LevelOutOfRange(0))
        );
        assert_eq!(
            ScoreSubmission::new("ace", 10, 1000).validate(),
            Err(SubmissionError::LevelOutOfRange(1000))
        );
    }

    #[test]
    fn test_name_trimmed_and_capped() {
        let s = ScoreSubmission::new("  Rocket Pilot With A Long Name  ", 1, 1);
        assert_eq!(s.name.chars().count(), MAX_NAME_LEN);
        assert!(s.name.starts_with("Rocket"));
        assert_eq!(ScoreSubmission::new(" Ace ", 1, 1).limiter_key(), "ace");
    }

    #[test]
    fn test_rate_limit_window() {
        let mut limiter = NameRateLimiter::new();
        let a = ScoreSubmission::new("Ace", 100, 2);
        let a_caps = ScoreSubmission::new("ACE ", 120, 2);
        for i in 0..RATE_LIMIT_COUNT {
            let s = if i % 2 == 0 { &a } else { &a_caps };
            assert!(limiter.admit(s, i as f64).is_ok());
        }
        let err = limiter.admit(&a, 10.0).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::RateLimited { retry_after, .. } if (retry_after - 20.0).abs() < 1e-9
        ));

        // Other names are unaffected
        assert!(limiter.admit(&ScoreSubmission::new("bee", 1, 1), 10.0).is_ok());
        // The window opened at t = 0 and has closed
        assert!(limiter.admit(&a, 30.5).is_ok());
    }

    #[test]
    fn test_rate_limit_fixed_window_resets_budget() {
        let mut limiter = NameRateLimiter::new();
        let a = ScoreSubmission::new("ace", 10, 1);
        for i in 0..RATE_LIMIT_COUNT {
            assert!(limiter.admit(&a, 25.0 + i as f64 * 0.5).is_ok());
        }
        assert!(limiter.admit(&a, 40.0).is_err());
        // A fresh window at t = 55 gets the whole budget back at once
        for _ in 0..RATE_LIMIT_COUNT {
            assert!(limiter.admit(&a, 55.0).is_ok());
        }
        assert!(limiter.admit(&a, 55.0).is_err());
    }

    #[test]
    fn test_rate_limiter_forgets_stale_names() {
        let mut limiter = NameRateLimiter::new();
        for i in 0..50 {
            let s = ScoreSubmission::new(&format!("pilot{i}"), 10, 1);
            assert!(limiter.admit(&s, 0.0).is_ok());
        }
        assert_eq!(limiter.tracked_names(), 50);

        assert!(limiter.admit(&ScoreSubmission::new("late", 10, 1), 31.0).is_ok());
        assert_eq!(limiter.tracked_names(), 1);
        limiter.prune(100.0);
        assert_eq!(limiter.tracked_names(), 0);
    }

    #[test]
    fn test_best_score_parse_and_record() {
        assert_eq!(BestScore::parse("1234"), BestScore(1234));
        assert_eq!(BestScore::parse(" 56\n"), BestScore(56));
        assert_eq!(BestScore::parse("garbage"), BestScore(0));
        assert_eq!(BestScore::parse("-5"), BestScore(0));

        let mut best = BestScore::parse("170");
        assert!(!best.record(100));
        assert!(!best.record(170));
        assert!(best.record(270));
        assert_eq!(best.0, 270);
        assert_eq!(BestScore::parse(&best.0.to_string()), best);
    }

    #[test]
    fn test_invalid_submission_does_not_spend_budget() {
        let mut limiter = NameRateLimiter::new();
        let bad = ScoreSubmission::new("ace", 10, 0);
        for _ in 0..10 {
            assert!(limiter.admit(&bad, 0.0).is_err());
        }
        assert!(limiter.admit(&ScoreSubmission::new("ace", 10, 1), 0.0).is_ok());
    }

    #[test]
    fn test_high_scores_top_ten() {
        let mut board = HighScores::new();
        for score in 1..=12u64 {
            board.add(&ScoreSubmission::new("p", score * 10, 1), 0.0);
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(120));
        assert_eq!(board.entries.last().map(|e| e.score), Some(30));
        assert!(!board.qualifies(30));
        assert_eq!(board.add(&ScoreSubmission::new("q", 95, 3), 1.0), Some(4));
        assert_eq!(board.add(&ScoreSubmission::new("", 500, 3), 1.0), None);
    }
}
