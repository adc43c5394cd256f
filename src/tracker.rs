use crate::error::Result;
use crate::stats::SessionStore;
use crate::util::{mean, round_to};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Raw counters for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub words_typed: u32,
    pub correct_words: u32,
    pub incorrect_words: u32,
    pub total_keystrokes: u32,
    pub correct_keystrokes: u32,
    pub backspace_count: u32,
    pub word_streak: u32,
    pub longest_streak: u32,
    pub chars_typed: u32,
    pub words_shown: u32,
    pub words_missed: u32,
    pub total_word_length: u32,
    /// Seconds between consecutive completed words.
    pub word_times: Vec<f64>,
    pub started_at: Instant,
    pub last_word_at: Instant,
}

impl SessionStats {
    /// Fresh counters with both clocks started at `now`.
    pub fn initial(now: Instant) -> Self {
        Self {
            words_typed: 0,
            correct_words: 0,
            incorrect_words: 0,
            total_keystrokes: 0,
            correct_keystrokes: 0,
            backspace_count: 0,
            word_streak: 0,
            longest_streak: 0,
            chars_typed: 0,
            words_shown: 0,
            words_missed: 0,
            total_word_length: 0,
            word_times: Vec::new(),
            started_at: now,
            last_word_at: now,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Counters frozen at one instant. Every derived metric is computed from the
/// same copy, so a reader never mixes values from before and after an event.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub stats: SessionStats,
    pub elapsed_secs: f64,
}

impl StatsSnapshot {
    fn elapsed_minutes(&self) -> f64 {
        self.elapsed_secs / 60.0
    }

    fn attempted_words(&self) -> f64 {
        f64::from(self.stats.correct_words + self.stats.incorrect_words)
    }

    fn typed_chars(&self) -> f64 {
        f64::from(
            self.stats
                .total_keystrokes
                .saturating_sub(self.stats.backspace_count),
        )
    }

    pub fn net_wpm(&self) -> f64 {
        ratio(f64::from(self.stats.correct_words), self.elapsed_minutes())
    }

    pub fn gross_wpm(&self) -> f64 {
        ratio(self.attempted_words(), self.elapsed_minutes())
    }

    pub fn kpm(&self) -> f64 {
        ratio(f64::from(self.stats.total_keystrokes), self.elapsed_minutes())
    }

    pub fn word_accuracy(&self) -> f64 {
        ratio(f64::from(self.stats.correct_words), self.attempted_words()) * 100.0
    }

    pub fn char_accuracy(&self) -> f64 {
        ratio(f64::from(self.stats.correct_keystrokes), self.typed_chars()) * 100.0
    }

    pub fn error_rate(&self) -> f64 {
        let typed = self.typed_chars();
        ratio(typed - f64::from(self.stats.correct_keystrokes), typed) * 100.0
    }

    pub fn average_word_length(&self) -> f64 {
        ratio(
            f64::from(self.stats.total_word_length),
            f64::from(self.stats.correct_words),
        )
    }

    pub fn average_word_time(&self) -> f64 {
        mean(&self.stats.word_times).unwrap_or(0.0)
    }

    /// Persistable row for this snapshot.
    pub fn summary(&self, score: u32) -> SessionSummary {
        let s = &self.stats;
        SessionSummary {
            net_wpm: round_to(self.net_wpm(), 2),
            gross_wpm: round_to(self.gross_wpm(), 2),
            kpm: round_to(self.kpm(), 2),
            word_accuracy_pct: round_to(self.word_accuracy(), 2),
            char_accuracy_pct: round_to(self.char_accuracy(), 2),
            error_rate_pct: round_to(self.error_rate(), 2),
            score,
            words_typed: s.words_typed,
            correct_words: s.correct_words,
            incorrect_words: s.incorrect_words,
            chars_typed: s.chars_typed,
            correct_keystrokes: s.correct_keystrokes,
            backspace_count: s.backspace_count,
            longest_streak: s.longest_streak,
            avg_word_length: round_to(self.average_word_length(), 2),
            avg_word_time_sec: round_to(self.average_word_time(), 3),
            total_time_sec: round_to(self.elapsed_secs, 2),
            words_shown: s.words_shown,
            words_missed: s.words_missed,
        }
    }
}

/// One row of the statistics table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub net_wpm: f64,
    pub gross_wpm: f64,
    pub kpm: f64,
    pub word_accuracy_pct: f64,
    pub char_accuracy_pct: f64,
    pub error_rate_pct: f64,
    pub score: u32,
    pub words_typed: u32,
    pub correct_words: u32,
    pub incorrect_words: u32,
    pub chars_typed: u32,
    pub correct_keystrokes: u32,
    pub backspace_count: u32,
    pub longest_streak: u32,
    pub avg_word_length: f64,
    pub avg_word_time_sec: f64,
    pub total_time_sec: f64,
    pub words_shown: u32,
    pub words_missed: u32,
}

/// Event-sourced accumulator of a session's typing performance.
///
/// Every event has an `_at` variant taking the instant explicitly; the plain
/// variants use the wall clock.
#[derive(Debug, Clone)]
pub struct Tracker {
    stats: SessionStats,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            stats: SessionStats::initial(now),
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn word_completed(&mut self, word: &str) {
        self.word_completed_at(word, Instant::now());
    }

    pub fn word_completed_at(&mut self, word: &str, now: Instant) {
        let len = word.chars().count() as u32;
        let s = &mut self.stats;
        s.words_typed += 1;
        s.correct_words += 1;
        s.word_streak += 1;
        s.longest_streak = s.longest_streak.max(s.word_streak);
        s.chars_typed += len;
        s.total_word_length += len;
        s.word_times
            .push(now.saturating_duration_since(s.last_word_at).as_secs_f64());
        s.last_word_at = now;
    }

    /// A submit that matched no target.
    pub fn word_missed(&mut self) {
        self.stats.incorrect_words += 1;
        self.stats.word_streak = 0;
    }

    /// Record a keypress. Backspaces are never classified correct.
    pub fn keystroke(&mut self, correct: bool, is_backspace: bool) {
        self.stats.total_keystrokes += 1;
        if is_backspace {
            self.stats.backspace_count += 1;
        } else if correct {
            self.stats.correct_keystrokes += 1;
        }
    }

    pub fn target_shown(&mut self) {
        self.stats.words_shown += 1;
    }

    pub fn target_expired(&mut self) {
        self.stats.words_missed += 1;
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.stats = SessionStats::initial(now);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> StatsSnapshot {
        StatsSnapshot {
            stats: self.stats.clone(),
            elapsed_secs: now
                .saturating_duration_since(self.stats.started_at)
                .as_secs_f64(),
        }
    }

    pub fn summary(&self, score: u32) -> SessionSummary {
        self.snapshot().summary(score)
    }

    /// Append this session's row to the statistics table.
    pub fn persist_session<S: SessionStore + ?Sized>(
        &self,
        score: u32,
        store: &mut S,
    ) -> Result<SessionSummary> {
        self.persist_session_at(score, store, Instant::now())
    }

    pub fn persist_session_at<S: SessionStore + ?Sized>(
        &self,
        score: u32,
        store: &mut S,
        now: Instant,
    ) -> Result<SessionSummary> {
        let summary = self.snapshot_at(now).summary(score);
        store.append(&summary)?;
        Ok(summary)
    }
}
