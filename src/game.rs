use crate::corpus::WordCorpus;
use crate::error::{GameError, Result};
use crate::matcher::{on_backspace, on_character, on_submit, MatchResult};
use crate::session::{Phase, SessionConfig, SessionState};
use crate::spawn::{PlayField, SpawnController};
use crate::stats::{HighScoreFile, SessionStore};
use crate::tracker::{SessionSummary, Tracker};
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A key event, already stripped of terminal details by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
    Space,
    Escape,
    Other,
}

/// A clickable region of the last rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotspot {
    Pause,
    Resume,
    Quit,
    Stats,
    LengthToggle(usize),
}

/// Everything the driver observed since the previous tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub hotspots: Vec<Hotspot>,
    pub keys: Vec<KeyInput>,
}

impl TickInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: KeyInput) -> Self {
        self.keys.push(key);
        self
    }

    pub fn hotspot(mut self, hotspot: Hotspot) -> Self {
        self.hotspots.push(hotspot);
        self
    }

    /// Append one `Char` per character of `text`.
    pub fn typed(mut self, text: &str) -> Self {
        self.keys.extend(text.chars().map(KeyInput::Char));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty() && self.keys.is_empty()
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub quit: bool,
    pub open_stats: bool,
    /// Set when lives ran out; carries the row appended to the stats table.
    pub session_ended: Option<SessionSummary>,
    pub spawned: usize,
    pub expired: usize,
    pub submitted: Vec<MatchResult>,
}

/// The session loop: owns the state and advances it one tick at a time.
#[derive(Debug)]
pub struct Game<R: Rng, S: SessionStore> {
    config: SessionConfig,
    corpus: WordCorpus,
    spawner: SpawnController,
    tracker: Tracker,
    state: SessionState,
    high_score: u32,
    high_score_file: Option<HighScoreFile>,
    rng: R,
    store: S,
}

impl<R: Rng, S: SessionStore> Game<R, S> {
    pub fn new(mut config: SessionConfig, corpus: WordCorpus, store: S, rng: R) -> Result<Self> {
        if !corpus.can_draw(&config.selection) {
            return Err(GameError::EmptyCorpus);
        }
        if config.lives < 0 {
            warn!(lives = config.lives, "negative starting lives, using 0");
            config.lives = 0;
        }
        info!(lives = config.lives, words = corpus.len(), "session started");

        Ok(Self {
            config,
            spawner: SpawnController::new(config.field),
            corpus,
            tracker: Tracker::new(),
            state: SessionState::initial(&config, config.selection),
            high_score: 0,
            high_score_file: None,
            rng,
            store,
        })
    }

    /// Start from a known best score, optionally persisting it to `file`.
    pub fn with_high_score(mut self, best: u32, file: Option<HighScoreFile>) -> Self {
        self.high_score = best;
        self.high_score_file = file;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn field(&self) -> PlayField {
        self.spawner.field()
    }

    pub fn tick(&mut self, input: &TickInput) -> Result<TickOutcome> {
        self.tick_at(input, Instant::now())
    }

    /// Advance the session by one frame, using `now` for every timed event.
    pub fn tick_at(&mut self, input: &TickInput, now: Instant) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();
        let pause_requested = input.hotspots.contains(&Hotspot::Pause);

        if self.state.paused {
            for hotspot in &input.hotspots {
                match *hotspot {
                    Hotspot::Resume => {
                        self.state.paused = false;
                        info!(level = self.state.level, "resumed");
                    }
                    Hotspot::Quit => {
                        self.persist_high_score();
                        info!(score = self.state.score, "quit");
                        outcome.quit = true;
                        return Ok(outcome);
                    }
                    Hotspot::Stats => outcome.open_stats = true,
                    Hotspot::LengthToggle(slot) => {
                        self.state.selection.toggle(slot);
                        debug!(slot, on = self.state.selection.is_selected(slot), "length toggled");
                    }
                    Hotspot::Pause => {}
                }
            }
        }

        if self.state.pending_spawn && !self.state.paused {
            self.state.selection.normalize();
            let wave = self.spawner.spawn_level(
                self.state.level,
                &self.state.selection,
                &self.corpus,
                &mut self.rng,
            )?;
            outcome.spawned = wave.len();
            for _ in &wave {
                self.tracker.target_shown();
            }
            self.state.targets.extend(wave);
            self.state.pending_spawn = false;
            debug!(level = self.state.level, count = outcome.spawned, "wave spawned");
        } else {
            let paused = self.state.paused;
            let mut gone = Vec::new();
            for target in self.state.targets.iter_mut() {
                if !paused {
                    target.advance();
                }
                if target.has_expired() {
                    gone.push(target.id);
                }
            }
            for id in gone {
                if let Some(target) = self.state.targets.remove(id) {
                    self.tracker.target_expired();
                    self.state.lives -= 1;
                    outcome.expired += 1;
                    debug!(word = %target.text, lives = self.state.lives, "target escaped");
                }
            }
        }

        if self.state.targets.is_empty() && !self.state.paused && !self.state.pending_spawn {
            self.state.level += 1;
            self.state.pending_spawn = true;
            info!(level = self.state.level, score = self.state.score, "level up");
        }

        for word in std::mem::take(&mut self.state.staged_submits) {
            if word.is_empty() {
                continue;
            }
            let result = on_submit(&word, &mut self.state.targets);
            match &result {
                MatchResult::Hit { target, points } => {
                    self.state.score += points;
                    self.tracker.word_completed_at(&target.text, now);
                    if self.state.score > self.high_score {
                        self.high_score = self.state.score;
                    }
                }
                MatchResult::Miss => self.tracker.word_missed(),
            }
            outcome.submitted.push(result);
        }

        for key in &input.keys {
            match *key {
                KeyInput::Backspace => {
                    self.tracker.keystroke(false, true);
                    self.state.active_input = on_backspace(&self.state.active_input);
                }
                KeyInput::Char(ch) if !self.state.paused && ch.is_alphabetic() => {
                    let (correct, next) =
                        on_character(ch, &self.state.active_input, &self.state.targets);
                    self.tracker.keystroke(correct, false);
                    self.state.active_input = next;
                }
                KeyInput::Enter | KeyInput::Space if !self.state.paused => {
                    let word = std::mem::take(&mut self.state.active_input);
                    if !word.is_empty() {
                        self.state.staged_submits.push(word);
                    }
                }
                KeyInput::Escape => {
                    self.state.paused = !self.state.paused;
                    debug!(paused = self.state.paused, "pause toggled");
                }
                _ => {}
            }
        }

        if pause_requested {
            self.state.paused = true;
        }

        if self.state.is_over() {
            outcome.session_ended = Some(self.end_session(now));
        }

        self.state.targets.compact();
        Ok(outcome)
    }

    fn end_session(&mut self, now: Instant) -> SessionSummary {
        let score = self.state.score;
        let summary = match self.tracker.persist_session_at(score, &mut self.store, now) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "could not record session");
                self.tracker.snapshot_at(now).summary(score)
            }
        };
        self.persist_high_score();
        info!(
            score,
            level = self.state.level,
            net_wpm = summary.net_wpm,
            "game over"
        );

        self.tracker.reset_at(now);
        self.state = SessionState::initial(&self.config, self.state.selection);
        summary
    }

    /// Write the best score to its file, if one is attached. Failures are
    /// logged and otherwise ignored.
    pub fn persist_high_score(&self) {
        if let Some(file) = &self.high_score_file {
            if let Err(e) = file.save(self.high_score) {
                warn!(path = %file.path().display(), error = %e, "could not save high score");
            }
        }
    }
}
