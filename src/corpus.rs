use crate::error::{GameError, Result};
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

static LANG_DIR: Dir = include_dir!("src/lang");

/// Number of length buckets the player can toggle (lengths 2..=7 and 8+).
pub const LENGTH_SLOTS: usize = 7;
/// Shortest word length that can spawn; slot 0 holds words of this length.
pub const MIN_WORD_LEN: usize = 2;
/// Chance that a drawn word gets one character uppercased.
pub const DEFAULT_TYPO_PROBABILITY: f64 = 0.3;

/// Which word-length buckets the spawner may draw from.
///
/// Slot `k` selects words of length `k + 2`; the last slot selects every word
/// of length 8 or more. An all-false selection is allowed to exist (the player
/// can toggle everything off while paused) but always draws as if only slot 0
/// were set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LengthSelection([bool; LENGTH_SLOTS]);

impl LengthSelection {
    pub fn new(slots: [bool; LENGTH_SLOTS]) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> [bool; LENGTH_SLOTS] {
        self.0
    }

    pub fn is_selected(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    /// Flip one slot. Out-of-range slots are ignored.
    pub fn toggle(&mut self, slot: usize) {
        if let Some(s) = self.0.get_mut(slot) {
            *s = !*s;
        }
    }

    /// Force slot 0 on when nothing is selected.
    pub fn normalize(&mut self) {
        if !self.0.iter().any(|s| *s) {
            self.0[0] = true;
        }
    }

    /// Slots that draws are taken from, applying the slot-0 fallback.
    pub fn effective_slots(&self) -> Vec<usize> {
        let picked: Vec<usize> = (0..LENGTH_SLOTS).filter(|&i| self.0[i]).collect();
        if picked.is_empty() {
            vec![0]
        } else {
            picked
        }
    }

    /// Label shown on the toggle for a slot: "2".."7", then "8+".
    pub fn slot_label(slot: usize) -> String {
        if slot + 1 >= LENGTH_SLOTS {
            format!("{}+", slot + MIN_WORD_LEN)
        } else {
            (slot + MIN_WORD_LEN).to_string()
        }
    }
}

impl Default for LengthSelection {
    fn default() -> Self {
        Self([false, true, false, false, false, false, false])
    }
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

/// Compute bucket boundaries over a list sorted by length ascending.
///
/// The result has `LENGTH_SLOTS + 1` entries: entry `k` is where bucket `k`
/// starts (and where the previous one ends), and the last entry is the list
/// length. Words shorter than [`MIN_WORD_LEN`] sit before entry 0.
pub fn build_length_index<S: AsRef<str>>(words: &[S]) -> Vec<usize> {
    let mut bounds = Vec::with_capacity(LENGTH_SLOTS + 1);
    let mut idx = 0;
    for slot in 0..LENGTH_SLOTS {
        let min_len = MIN_WORD_LEN + slot;
        while idx < words.len() && char_len(words[idx].as_ref()) < min_len {
            idx += 1;
        }
        bounds.push(idx);
    }
    bounds.push(words.len());
    bounds
}

/// Bucket a word of this length falls into, if it can spawn at all.
pub fn length_slot(len: usize) -> Option<usize> {
    if len < MIN_WORD_LEN {
        None
    } else {
        Some((len - MIN_WORD_LEN).min(LENGTH_SLOTS - 1))
    }
}

/// Word list bucketed by length, the source of every target's text.
#[derive(Debug, Clone)]
pub struct WordCorpus {
    words: Vec<String>,
    bounds: Vec<usize>,
    typo_probability: f64,
}

impl WordCorpus {
    /// Normalise a raw word list and index it.
    ///
    /// Words are trimmed and lowercased; anything that is not purely alphabetic
    /// or is shorter than two characters is dropped.
    pub fn new<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = raw
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| char_len(w) >= MIN_WORD_LEN && w.chars().all(char::is_alphabetic))
            .collect();

        if words.is_empty() {
            return Err(GameError::EmptyCorpus);
        }

        words.sort_by_key(|w| char_len(w));
        let bounds = build_length_index(&words);

        Ok(Self {
            words,
            bounds,
            typo_probability: DEFAULT_TYPO_PROBABILITY,
        })
    }

    /// The word list compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let file = LANG_DIR
            .get_file("english.txt")
            .ok_or_else(|| GameError::Startup("embedded word list missing".to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| GameError::Startup("embedded word list is not UTF-8".to_string()))?;
        Self::new(contents.lines())
    }

    /// Load a one-word-per-line file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GameError::Startup(format!(
                "cannot read word list {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::new(contents.lines())
    }

    pub fn with_typo_probability(mut self, p: f64) -> Self {
        self.typo_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn bounds(&self) -> &[usize] {
        &self.bounds
    }

    /// Index range of one length bucket.
    pub fn bucket(&self, slot: usize) -> Range<usize> {
        if slot >= LENGTH_SLOTS {
            return 0..0;
        }
        self.bounds[slot]..self.bounds[slot + 1]
    }

    pub fn bucket_words(&self, slot: usize) -> &[String] {
        &self.words[self.bucket(slot)]
    }

    /// Whether `selection` resolves to at least one non-empty bucket.
    pub fn can_draw(&self, selection: &LengthSelection) -> bool {
        selection
            .effective_slots()
            .into_iter()
            .any(|slot| !self.bucket(slot).is_empty())
    }

    /// Draw one word for a new target.
    ///
    /// A bucket is picked uniformly among the selected, non-empty ones (not
    /// weighted by bucket size), then a word uniformly within it.
    pub fn draw_word<R: Rng + ?Sized>(
        &self,
        selection: &LengthSelection,
        rng: &mut R,
    ) -> Result<String> {
        let candidates: Vec<Range<usize>> = selection
            .effective_slots()
            .into_iter()
            .map(|slot| self.bucket(slot))
            .filter(|range| !range.is_empty())
            .collect();

        let bucket = candidates.choose(rng).ok_or(GameError::EmptyCorpus)?;
        let index = rng.gen_range(bucket.clone());
        let text = self.words[index].to_lowercase();

        if rng.gen_bool(self.typo_probability) {
            Ok(uppercase_one(&text, rng))
        } else {
            Ok(text)
        }
    }
}

/// Uppercase one uniformly chosen character in place.
fn uppercase_one<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let len = char_len(text);
    if len == 0 {
        return String::new();
    }
    let j = rng.gen_range(0..len);
    text.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            if i == j {
                c.to_uppercase().collect::<Vec<char>>()
            } else {
                vec![c]
            }
        })
        .collect()
}
