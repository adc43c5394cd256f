use crate::target::{Target, TargetArena};

/// Outcome of submitting a word.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Hit { target: Target, points: u32 },
    Miss,
}

impl MatchResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, MatchResult::Hit { .. })
    }

    pub fn points(&self) -> u32 {
        match self {
            MatchResult::Hit { points, .. } => *points,
            MatchResult::Miss => 0,
        }
    }
}

/// Score for typing a word of `len` characters moving at `speed`.
///
/// `speed * len * 10 * (len / 4)`, rounded: longer and faster words are worth
/// quadratically more.
pub fn points_for(speed: u32, len: usize) -> u32 {
    let len = len as f64;
    (f64::from(speed) * len * 10.0 * (len / 4.0)).round() as u32
}

/// Handle one typed character.
///
/// Only alphabetic characters are accepted. The returned flag says whether
/// some live target starts with the extended input; the character is appended
/// whether or not it was correct.
pub fn on_character(ch: char, active_input: &str, targets: &TargetArena) -> (bool, String) {
    if !ch.is_alphabetic() {
        return (false, active_input.to_string());
    }

    let mut next = String::with_capacity(active_input.len() + ch.len_utf8());
    next.push_str(active_input);
    next.push(ch);

    let correct = targets.iter().any(|t| t.text.starts_with(&next));
    (correct, next)
}

/// Drop the last typed character.
pub fn on_backspace(active_input: &str) -> String {
    let mut next = active_input.to_string();
    next.pop();
    next
}

/// Resolve a submitted word against the live targets.
///
/// The first target in insertion order whose text equals `word` exactly
/// (case-sensitive) is removed from the arena and scored. When several targets
/// share the same text, the oldest one is taken.
pub fn on_submit(word: &str, targets: &mut TargetArena) -> MatchResult {
    let hit = targets.iter().find(|t| t.text == word).map(|t| t.id);

    match hit.and_then(|id| targets.remove(id)) {
        Some(target) => {
            let points = points_for(target.speed, target.len());
            MatchResult::Hit { target, points }
        }
        None => MatchResult::Miss,
    }
}

/// How many leading characters of `target` to highlight for the current input.
pub fn highlight_len(target: &Target, active_input: &str) -> usize {
    if !active_input.is_empty() && target.text.starts_with(active_input) {
        active_input.chars().count()
    } else {
        0
    }
}
