use crate::corpus::LengthSelection;
use crate::spawn::PlayField;
use crate::target::TargetArena;

pub const DEFAULT_LIVES: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub lives: i32,
    pub field: PlayField,
    /// Length buckets selected when the game starts.
    pub selection: LengthSelection,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            field: PlayField::default(),
            selection: LengthSelection::default(),
        }
    }
}

/// Where the session loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Paused,
    /// Running, with a new wave to spawn on the next tick.
    LevelTransition,
    Playing,
}

/// Everything that changes while playing.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub level: u32,
    pub score: u32,
    pub lives: i32,
    pub active_input: String,
    /// Words submitted with Enter/Space, resolved on the next tick.
    pub staged_submits: Vec<String>,
    pub targets: TargetArena,
    pub paused: bool,
    pub pending_spawn: bool,
    pub selection: LengthSelection,
}

impl SessionState {
    /// A fresh session: paused on level 1 with a wave pending.
    pub fn initial(config: &SessionConfig, selection: LengthSelection) -> Self {
        Self {
            level: 1,
            score: 0,
            lives: config.lives,
            active_input: String::new(),
            staged_submits: Vec::new(),
            targets: TargetArena::new(),
            paused: true,
            pending_spawn: true,
            selection,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.paused {
            Phase::Paused
        } else if self.pending_spawn {
            Phase::LevelTransition
        } else {
            Phase::Playing
        }
    }

    pub fn is_over(&self) -> bool {
        self.lives < 0
    }
}
