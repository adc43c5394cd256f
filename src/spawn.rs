use crate::corpus::{LengthSelection, WordCorpus};
use crate::error::{GameError, Result};
use crate::target::TargetSpec;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Slowest and fastest a target can drift, in play-field units per tick.
pub const MIN_SPEED: u32 = 3;
pub const MAX_SPEED: u32 = 5;
/// How far past the right edge targets may start.
pub const SPAWN_DEPTH: u32 = 1000;
/// Gap kept between a lane's top edge and the highest a word may sit.
pub const LANE_PADDING: u32 = 10;

/// Logical coordinate space targets live in; the renderer scales it to the
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: u32,
    pub height: u32,
    /// Space reserved at the bottom for the HUD.
    pub hud_margin: u32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            hud_margin: 150,
        }
    }
}

impl PlayField {
    /// Height of one lane when the field is split for `level` targets.
    pub fn lane_height(&self, level: u32) -> u32 {
        self.height.saturating_sub(self.hud_margin) / level.max(1)
    }
}

/// Builds the wave of targets for a level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnController {
    field: PlayField,
}

impl SpawnController {
    pub fn new(field: PlayField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> PlayField {
        self.field
    }

    /// Produce exactly `level` targets, one per lane.
    ///
    /// Each target sits at a random height inside its own lane, starts at a
    /// random distance past the right edge and moves at a random speed.
    pub fn spawn_level<R: Rng + ?Sized>(
        &self,
        level: u32,
        selection: &LengthSelection,
        corpus: &WordCorpus,
        rng: &mut R,
    ) -> Result<Vec<TargetSpec>> {
        if level == 0 {
            return Err(GameError::InvalidLevel(level));
        }

        let lane = self.field.lane_height(level);
        (0..level)
            .map(|i| {
                let speed = rng.gen_range(MIN_SPEED..=MAX_SPEED);
                let top = i * lane + LANE_PADDING.min(lane);
                let bottom = (i + 1) * lane;
                let y = rng.gen_range(top..=bottom);
                let x = rng.gen_range(self.field.width..=self.field.width + SPAWN_DEPTH);
                let text = corpus.draw_word(selection, rng)?;
                Ok(TargetSpec {
                    text,
                    speed,
                    y: f64::from(y),
                    x: f64::from(x),
                    lane: i as usize,
                })
            })
            .collect()
    }
}
