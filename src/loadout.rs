//! Equipped sigil: what every controller-spawned ball starts with

use serde::{Deserialize, Serialize};

use crate::sim::effects::{Effect, EffectKind};
use crate::tuning::BallConfig;

/// Extras applied to a freshly spawned ball
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Loadout {
    /// RGBA
    pub trail_color: Option<[f32; 4]>,
    pub special: Option<Effect>,
}

/// Queried once for every ball the match controller spawns.
/// Multiply clones copy their parent instead.
pub trait LoadoutProvider {
    fn loadout(&self) -> Option<Loadout>;
}

/// Nothing equipped
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoadout;

impl LoadoutProvider for NoLoadout {
    fn loadout(&self) -> Option<Loadout> {
        None
    }
}

/// A crafted sigil used as the ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sigil {
    pub name: String,
    pub trail_color: [f32; 4],
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
    pub special: Option<Effect>,
}

impl Sigil {
    /// Difficulty-1 sigil carrying the stock tuning of `kind`
    pub fn with_effect(kind: EffectKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
            trail_color: [1.0, 1.0, 1.0, 1.0],
            difficulty: 1,
            special: Some(Effect::preset(kind)),
        }
    }

    /// Cruising ball speed for this sigil's difficulty
    pub fn ball_speed(&self) -> f32 {
        match self.difficulty {
            2 => 15.0,
            3 => 20.0,
            4 => 25.0,
            5 => 30.0,
            _ => 10.0,
        }
    }

    /// Raise the stage's ball speed to this sigil's, keeping max speed above it
    pub fn tune_ball(&self, ball: &mut BallConfig) {
        let speed = self.ball_speed();
        ball.speed = speed;
        ball.max_speed = ball.max_speed.max(speed * 1.5);
    }
}

impl LoadoutProvider for Sigil {
    fn loadout(&self) -> Option<Loadout> {
        Some(Loadout {
            trail_color: Some(self.trail_color),
            special: self.special.clone(),
        })
    }
}
