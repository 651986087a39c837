//! Timed, reversible ball mutations
//!
//! A temporary effect is a start/end pair: `start` runs when the effect is
//! applied, `end` runs once its duration of simulated time has elapsed. The
//! countdown is advanced by the tick `dt`, so pausing the simulation pauses
//! every timer with it.

use serde::{Deserialize, Serialize};

use super::ball::Ball;

/// A reversible mutation applied to a single ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimedEffect {
    /// Scale the ball (visual and collision size) from `original` to `grown`
    Grow { original: f32, grown: f32 },
    /// Steer toward the nearest brick
    Homing,
    /// Pull horizontally toward the paddle
    Magnet,
}

impl TimedEffect {
    pub fn start(&self, ball: &mut Ball) {
        match *self {
            TimedEffect::Grow { grown, .. } => {
                ball.scale = grown;
                ball.is_grown = true;
            }
            TimedEffect::Homing => {
                ball.homing_active = true;
                log::debug!("Ball {} homing started", ball.id);
            }
            TimedEffect::Magnet => {
                ball.magnet_active = true;
                log::debug!("Ball {} magnet started", ball.id);
            }
        }
    }

    pub fn end(&self, ball: &mut Ball) {
        match *self {
            TimedEffect::Grow { original, .. } => {
                ball.scale = original;
                ball.is_grown = false;
            }
            TimedEffect::Homing => {
                ball.homing_active = false;
                log::debug!("Ball {} homing ended", ball.id);
            }
            TimedEffect::Magnet => {
                ball.magnet_active = false;
                log::debug!("Ball {} magnet ended", ball.id);
            }
        }
    }
}

/// A pending end-mutation with the simulated seconds left before it fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub effect: TimedEffect,
    pub remaining: f32,
}

/// Count every entry down by `dt` and remove the expired ones, returned in
/// the order they were scheduled.
pub fn advance(pending: &mut Vec<ScheduledEffect>, dt: f32) -> Vec<TimedEffect> {
    let mut expired = Vec::new();
    pending.retain_mut(|entry| {
        entry.remaining -= dt;
        if entry.remaining <= 0.0 {
            expired.push(entry.effect);
            false
        } else {
            true
        }
    });
    expired
}
