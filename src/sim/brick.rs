//! Bricks and the discrete damage model

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Result of a `take_damage` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Unit hits actually applied
    pub hits: u32,
    /// True if one of those hits deactivated the brick
    pub destroyed: bool,
}

/// A brick entity (axis-aligned box)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    /// Box center
    pub pos: Vec2,
    /// Full width and height
    pub size: Vec2,
    pub health: u32,
    /// Number of damage states this brick starts with
    pub max_health: u32,
    pub unbreakable: bool,
    /// Points awarded for every unit hit
    pub points: u32,
    pub active: bool,
}

impl Brick {
    pub fn new(id: u32, pos: Vec2, size: Vec2, states: u32, points: u32, unbreakable: bool) -> Self {
        // Unbreakable bricks stay alive whatever their configured states
        let max_health = if unbreakable { states.max(1) } else { states };
        Self {
            id,
            pos,
            size,
            health: max_health,
            max_health,
            unbreakable,
            points,
            active: true,
        }
    }

    /// Restore full health and reactivate
    pub fn reset(&mut self) {
        self.active = true;
        self.health = self.max_health;
    }

    /// Half extents of the box
    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Closest point on the box to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let half = self.half_size();
        p.clamp(self.pos - half, self.pos + half)
    }

    /// Distance from `p` to the box (0 inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    /// Sprite state index for the presentation layer (0 = most damaged)
    pub fn damage_tier(&self) -> u32 {
        self.health.saturating_sub(1)
    }

    /// Returns true if this brick must be inactive for the stage to clear
    pub fn counts_for_clear(&self) -> bool {
        !self.unbreakable
    }

    /// Apply `ceil(amount)` unit hits, stopping as soon as the brick deactivates.
    ///
    /// Unbreakable and already-inactive bricks ignore damage entirely.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if self.unbreakable || !self.active || !amount.is_finite() || amount <= 0.0 {
            return outcome;
        }

        let unit_hits = amount.ceil() as u32;
        for _ in 0..unit_hits {
            self.hit();
            outcome.hits += 1;
            if !self.active {
                outcome.destroyed = true;
                break;
            }
        }
        outcome
    }

    fn hit(&mut self) {
        debug_assert!(self.health > 0, "active brick {} with zero health", self.id);
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.active = false;
        }
    }
}
