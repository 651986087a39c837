//! Ball entity: launch/attach state, effect hook dispatch, speed clamp

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::brick::Brick;
use super::effects::{Effect, EffectContext};
use super::paddle::Paddle;
use super::schedule::{self, ScheduledEffect, TimedEffect};
use crate::consts::*;
use crate::tuning::BallConfig;
use crate::{clamp_speed, lerp};

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Configured cruising speed (launch, paddle bounce, effects)
    pub speed: f32,
    pub max_speed: f32,
    pub damage: f32,
    /// Unscaled collision radius
    pub radius: f32,
    /// Visual and collision scale (Grow)
    pub scale: f32,
    /// Vertical gap to the paddle center while attached
    pub paddle_offset: f32,
    pub is_launched: bool,
    pub attached_to_paddle: bool,
    pub has_killzone_reflect: bool,
    pub is_grown: bool,
    pub magnet_active: bool,
    pub homing_active: bool,
    /// Applied in order on every hook; duplicates allowed
    pub effects: Vec<Effect>,
    pub scheduled: Vec<ScheduledEffect>,
    /// Brick ids this ball no longer collides with (Pierce)
    pub pass_through: BTreeSet<u32>,
    /// RGBA trail color from the equipped sigil
    pub trail_color: Option<[f32; 4]>,
    /// Set when the ball fell into the killzone; removed at the end of the tick
    #[serde(skip)]
    pub destroyed: bool,
}

impl Ball {
    pub fn new(id: u32, config: &BallConfig) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            speed: config.speed,
            max_speed: config.max_speed,
            damage: config.damage,
            radius: config.radius,
            scale: 1.0,
            paddle_offset: config.paddle_offset,
            is_launched: false,
            attached_to_paddle: true,
            has_killzone_reflect: false,
            is_grown: false,
            magnet_active: false,
            homing_active: false,
            effects: config.effects.clone(),
            scheduled: Vec::new(),
            pass_through: BTreeSet::new(),
            trail_color: None,
            destroyed: false,
        }
    }

    /// Effective collision radius
    #[inline]
    pub fn collision_radius(&self) -> f32 {
        self.radius * self.scale
    }

    /// Where an attached ball sits
    pub fn attach_point(&self, paddle: &Paddle) -> Vec2 {
        paddle.pos + Vec2::new(0.0, self.paddle_offset)
    }

    /// Every velocity change goes through here so the max-speed clamp always holds
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = clamp_speed(vel, self.max_speed);
        debug_assert!(self.vel.length() <= self.max_speed * 1.0001);
    }

    /// Ready state on the paddle; any running temporary effects are ended now
    pub fn reset_ball(&mut self, paddle: &Paddle) {
        self.cancel_scheduled();
        self.pos = self.attach_point(paddle);
        self.vel = Vec2::ZERO;
        self.is_launched = false;
        self.attached_to_paddle = true;
    }

    pub fn launch<R: Rng>(&mut self, rng: &mut R) {
        if self.is_launched {
            return;
        }
        self.is_launched = true;
        self.attached_to_paddle = false;

        let x = rng.random_range(-1.0..=1.0);
        let y = rng.random_range(0.5..=1.0);
        self.set_velocity(Vec2::new(x, y).normalize() * self.speed);
        log::debug!("Ball {} launched with velocity {}", self.id, self.vel);
    }

    pub fn stick_to_paddle(&mut self) {
        self.attached_to_paddle = true;
        self.is_launched = false;
        self.vel = Vec2::ZERO;
    }

    /// The Multiply spawn: same damage and effects (copied), fresh everything else
    pub fn clone_with_velocity(&self, vel: Vec2) -> Ball {
        let mut clone = Ball {
            id: 0,
            pos: self.pos,
            vel: Vec2::ZERO,
            speed: self.speed,
            max_speed: self.max_speed,
            damage: self.damage,
            radius: self.radius,
            scale: 1.0,
            paddle_offset: self.paddle_offset,
            is_launched: true,
            attached_to_paddle: false,
            has_killzone_reflect: false,
            is_grown: false,
            magnet_active: false,
            homing_active: false,
            effects: self.effects.clone(),
            scheduled: Vec::new(),
            pass_through: BTreeSet::new(),
            trail_color: self.trail_color,
            destroyed: false,
        };
        clone.set_velocity(vel);
        clone
    }

    /// Run `start` now and `end` after `duration` seconds of simulated time
    pub fn apply_temporary_effect(&mut self, effect: TimedEffect, duration: f32) {
        effect.start(self);
        self.scheduled.push(ScheduledEffect {
            effect,
            remaining: duration,
        });
    }

    /// Count down pending temporary effects and apply the ones that expired
    pub fn advance_timers(&mut self, dt: f32) {
        if self.scheduled.is_empty() {
            return;
        }
        for effect in schedule::advance(&mut self.scheduled, dt) {
            // A later activation of the same kind keeps it running
            let kind = std::mem::discriminant(&effect);
            if self.scheduled.iter().any(|s| std::mem::discriminant(&s.effect) == kind) {
                continue;
            }
            effect.end(self);
        }
    }

    /// Drop every pending timer, reverting its mutation, newest first
    pub fn cancel_scheduled(&mut self) {
        let pending = std::mem::take(&mut self.scheduled);
        for entry in pending.iter().rev() {
            entry.effect.end(self);
        }
    }

    /// Pre-physics update: paddle snap, effect ticks, magnet and homing steering
    pub fn update(&mut self, ctx: &mut EffectContext<'_>) {
        if !self.is_launched && self.attached_to_paddle {
            self.pos = self.attach_point(ctx.paddle);
        }

        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_tick(self, ctx);
        }
        self.effects = effects;

        if self.magnet_active {
            self.pos.x = lerp(self.pos.x, ctx.paddle.pos.x, ctx.dt * MAGNET_RATE);
        }

        if self.homing_active && self.is_launched {
            if let Some(target) = nearest_active_brick(self.pos, ctx.bricks) {
                let desired = (target - self.pos).normalize_or_zero() * self.speed;
                let steered = self.vel.lerp(desired, (ctx.dt * HOMING_RATE).clamp(0.0, 1.0));
                if let Some(dir) = steered.try_normalize() {
                    self.set_velocity(dir * self.speed);
                }
            }
        }
    }

    /// Re-inject velocity into a launched ball that has come to a stop
    pub fn unstall<R: Rng>(&mut self, rng: &mut R) -> bool {
        if !self.is_launched || self.vel.length() >= BALL_STALL_EPSILON {
            return false;
        }
        log::warn!("Ball {} velocity too low, reapplying upward nudge", self.id);
        let x = rng.random_range(-0.5..=0.5);
        self.set_velocity(Vec2::new(x, 1.0).normalize() * self.speed);
        true
    }

    /// Forward a brick hit to every attached effect, then spawn any Multiply clones
    pub fn on_hit_brick(&mut self, brick: usize, ctx: &mut EffectContext<'_>) {
        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_hit_brick(self, brick, ctx);
        }
        self.effects = effects;
        self.flush_clones(ctx);
    }

    /// Forward a paddle hit to every attached effect
    pub fn on_hit_paddle(&mut self, ctx: &mut EffectContext<'_>) {
        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_hit_paddle(self, ctx);
        }
        self.effects = effects;
        self.flush_clones(ctx);
    }

    /// Killzone contact. Returns true if the ball survived by reflecting.
    pub fn on_hit_killzone(&mut self, killzone_y: f32) -> bool {
        if self.has_killzone_reflect {
            self.has_killzone_reflect = false;
            self.set_velocity(Vec2::new(self.vel.x, -self.vel.y));
            self.pos.y = self.pos.y.max(killzone_y + self.collision_radius());
            log::debug!("Ball {} reflected off the killzone", self.id);
            true
        } else {
            self.destroyed = true;
            self.cancel_scheduled();
            false
        }
    }

    fn flush_clones(&mut self, ctx: &mut EffectContext<'_>) {
        if ctx.requests.clones.is_empty() {
            return;
        }
        for vel in std::mem::take(&mut ctx.requests.clones) {
            ctx.requests.spawns.push(self.clone_with_velocity(vel));
        }
    }
}

/// Closest active brick center; the first one found wins ties
pub fn nearest_active_brick(pos: Vec2, bricks: &[Brick]) -> Option<Vec2> {
    let mut closest = None;
    let mut min_dist = f32::MAX;
    for brick in bricks.iter().filter(|b| b.active) {
        let dist = pos.distance(brick.pos);
        if dist < min_dist {
            min_dist = dist;
            closest = Some(brick.pos);
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRng;
    use crate::sim::effects::MatchRequests;
    use crate::tuning::FieldConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn ball() -> Ball {
        Ball::new(1, &BallConfig::default())
    }

    #[test]
    fn test_new_ball_is_ready_on_paddle() {
        let paddle = Paddle::default();
        let mut b = ball();
        b.reset_ball(&paddle);
        assert!(b.attached_to_paddle);
        assert!(!b.is_launched);
        assert_eq!(b.pos, paddle.pos + Vec2::new(0.0, BALL_PADDLE_OFFSET));
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_stick_then_launch_goes_up() {
        let mut rng = SimRng::seed_from_u64(3);
        let mut b = ball();
        for _ in 0..100 {
            b.stick_to_paddle();
            b.stick_to_paddle();
            assert!(b.attached_to_paddle && !b.is_launched);
            b.launch(&mut rng);
            assert!(b.is_launched && !b.attached_to_paddle);
            assert!(b.vel.y > 0.0);
            assert!((b.vel.length() - b.speed).abs() < 1e-3);
        }
    }

    #[test]
    fn test_launch_is_noop_when_launched() {
        let mut rng = SimRng::seed_from_u64(3);
        let mut b = ball();
        b.launch(&mut rng);
        let vel = b.vel;
        b.launch(&mut rng);
        assert_eq!(b.vel, vel);
    }

    #[test]
    fn test_killzone_reflect_is_one_shot() {
        let mut b = ball();
        b.is_launched = true;
        b.vel = Vec2::new(2.0, -5.0);
        b.pos = Vec2::new(0.0, -5.1);
        b.has_killzone_reflect = true;

        assert!(b.on_hit_killzone(-5.0));
        assert_eq!(b.vel, Vec2::new(2.0, 5.0));
        assert!(b.pos.y >= -5.0 + b.collision_radius());
        assert!(!b.destroyed);

        b.apply_temporary_effect(TimedEffect::Homing, 5.0);
        assert!(!b.on_hit_killzone(-5.0));
        assert!(b.destroyed);
        assert!(b.scheduled.is_empty());
        assert!(!b.homing_active);
    }

    #[test]
    fn test_overlapping_activation_keeps_flag_until_last_expires() {
        let mut b = ball();
        b.apply_temporary_effect(TimedEffect::Homing, 5.0);
        b.advance_timers(3.0);
        b.apply_temporary_effect(TimedEffect::Homing, 5.0);

        b.advance_timers(2.5);
        assert!(b.homing_active);
        assert_eq!(b.scheduled.len(), 1);

        b.advance_timers(2.5);
        assert!(!b.homing_active);
        assert!(b.scheduled.is_empty());
    }

    #[test]
    fn test_temporary_effect_runs_on_simulated_time() {
        let mut b = ball();
        b.apply_temporary_effect(TimedEffect::Magnet, 1.0);
        assert!(b.magnet_active);
        for _ in 0..119 {
            b.advance_timers(1.0 / 120.0);
        }
        assert!(b.magnet_active);
        b.advance_timers(2.0 / 120.0);
        assert!(!b.magnet_active);
        assert!(b.scheduled.is_empty());
    }

    #[test]
    fn test_reset_cancels_timers_and_reverts() {
        let paddle = Paddle::default();
        let mut b = ball();
        b.apply_temporary_effect(
            TimedEffect::Grow {
                original: 1.0,
                grown: 2.0,
            },
            4.0,
        );
        b.apply_temporary_effect(TimedEffect::Homing, 5.0);
        b.reset_ball(&paddle);
        assert!(b.scheduled.is_empty());
        assert!(!b.is_grown && !b.homing_active);
        assert_eq!(b.scale, 1.0);
    }

    #[test]
    fn test_unstall_only_when_launched_and_stopped() {
        let mut rng = SimRng::seed_from_u64(11);
        let mut b = ball();
        assert!(!b.unstall(&mut rng));

        b.is_launched = true;
        b.vel = Vec2::new(0.001, 0.0);
        assert!(b.unstall(&mut rng));
        assert!(b.vel.y > 0.0);
        assert!((b.vel.length() - b.speed).abs() < 1e-3);
    }

    #[test]
    fn test_clone_copies_effects_by_value() {
        let mut b = ball();
        b.effects.push(Effect::Teleport {
            interval: 10.0,
            elapsed: 3.0,
        });
        b.damage = 4.0;
        b.pass_through.insert(5);
        b.apply_temporary_effect(TimedEffect::Magnet, 5.0);

        let mut clone = b.clone_with_velocity(Vec2::new(100.0, 0.0));
        assert_eq!(clone.damage, 4.0);
        assert!(clone.is_launched && !clone.attached_to_paddle);
        assert!(clone.pass_through.is_empty());
        assert!(clone.scheduled.is_empty() && !clone.magnet_active);
        assert!((clone.vel.length() - clone.max_speed).abs() < 1e-3);

        if let Effect::Teleport { elapsed, .. } = &mut clone.effects[0] {
            *elapsed = 0.0;
        }
        assert_eq!(
            b.effects[0],
            Effect::Teleport {
                interval: 10.0,
                elapsed: 3.0
            }
        );
    }

    #[test]
    fn test_nearest_brick_first_found_wins_ties() {
        let bricks = vec![
            Brick::new(1, Vec2::new(-1.0, 2.0), Vec2::ONE, 1, 1, false),
            Brick::new(2, Vec2::new(1.0, 2.0), Vec2::ONE, 1, 1, false),
        ];
        assert_eq!(nearest_active_brick(Vec2::ZERO, &bricks), Some(Vec2::new(-1.0, 2.0)));

        let mut bricks = bricks;
        bricks[0].active = false;
        assert_eq!(nearest_active_brick(Vec2::ZERO, &bricks), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_update_magnet_and_homing() {
        let mut bricks = vec![Brick::new(1, Vec2::new(4.0, 4.0), Vec2::ONE, 1, 1, false)];
        let paddle = Paddle {
            pos: Vec2::new(3.0, -4.0),
            ..Default::default()
        };
        let field = FieldConfig::default();
        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();

        let mut b = ball();
        b.is_launched = true;
        b.attached_to_paddle = false;
        b.pos = Vec2::ZERO;
        b.set_velocity(Vec2::new(-b.speed, 0.0));
        b.magnet_active = true;
        b.homing_active = true;

        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        for _ in 0..240 {
            b.update(&mut ctx);
        }
        assert!(b.pos.x > 0.0 && b.pos.x < 3.0);
        assert!(b.vel.x > 0.0 && b.vel.y > 0.0);
        assert!((b.vel.length() - b.speed).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_velocity_never_exceeds_max(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let mut b = ball();
            b.set_velocity(Vec2::new(x, y));
            prop_assert!(b.vel.length() <= b.max_speed * 1.0001);

            let once = b.vel;
            b.set_velocity(once);
            prop_assert_eq!(b.vel, once);
        }
    }
}
