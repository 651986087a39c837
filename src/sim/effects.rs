//! Ball effect library
//!
//! Every effect is a variant of one closed enum. The ball forwards its
//! brick/paddle hits and its per-tick update to each attached effect in
//! attachment order. Effects never touch controller-owned state directly:
//! brick damage goes through `EffectContext::damage_brick`, and new balls and
//! extra lives are queued on `MatchRequests` for the controller to apply.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::ball::Ball;
use super::brick::{Brick, DamageOutcome};
use super::paddle::Paddle;
use super::schedule::TimedEffect;
use crate::StageError;
use crate::rotate_degrees;
use crate::tuning::FieldConfig;

/// Stable identifier for each effect variant (UI feedback, logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Critical,
    Explode,
    Grow,
    Homing,
    Lifegain,
    Magnet,
    Multiply,
    Pierce,
    RandomAngle,
    Reflect,
    Stick,
    Teleport,
}

impl EffectKind {
    pub const ALL: [EffectKind; 12] = [
        EffectKind::Critical,
        EffectKind::Explode,
        EffectKind::Grow,
        EffectKind::Homing,
        EffectKind::Lifegain,
        EffectKind::Magnet,
        EffectKind::Multiply,
        EffectKind::Pierce,
        EffectKind::RandomAngle,
        EffectKind::Reflect,
        EffectKind::Stick,
        EffectKind::Teleport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Critical => "Critical",
            EffectKind::Explode => "Explode",
            EffectKind::Grow => "Grow",
            EffectKind::Homing => "Homing",
            EffectKind::Lifegain => "Lifegain",
            EffectKind::Magnet => "Magnet",
            EffectKind::Multiply => "Multiply",
            EffectKind::Pierce => "Pierce",
            EffectKind::RandomAngle => "RandomAngle",
            EffectKind::Reflect => "Reflect",
            EffectKind::Stick => "Stick",
            EffectKind::Teleport => "Teleport",
        }
    }
}

/// A gameplay-modifying rule attached to a ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Effect {
    /// Extra hit for double the ball's damage
    Critical { chance: f32 },
    /// Damage every active brick near the struck one
    Explode { chance: f32, radius_multiplier: f32 },
    /// Temporarily scale the ball up
    Grow { chance: f32, scale: f32, duration: f32 },
    Homing { chance: f32, duration: f32 },
    Lifegain { chance: f32 },
    Magnet { chance: f32, duration: f32 },
    /// Spawn a second ball deflected 25-45 degrees off the current heading
    Multiply { chance: f32 },
    /// Extra hit, then pass through that brick from now on
    Pierce { chance: f32 },
    /// New heading anywhere in 0-360 degrees (brick or paddle hit)
    RandomAngle { chance: f32 },
    /// One-shot bounce off the killzone (paddle hit)
    Reflect { chance: f32 },
    /// Re-attach to the paddle (paddle hit)
    Stick { chance: f32 },
    /// Jump to a random spot in the upper half of the field every `interval` seconds
    Teleport {
        interval: f32,
        #[serde(default)]
        elapsed: f32,
    },
}

impl Effect {
    /// The effect as tuned in the stock sigil assets
    pub fn preset(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Critical => Effect::Critical { chance: 0.25 },
            EffectKind::Explode => Effect::Explode {
                chance: 0.10,
                radius_multiplier: 4.0,
            },
            EffectKind::Grow => Effect::Grow {
                chance: 0.10,
                scale: 2.0,
                duration: 4.0,
            },
            EffectKind::Homing => Effect::Homing {
                chance: 0.20,
                duration: 5.0,
            },
            EffectKind::Lifegain => Effect::Lifegain { chance: 0.5 },
            EffectKind::Magnet => Effect::Magnet {
                chance: 0.10,
                duration: 5.0,
            },
            EffectKind::Multiply => Effect::Multiply { chance: 0.05 },
            EffectKind::Pierce => Effect::Pierce { chance: 0.25 },
            EffectKind::RandomAngle => Effect::RandomAngle { chance: 0.25 },
            EffectKind::Reflect => Effect::Reflect { chance: 0.05 },
            EffectKind::Stick => Effect::Stick { chance: 0.25 },
            EffectKind::Teleport => Effect::Teleport {
                interval: 10.0,
                elapsed: 0.0,
            },
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Critical { .. } => EffectKind::Critical,
            Effect::Explode { .. } => EffectKind::Explode,
            Effect::Grow { .. } => EffectKind::Grow,
            Effect::Homing { .. } => EffectKind::Homing,
            Effect::Lifegain { .. } => EffectKind::Lifegain,
            Effect::Magnet { .. } => EffectKind::Magnet,
            Effect::Multiply { .. } => EffectKind::Multiply,
            Effect::Pierce { .. } => EffectKind::Pierce,
            Effect::RandomAngle { .. } => EffectKind::RandomAngle,
            Effect::Reflect { .. } => EffectKind::Reflect,
            Effect::Stick { .. } => EffectKind::Stick,
            Effect::Teleport { .. } => EffectKind::Teleport,
        }
    }

    /// Activation chance, if the effect is chance-based
    pub fn chance(&self) -> Option<f32> {
        match *self {
            Effect::Critical { chance }
            | Effect::Explode { chance, .. }
            | Effect::Grow { chance, .. }
            | Effect::Homing { chance, .. }
            | Effect::Lifegain { chance }
            | Effect::Magnet { chance, .. }
            | Effect::Multiply { chance }
            | Effect::Pierce { chance }
            | Effect::RandomAngle { chance }
            | Effect::Reflect { chance }
            | Effect::Stick { chance } => Some(chance),
            Effect::Teleport { .. } => None,
        }
    }

    /// Reject tunings the simulation cannot honor
    pub fn validate(&self) -> Result<(), StageError> {
        let name = self.kind().as_str();
        if let Some(chance) = self.chance() {
            if !(0.0..=1.0).contains(&chance) {
                return Err(StageError::InvalidChance {
                    effect: name,
                    chance,
                });
            }
        }
        let duration = match *self {
            Effect::Grow { duration, .. }
            | Effect::Homing { duration, .. }
            | Effect::Magnet { duration, .. } => Some(duration),
            Effect::Teleport { interval, .. } => Some(interval),
            _ => None,
        };
        match duration {
            Some(duration) if !(duration > 0.0) => Err(StageError::InvalidDuration {
                effect: name,
                duration,
            }),
            _ => Ok(()),
        }
    }

    /// Ball struck the brick at index `brick` of `ctx.bricks`
    pub fn on_hit_brick(&mut self, ball: &mut Ball, brick: usize, ctx: &mut EffectContext<'_>) {
        match *self {
            Effect::Critical { chance } => {
                if ctx.roll(chance) {
                    ctx.damage_brick(brick, ball.damage * 2.0);
                    ctx.trigger(EffectKind::Critical);
                }
            }
            Effect::Explode {
                chance,
                radius_multiplier,
            } => {
                if ctx.roll(chance) {
                    let radius = ball.collision_radius() * radius_multiplier;
                    ctx.explode(brick, radius, ball.damage);
                    ctx.trigger(EffectKind::Explode);
                }
            }
            Effect::Grow {
                chance,
                scale,
                duration,
            } => {
                // One grown state per ball at a time
                if ball.is_grown {
                    return;
                }
                if ctx.roll(chance) {
                    let timed = TimedEffect::Grow {
                        original: ball.scale,
                        grown: ball.scale * scale,
                    };
                    ball.apply_temporary_effect(timed, duration);
                    ctx.trigger(EffectKind::Grow);
                }
            }
            Effect::Homing { chance, duration } => {
                if ctx.roll(chance) {
                    ball.apply_temporary_effect(TimedEffect::Homing, duration);
                    ctx.trigger(EffectKind::Homing);
                }
            }
            Effect::Lifegain { chance } => {
                if ctx.roll(chance) {
                    ctx.requests.lives_gained += 1;
                    ctx.trigger(EffectKind::Lifegain);
                }
            }
            Effect::Magnet { chance, duration } => {
                if ctx.roll(chance) {
                    ball.apply_temporary_effect(TimedEffect::Magnet, duration);
                    ctx.trigger(EffectKind::Magnet);
                }
            }
            Effect::Multiply { chance } => {
                if ctx.roll(chance) {
                    let angle = ctx.rng.random_range(25.0..=45.0);
                    let sign = if ctx.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                    let vel = multiply_velocity(ball.vel, angle * sign, ball.speed);
                    ctx.requests.clones.push(vel);
                    ctx.trigger(EffectKind::Multiply);
                }
            }
            Effect::Pierce { chance } => {
                if ctx.roll(chance) {
                    ctx.damage_brick(brick, ball.damage);
                    if let Some(id) = ctx.bricks.get(brick).map(|b| b.id) {
                        ball.pass_through.insert(id);
                    }
                    ctx.trigger(EffectKind::Pierce);
                }
            }
            Effect::RandomAngle { chance } => randomize_angle(ball, chance, ctx),
            Effect::Reflect { .. } | Effect::Stick { .. } | Effect::Teleport { .. } => {}
        }
    }

    pub fn on_hit_paddle(&mut self, ball: &mut Ball, ctx: &mut EffectContext<'_>) {
        match *self {
            Effect::Stick { chance } => {
                if ctx.roll(chance) {
                    ball.stick_to_paddle();
                    ctx.trigger(EffectKind::Stick);
                }
            }
            Effect::Reflect { chance } => {
                if ctx.roll(chance) {
                    ball.has_killzone_reflect = true;
                    log::debug!("Ball {} granted killzone reflect", ball.id);
                    ctx.trigger(EffectKind::Reflect);
                }
            }
            Effect::RandomAngle { chance } => randomize_angle(ball, chance, ctx),
            _ => {}
        }
    }

    pub fn on_tick(&mut self, ball: &mut Ball, ctx: &mut EffectContext<'_>) {
        if let Effect::Teleport { interval, elapsed } = self {
            *elapsed += ctx.dt;
            // An attached ball snaps back to the paddle, so the jump waits for launch
            if *elapsed >= *interval && ball.is_launched {
                ball.pos = ctx.field.random_upper_point(&mut *ctx.rng, ball.collision_radius());
                *elapsed = 0.0;
                ctx.trigger(EffectKind::Teleport);
            }
        }
    }
}

fn randomize_angle(ball: &mut Ball, chance: f32, ctx: &mut EffectContext<'_>) {
    if ctx.roll(chance) {
        let angle: f32 = ctx.rng.random_range(0.0..360.0);
        ball.set_velocity(rotate_degrees(Vec2::X, angle) * ball.speed);
        ctx.trigger(EffectKind::RandomAngle);
    }
}

/// Clone heading: the current direction turned clockwise by `angle_deg`, at `speed`
pub fn multiply_velocity(vel: Vec2, angle_deg: f32, speed: f32) -> Vec2 {
    let dir = vel.try_normalize().unwrap_or(Vec2::Y);
    rotate_degrees(dir, -angle_deg) * speed
}

/// Mutation requests effects hand back to the match controller
#[derive(Debug, Default)]
pub struct MatchRequests {
    /// Every brick damaged this tick with what it took
    pub brick_hits: Vec<(u32, DamageOutcome)>,
    /// Multiply velocities waiting for the current ball to clone itself
    pub clones: Vec<Vec2>,
    /// Fully built balls waiting for an id and registration
    pub spawns: Vec<Ball>,
    pub lives_gained: u32,
    pub triggered: Vec<EffectKind>,
}

/// What an effect hook may see and touch during one dispatch
pub struct EffectContext<'a> {
    pub bricks: &'a mut [Brick],
    pub paddle: &'a Paddle,
    pub field: &'a FieldConfig,
    pub rng: &'a mut SimRng,
    pub dt: f32,
    pub requests: &'a mut MatchRequests,
}

impl EffectContext<'_> {
    /// Uniform draw in [0, 1) compared against `chance`
    pub fn roll(&mut self, chance: f32) -> bool {
        self.rng.random::<f32>() < chance
    }

    /// Damage a brick by index, reporting any unit hits to the controller
    pub fn damage_brick(&mut self, index: usize, amount: f32) -> DamageOutcome {
        let Some(brick) = self.bricks.get_mut(index) else {
            log::warn!("Damage requested for missing brick index {}", index);
            return DamageOutcome::default();
        };
        let outcome = brick.take_damage(amount);
        if outcome.hits > 0 {
            self.requests.brick_hits.push((brick.id, outcome));
        }
        outcome
    }

    /// Damage every active brick within `radius` of the struck brick's center,
    /// the struck brick included
    fn explode(&mut self, struck: usize, radius: f32, damage: f32) {
        let Some(center) = self.bricks.get(struck).map(|b| b.pos) else {
            return;
        };
        for index in 0..self.bricks.len() {
            let brick = &self.bricks[index];
            if brick.active && brick.distance_to(center) <= radius {
                self.damage_brick(index, damage);
            }
        }
    }

    fn trigger(&mut self, kind: EffectKind) {
        log::debug!("Effect triggered: {}", kind.as_str());
        self.requests.triggered.push(kind);
    }
}
