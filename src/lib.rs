//! Sigil Breaker - gameplay core for a ball and paddle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, effects, match state)
//! - `tuning`: Data-driven stage configuration
//! - `loadout`: Equipped sigil supplied to every spawned ball
//! - `hooks`: Presentation and scene-flow collaborator traits

pub mod error;
pub mod hooks;
pub mod loadout;
pub mod sim;
pub mod tuning;

pub use error::StageError;
pub use hooks::{FlowController, NullHooks, Presentation};
pub use loadout::{Loadout, LoadoutProvider, NoLoadout, Sigil};
pub use tuning::StageConfig;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (world units, origin at field center)
    pub const FIELD_HALF_WIDTH: f32 = 8.0;
    pub const FIELD_TOP: f32 = 5.0;
    pub const KILLZONE_Y: f32 = -5.0;

    /// Paddle defaults
    pub const PADDLE_Y: f32 = -4.0;
    pub const PADDLE_WIDTH: f32 = 2.0;
    pub const PADDLE_HEIGHT: f32 = 0.3;
    pub const PADDLE_SPEED: f32 = 30.0;
    pub const PADDLE_MAX_BOUNCE_DEG: f32 = 75.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.2;
    pub const BALL_SPEED: f32 = 10.0;
    pub const BALL_MAX_SPEED: f32 = 15.0;
    pub const BALL_DAMAGE: f32 = 1.0;
    /// Vertical distance from paddle center to an attached ball
    pub const BALL_PADDLE_OFFSET: f32 = 0.5;
    /// Below this speed a launched ball is considered stalled
    pub const BALL_STALL_EPSILON: f32 = 0.01;

    /// Magnet pull rate toward the paddle x (per second)
    pub const MAGNET_RATE: f32 = 2.5;
    /// Homing steer rate toward the nearest brick (per second)
    pub const HOMING_RATE: f32 = 2.0;

    /// Match defaults
    pub const STARTING_LIVES: u32 = 3;
    /// Seconds between losing a life and the level reset
    pub const LIFE_LOST_DELAY: f32 = 1.5;
}

/// Rotate a vector counter-clockwise by `degrees`
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Rescale `vel` down to `max_speed` when it is faster. Slower velocities are untouched.
///
/// The comparison allows float rounding so clamping a clamped vector is a no-op.
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    const ROUNDING: f32 = 1e-5;
    if vel.length() > max_speed * (1.0 + ROUNDING) {
        vel.normalize_or_zero() * max_speed
    } else {
        vel
    }
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
