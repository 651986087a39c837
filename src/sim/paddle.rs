//! The player's paddle and its bounce geometry

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Horizontal movement intent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaddleIntent {
    Left,
    Right,
    #[default]
    None,
}

impl PaddleIntent {
    fn sign(self) -> f32 {
        match self {
            PaddleIntent::Left => -1.0,
            PaddleIntent::Right => 1.0,
            PaddleIntent::None => 0.0,
        }
    }
}

/// The player's paddle. Moves horizontally only; `pos.y` never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    /// Horizontal velocity from the last move
    pub vel_x: f32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Maximum deflection from vertical, in degrees
    pub max_bounce_angle: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(0.0, PADDLE_Y),
            vel_x: 0.0,
            speed: PADDLE_SPEED,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            max_bounce_angle: PADDLE_MAX_BOUNCE_DEG,
        }
    }
}

impl Paddle {
    /// Back to field center, at rest
    pub fn reset(&mut self) {
        self.pos.x = 0.0;
        self.vel_x = 0.0;
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Top surface y
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y + self.height / 2.0
    }

    /// Move according to the intent, keeping the paddle inside `[-half_field, half_field]`
    pub fn move_with(&mut self, intent: PaddleIntent, dt: f32, half_field: f32) {
        self.vel_x = intent.sign() * self.speed;
        let limit = (half_field - self.half_width()).max(0.0);
        self.pos.x = (self.pos.x + self.vel_x * dt).clamp(-limit, limit);
    }

    /// Signed bounce angle in degrees for a contact at `contact_x`
    pub fn bounce_angle(&self, contact_x: f32) -> f32 {
        bounce_angle_deg(contact_x - self.pos.x, self.half_width(), self.max_bounce_angle)
    }

    /// Outgoing ball velocity for a contact at `contact_x`, at the ball's own speed
    pub fn bounce_velocity(&self, contact_x: f32, ball_speed: f32) -> Vec2 {
        bounce_direction(self.bounce_angle(contact_x)) * ball_speed
    }
}

/// `offset / half_width * max_angle`, clamped to `[-max_angle, max_angle]`
pub fn bounce_angle_deg(offset: f32, half_width: f32, max_angle: f32) -> f32 {
    if half_width <= 0.0 {
        return 0.0;
    }
    (offset / half_width * max_angle).clamp(-max_angle, max_angle)
}

/// `normalize(sin(angle), 1)`: straight up at 0°, tilted toward the contact side otherwise
pub fn bounce_direction(angle_deg: f32) -> Vec2 {
    Vec2::new(angle_deg.to_radians().sin(), 1.0).normalize()
}
