//! Data-driven stage configuration
//!
//! A stage is loaded once, validated, and then owned by the game state.
//! Every section falls back to the stock values when omitted from JSON.

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::StageError;
use crate::consts::*;
use crate::sim::effects::Effect;

/// Play field bounds. Walls on the left, right and top; the killzone below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub half_width: f32,
    pub top: f32,
    pub killzone_y: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            half_width: FIELD_HALF_WIDTH,
            top: FIELD_TOP,
            killzone_y: KILLZONE_Y,
        }
    }
}

impl FieldConfig {
    /// Horizontal line halfway between the killzone and the top wall
    pub fn midline(&self) -> f32 {
        (self.top + self.killzone_y) / 2.0
    }

    /// Uniform point above the midline, inset by `margin` from every wall
    pub fn random_upper_point<R: Rng>(&self, rng: &mut R, margin: f32) -> Vec2 {
        let x_limit = (self.half_width - margin).max(0.0);
        let y_min = self.midline();
        let y_max = (self.top - margin).max(y_min);
        let x = if x_limit > 0.0 {
            rng.random_range(-x_limit..=x_limit)
        } else {
            0.0
        };
        let y = if y_max > y_min {
            rng.random_range(y_min..=y_max)
        } else {
            y_min
        };
        Vec2::new(x, y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Degrees
    pub max_bounce_angle: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            y: PADDLE_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            max_bounce_angle: PADDLE_MAX_BOUNCE_DEG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub damage: f32,
    /// Vertical gap between paddle center and an attached ball
    pub paddle_offset: f32,
    /// Effects every ball spawned by the controller starts with
    pub effects: Vec<Effect>,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            speed: BALL_SPEED,
            max_speed: BALL_MAX_SPEED,
            damage: BALL_DAMAGE,
            paddle_offset: BALL_PADDLE_OFFSET,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_lives: u32,
    /// Seconds spent in the life-lost state before the level resets
    pub life_lost_delay: f32,
    pub level: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            life_lost_delay: LIFE_LOST_DELAY,
            level: 1,
        }
    }
}

/// One brick placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickPlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Number of damage states; this is the brick's starting health
    pub states: u32,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default)]
    pub unbreakable: bool,
}

fn default_points() -> u32 {
    1
}

/// Complete description of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub field: FieldConfig,
    pub paddle: PaddleConfig,
    pub ball: BallConfig,
    pub rules: RulesConfig,
    pub bricks: Vec<BrickPlacement>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::grid(1)
    }
}

impl StageConfig {
    /// Parse and validate a stage from JSON
    pub fn from_json(json: &str) -> Result<Self, StageError> {
        let config: StageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a stage file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, StageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Standard layout for `level`: rows of bricks across the upper field,
    /// tougher toward the top, with an unbreakable pair from level 3 on
    pub fn grid(level: u32) -> Self {
        let field = FieldConfig::default();
        let rows = (4 + level / 2).min(7);
        let cols = 10u32;
        let gap = 0.1;
        let width = (field.half_width * 2.0 - gap * (cols + 1) as f32) / cols as f32;
        let height = 0.4;
        let top_row_y = field.top - 1.0;

        let mut bricks = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            let y = top_row_y - row as f32 * (height + gap);
            // Top rows take three hits, bottom rows one
            let states = (3 - (row * 3 / rows)).max(1);
            for col in 0..cols {
                let x = -field.half_width + gap + width / 2.0 + col as f32 * (width + gap);
                let unbreakable = level >= 3 && row == rows - 1 && (col == 2 || col == cols - 3);
                bricks.push(BrickPlacement {
                    x,
                    y,
                    width,
                    height,
                    states,
                    points: states * 10,
                    unbreakable,
                });
            }
        }

        Self {
            field,
            paddle: PaddleConfig::default(),
            ball: BallConfig::default(),
            rules: RulesConfig {
                level,
                ..RulesConfig::default()
            },
            bricks,
        }
    }

    /// Check everything the simulation relies on
    pub fn validate(&self) -> Result<(), StageError> {
        let field = &self.field;
        if !(field.half_width > 0.0) || !(field.top > field.killzone_y) {
            return Err(StageError::InvalidField {
                half_width: field.half_width,
                killzone_y: field.killzone_y,
                top: field.top,
            });
        }

        let paddle = &self.paddle;
        if !(paddle.width > 0.0) || !(paddle.speed > 0.0) {
            return Err(StageError::InvalidPaddle {
                width: paddle.width,
                speed: paddle.speed,
            });
        }
        if !(paddle.y > field.killzone_y && paddle.y < field.top) {
            return Err(StageError::PaddleOutsideField {
                y: paddle.y,
                bottom: field.killzone_y,
                top: field.top,
            });
        }

        let ball = &self.ball;
        if !(ball.radius > 0.0) {
            return Err(StageError::InvalidBallRadius(ball.radius));
        }
        if !(ball.speed > 0.0) || !(ball.speed <= ball.max_speed) {
            return Err(StageError::InvalidBallSpeed {
                speed: ball.speed,
                max_speed: ball.max_speed,
            });
        }
        for effect in &ball.effects {
            effect.validate()?;
        }

        if self.rules.starting_lives == 0 {
            return Err(StageError::NoLives);
        }

        if self.bricks.is_empty() {
            return Err(StageError::NoBricks);
        }
        for (index, brick) in self.bricks.iter().enumerate() {
            if !brick.unbreakable && brick.states == 0 {
                return Err(StageError::EmptyBrickStates { index });
            }
            if !(brick.width > 0.0 && brick.height > 0.0) {
                return Err(StageError::InvalidBrickSize { index });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;

    #[test]
    fn test_default_stage_is_valid() {
        let config = StageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bricks.len(), 40);
        assert!(config.bricks.iter().all(|b| !b.unbreakable));
    }

    #[test]
    fn test_grid_bricks_fit_field() {
        for level in 1..10 {
            let config = StageConfig::grid(level);
            assert!(config.validate().is_ok());
            for brick in &config.bricks {
                assert!(brick.x - brick.width / 2.0 >= -config.field.half_width);
                assert!(brick.x + brick.width / 2.0 <= config.field.half_width + 1e-4);
                assert!(brick.y < config.field.top);
                assert!(brick.y > config.field.midline());
            }
        }
        assert!(StageConfig::grid(3).bricks.iter().any(|b| b.unbreakable));
    }

    #[test]
    fn test_from_json_uses_defaults_for_missing_sections() {
        let json = r#"{
            "bricks": [
                { "x": 0.0, "y": 3.0, "width": 1.0, "height": 0.4, "states": 2 }
            ],
            "ball": { "effects": [ { "kind": "Pierce", "chance": 0.5 } ] }
        }"#;
        let config = StageConfig::from_json(json).expect("valid stage");
        assert_eq!(config.bricks[0].points, 1);
        assert!(!config.bricks[0].unbreakable);
        assert_eq!(config.paddle, PaddleConfig::default());
        assert_eq!(config.ball.effects[0].kind(), EffectKind::Pierce);
        assert_eq!(config.ball.speed, BALL_SPEED);
    }

    #[test]
    fn test_json_round_trip() {
        let config = StageConfig::grid(4);
        let json = config.to_json().expect("serializable");
        let parsed = StageConfig::from_json(&json).expect("valid stage");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = StageConfig::default();
        config.bricks[3].states = 0;
        assert!(matches!(
            config.validate(),
            Err(StageError::EmptyBrickStates { index: 3 })
        ));

        let mut config = StageConfig::default();
        config.bricks.clear();
        assert!(matches!(config.validate(), Err(StageError::NoBricks)));

        let mut config = StageConfig::default();
        config.paddle.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(StageError::InvalidPaddle { .. })
        ));

        let mut config = StageConfig::default();
        config.paddle.y = -20.0;
        assert!(matches!(
            config.validate(),
            Err(StageError::PaddleOutsideField { .. })
        ));

        let mut config = StageConfig::default();
        config.ball.speed = 20.0;
        assert!(matches!(
            config.validate(),
            Err(StageError::InvalidBallSpeed { .. })
        ));

        let mut config = StageConfig::default();
        config.ball.effects.push(Effect::Stick { chance: -0.1 });
        assert!(matches!(
            config.validate(),
            Err(StageError::InvalidChance { .. })
        ));

        assert!(matches!(
            StageConfig::from_json("{ not json"),
            Err(StageError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            StageConfig::from_file("/nonexistent/stage.json"),
            Err(StageError::Io(_))
        ));
    }

    #[test]
    fn test_unbreakable_brick_may_have_zero_states() {
        let mut config = StageConfig::default();
        config.bricks[0].states = 0;
        config.bricks[0].unbreakable = true;
        assert!(config.validate().is_ok());
    }
}
