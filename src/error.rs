//! Stage load errors
//!
//! Anything wrong with a stage is caught before the first tick. Gameplay
//! itself never returns errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Could not read stage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stage JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stage has no bricks")]
    NoBricks,

    #[error("Breakable brick {index} has no damage states")]
    EmptyBrickStates { index: usize },

    #[error("Brick {index} has a non-positive size")]
    InvalidBrickSize { index: usize },

    #[error("Paddle is missing: width {width} and speed {speed} must both be positive")]
    InvalidPaddle { width: f32, speed: f32 },

    #[error("Paddle at y={y} lies outside the field ({bottom}..{top})")]
    PaddleOutsideField { y: f32, bottom: f32, top: f32 },

    #[error("Field is degenerate: half width {half_width}, killzone {killzone_y}, top {top}")]
    InvalidField {
        half_width: f32,
        killzone_y: f32,
        top: f32,
    },

    #[error("Ball speed {speed} must be positive and no greater than max speed {max_speed}")]
    InvalidBallSpeed { speed: f32, max_speed: f32 },

    #[error("Ball radius {0} must be positive")]
    InvalidBallRadius(f32),

    #[error("Effect {effect} has activation chance {chance} outside [0, 1]")]
    InvalidChance { effect: &'static str, chance: f32 },

    #[error("Effect {effect} has a non-positive duration {duration}")]
    InvalidDuration { effect: &'static str, duration: f32 },

    #[error("Starting lives must be at least 1")]
    NoLives,
}
