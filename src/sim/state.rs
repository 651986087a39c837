//! Match state and the read-only snapshot handed to the presentation layer
//!
//! `GameState` owns every shared collection: bricks, balls, lives and score.
//! Effects and entities reach it only through the requests the tick applies.

use glam::Vec2;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::ball::Ball;
use super::brick::Brick;
use super::effects::EffectKind;
use super::paddle::Paddle;
use crate::StageError;
use crate::loadout::LoadoutProvider;
use crate::tuning::{PaddleConfig, StageConfig};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Active gameplay (balls may still be attached to the paddle)
    Playing,
    /// All balls lost, waiting `remaining` seconds before the level resets
    LifeLostPending { remaining: f32 },
    /// Run ended
    GameOver,
    /// Every breakable brick is down; becomes `Victory` on the next tick
    Cleared,
    Victory,
}

impl MatchPhase {
    /// No further simulation happens in a terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchPhase::GameOver | MatchPhase::Victory)
    }
}

/// Discrete notifications queued during a tick and dispatched at its end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickHit { id: u32, destroyed: bool },
    LifeLost { lives: u32 },
    GameOver { score: u64 },
    Victory { score: u64 },
    EffectTriggered(EffectKind),
}

/// Complete match state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: SimRng,
    /// Validated stage this match was built from
    pub config: StageConfig,
    pub level: u32,
    pub lives: u32,
    /// Never decreases within an attempt
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: MatchPhase,
    pub paused: bool,
    /// Balls currently alive and registered with the controller
    pub balls_in_play: u32,
    pub paddle: Paddle,
    /// Active balls (sorted by id for determinism)
    pub balls: Vec<Ball>,
    /// Bricks in stage order (ids ascending)
    pub bricks: Vec<Brick>,
    /// Notifications waiting for dispatch
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Validate `config` and set up the first attempt with a ball on the paddle
    pub fn new(
        config: StageConfig,
        seed: u64,
        loadout: &dyn LoadoutProvider,
    ) -> Result<Self, StageError> {
        config.validate()?;

        let mut state = Self {
            seed,
            rng: SimRng::seed_from_u64(seed),
            level: config.rules.level,
            lives: config.rules.starting_lives,
            score: 0,
            time_ticks: 0,
            phase: MatchPhase::Playing,
            paused: false,
            balls_in_play: 0,
            paddle: paddle_from_config(&config.paddle),
            balls: Vec::new(),
            bricks: Vec::with_capacity(config.bricks.len()),
            events: Vec::new(),
            next_id: 1,
            config,
        };

        for index in 0..state.config.bricks.len() {
            let id = state.next_entity_id();
            let placed = &state.config.bricks[index];
            state.bricks.push(Brick::new(
                id,
                Vec2::new(placed.x, placed.y),
                Vec2::new(placed.width, placed.height),
                placed.states,
                placed.points,
                placed.unbreakable,
            ));
        }

        state.spawn_ball(loadout);
        log::info!(
            "Stage loaded: level {}, {} bricks, {} lives, seed {}",
            state.level,
            state.bricks.len(),
            state.lives,
            seed
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ensure balls and bricks are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.bricks.sort_by_key(|b| b.id);
    }

    pub fn brick(&self, id: u32) -> Option<&Brick> {
        self.bricks.iter().find(|b| b.id == id)
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.time_ticks,
            score: self.score,
            lives: self.lives,
            level: self.level,
            phase: self.phase,
            paddle_x: self.paddle.pos.x,
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    pos: b.pos,
                    vel: b.vel,
                    radius: b.collision_radius(),
                    attached: b.attached_to_paddle,
                    trail_color: b.trail_color,
                })
                .collect(),
            bricks: self
                .bricks
                .iter()
                .map(|b| BrickView {
                    id: b.id,
                    pos: b.pos,
                    size: b.size,
                    health: b.health,
                    damage_tier: b.damage_tier(),
                    active: b.active,
                    unbreakable: b.unbreakable,
                })
                .collect(),
        }
    }
}

fn paddle_from_config(config: &PaddleConfig) -> Paddle {
    Paddle {
        pos: Vec2::new(0.0, config.y),
        vel_x: 0.0,
        speed: config.speed,
        width: config.width,
        height: config.height,
        max_bounce_angle: config.max_bounce_angle,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub attached: bool,
    pub trail_color: Option<[f32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickView {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u32,
    pub damage_tier: u32,
    pub active: bool,
    pub unbreakable: bool,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub phase: MatchPhase,
    pub paddle_x: f32,
    pub balls: Vec<BallView>,
    pub bricks: Vec<BrickView>,
}
