//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ball;
pub mod brick;
pub mod collision;
pub mod controller;
pub mod effects;
pub mod paddle;
pub mod schedule;
pub mod state;
pub mod tick;

/// The one random source of a match, seeded from the run seed
pub type SimRng = rand_pcg::Pcg32;

pub use ball::Ball;
pub use brick::{Brick, DamageOutcome};
pub use collision::{CollisionEvent, ContactKind, detect, resolve};
pub use effects::{Effect, EffectKind};
pub use paddle::{Paddle, PaddleIntent};
pub use schedule::{ScheduledEffect, TimedEffect};
pub use state::{GameEvent, GameState, MatchPhase, Snapshot};
pub use tick::{Collaborators, TickInput, tick};
