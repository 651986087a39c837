//! Fixed timestep simulation tick
//!
//! Core game loop that advances the match deterministically. Within a tick:
//! paddle move, then per ball (pre-physics update, integrate, collision
//! detection, resolution and effect hooks, timer expiry), then the queued
//! spawns and damage reports, the clear check, the ball-count check, and
//! finally notification dispatch.

use super::collision::{detect, resolve};
use super::effects::{EffectContext, MatchRequests};
use super::paddle::PaddleIntent;
use super::state::{GameEvent, GameState, MatchPhase};
use crate::hooks::{FlowController, Presentation};
use crate::loadout::LoadoutProvider;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Paddle direction intent
    pub paddle: PaddleIntent,
    /// Launch attached balls
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - AI plays the game
    pub autopilot: bool,
}

/// Everything outside the simulation the tick talks to
pub struct Collaborators<'a> {
    pub loadout: &'a dyn LoadoutProvider,
    pub presentation: &'a mut dyn Presentation,
    pub flow: &'a mut dyn FlowController,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, collab: &mut Collaborators<'_>) {
    // Handle pause toggle
    if input.pause && !state.phase.is_terminal() {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
        if state.paused {
            return;
        }
    }

    // Don't tick if paused or finished
    if state.paused || state.phase.is_terminal() {
        return;
    }

    if state.phase == MatchPhase::Cleared {
        state.phase = MatchPhase::Victory;
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    let input = &input;

    state.time_ticks += 1;
    let half_field = state.config.field.half_width;
    state.paddle.move_with(input.paddle, dt, half_field);

    match state.phase {
        MatchPhase::LifeLostPending { remaining } => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                state.reset_level(collab.loadout);
            } else {
                state.phase = MatchPhase::LifeLostPending { remaining };
            }
        }
        MatchPhase::Playing => {
            if input.launch {
                for ball in state.balls.iter_mut().filter(|b| !b.is_launched) {
                    ball.launch(&mut state.rng);
                }
            }

            let requests = step_balls(state, dt);
            apply_requests(state, requests);

            // Balls that fell out count against the player unless the field just cleared
            let lost = state.balls.iter().filter(|b| b.destroyed).count();
            state.balls.retain(|b| !b.destroyed);
            for _ in 0..lost {
                state.on_ball_destroyed();
            }

            state.normalize_order();
        }
        MatchPhase::GameOver | MatchPhase::Cleared | MatchPhase::Victory => {}
    }

    dispatch_events(state, collab);
}

/// Per-ball pass. Effects queue their controller-level changes on the returned requests.
fn step_balls(state: &mut GameState, dt: f32) -> MatchRequests {
    let mut requests = MatchRequests::default();
    let GameState {
        balls,
        bricks,
        paddle,
        config,
        rng,
        ..
    } = state;

    for ball in balls.iter_mut() {
        let mut ctx = EffectContext {
            bricks: bricks.as_mut_slice(),
            paddle: &*paddle,
            field: &config.field,
            rng: &mut *rng,
            dt,
            requests: &mut requests,
        };

        ball.update(&mut ctx);

        if ball.is_launched {
            ball.unstall(&mut *ctx.rng);
            ball.pos += ball.vel * dt;

            let events = detect(ball, ctx.paddle, ctx.bricks, ctx.field);
            if !events.is_empty() {
                resolve(ball, &events, &mut ctx);
            }
        }

        ball.advance_timers(dt);
    }

    requests
}

fn apply_requests(state: &mut GameState, requests: MatchRequests) {
    for ball in requests.spawns {
        let id = state.register_ball(ball);
        log::debug!("Multiply spawned ball {}", id);
    }

    for _ in 0..requests.lives_gained {
        state.gain_life();
    }

    let mut destroyed_any = false;
    for (id, outcome) in requests.brick_hits {
        destroyed_any |= outcome.destroyed;
        state.on_brick_hit(id, outcome);
    }

    for kind in requests.triggered {
        state.events.push(GameEvent::EffectTriggered(kind));
    }

    if destroyed_any && state.is_cleared() {
        state.clear_stage();
    }
}

/// Hand queued notifications to the collaborators, in the order they happened
fn dispatch_events(state: &mut GameState, collab: &mut Collaborators<'_>) {
    for event in state.events.drain(..) {
        match event {
            GameEvent::BrickHit { id, destroyed } => collab.presentation.on_brick_hit(id, destroyed),
            GameEvent::LifeLost { lives } => collab.presentation.on_life_lost(lives),
            GameEvent::GameOver { score } => {
                collab.presentation.on_game_over(score);
                collab.flow.on_game_over();
            }
            GameEvent::Victory { score } => {
                collab.presentation.on_victory(score);
                collab.flow.on_victory();
            }
            GameEvent::EffectTriggered(kind) => collab.presentation.on_effect_triggered(kind),
        }
    }
}

/// Demo player: launch whenever a ball waits on the paddle, then chase the
/// ball that will reach the paddle first
fn autopilot(state: &GameState, input: &mut TickInput) {
    if state.balls.iter().any(|b| !b.is_launched) {
        input.launch = true;
    }

    let paddle = &state.paddle;
    let field = &state.config.field;

    // Most dangerous ball: descending and lowest
    let target = state
        .balls
        .iter()
        .filter(|b| b.is_launched && b.vel.y < 0.0)
        .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        .or_else(|| {
            state
                .balls
                .iter()
                .filter(|b| b.is_launched)
                .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        });

    let Some(ball) = target else {
        input.paddle = PaddleIntent::None;
        return;
    };

    // Lead the ball to where it crosses the paddle line
    let mut target_x = ball.pos.x;
    if ball.vel.y < 0.0 {
        let time_to_paddle = (ball.pos.y - paddle.top()) / -ball.vel.y;
        target_x += ball.vel.x * time_to_paddle.max(0.0);
    }

    // Oscillating offset so rallies don't loop forever
    let time_factor = state.time_ticks as f32 * 0.01;
    let offset = (time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15) * paddle.half_width();
    let target_x = (target_x + offset).clamp(-field.half_width, field.half_width);

    let dead_zone = paddle.speed * crate::consts::SIM_DT;
    input.paddle = if target_x > paddle.pos.x + dead_zone {
        PaddleIntent::Right
    } else if target_x < paddle.pos.x - dead_zone {
        PaddleIntent::Left
    } else {
        PaddleIntent::None
    };
}
