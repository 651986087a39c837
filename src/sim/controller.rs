//! Match controller: lives, score, ball count and the phase machine
//!
//! These are the only operations allowed to change match-level state. The
//! tick calls them after the per-ball pass, once all collisions are resolved.

use super::ball::Ball;
use super::brick::DamageOutcome;
use super::state::{GameEvent, GameState, MatchPhase};
use crate::loadout::LoadoutProvider;

impl GameState {
    /// Give `ball` an id, add it to play and count it. Returns the new id.
    pub fn register_ball(&mut self, mut ball: Ball) -> u32 {
        let id = self.next_entity_id();
        ball.id = id;
        self.balls.push(ball);
        self.balls_in_play += 1;
        log::debug!("Ball {} registered ({} in play)", id, self.balls_in_play);
        id
    }

    /// Fresh ball on the paddle, dressed with the current loadout
    pub fn spawn_ball(&mut self, loadout: &dyn LoadoutProvider) -> u32 {
        let mut ball = Ball::new(0, &self.config.ball);
        if let Some(loadout) = loadout.loadout() {
            ball.trail_color = loadout.trail_color;
            if let Some(special) = loadout.special {
                match special.validate() {
                    Ok(()) => ball.effects.push(special),
                    Err(e) => log::warn!("Ignoring loadout special: {}", e),
                }
            }
        }
        ball.reset_ball(&self.paddle);
        self.register_ball(ball)
    }

    /// A ball left play. The last one out costs a life.
    pub fn on_ball_destroyed(&mut self) {
        // Clearing the field also removes every ball; that is not a miss
        if self.phase != MatchPhase::Playing {
            return;
        }
        debug_assert!(self.balls_in_play > 0, "ball destroyed with none in play");
        if self.balls_in_play == 0 {
            return;
        }
        self.balls_in_play -= 1;
        if self.balls_in_play == 0 {
            self.miss();
        }
    }

    /// Lose a life: wait out the delay and reset, or end the run
    pub fn miss(&mut self) {
        debug_assert!(self.lives > 0, "miss with no lives left");
        self.lives = self.lives.saturating_sub(1);

        if self.lives > 0 {
            self.phase = MatchPhase::LifeLostPending {
                remaining: self.config.rules.life_lost_delay,
            };
            self.events.push(GameEvent::LifeLost { lives: self.lives });
            log::info!("Life lost, {} remaining", self.lives);
        } else {
            self.phase = MatchPhase::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!("Game over with score {}", self.score);
        }
    }

    pub fn gain_life(&mut self) {
        self.lives += 1;
        log::debug!("Life gained, {} total", self.lives);
    }

    /// Score the unit hits a brick took and queue the notification
    pub fn on_brick_hit(&mut self, id: u32, outcome: DamageOutcome) {
        let Some(points) = self.brick(id).map(|b| b.points) else {
            log::warn!("Hit reported for unknown brick {}", id);
            return;
        };
        self.score += u64::from(points) * u64::from(outcome.hits);
        self.events.push(GameEvent::BrickHit {
            id,
            destroyed: outcome.destroyed,
        });
    }

    /// True once every breakable brick is inactive. A field with no breakable
    /// bricks never clears.
    pub fn is_cleared(&self) -> bool {
        let mut any_breakable = false;
        for brick in self.bricks.iter().filter(|b| b.counts_for_clear()) {
            if brick.active {
                return false;
            }
            any_breakable = true;
        }
        any_breakable
    }

    /// Enter `Cleared`: every ball leaves play and victory is announced
    pub fn clear_stage(&mut self) {
        self.phase = MatchPhase::Cleared;
        self.remove_all_balls();
        self.events.push(GameEvent::Victory { score: self.score });
        log::info!("Stage cleared with score {}", self.score);
    }

    /// Start the next attempt: fresh ball, centered paddle, back to `Playing`
    pub fn reset_level(&mut self, loadout: &dyn LoadoutProvider) {
        self.remove_all_balls();
        self.paddle.reset();
        self.phase = MatchPhase::Playing;
        self.spawn_ball(loadout);
        log::info!("Level {} reset", self.level);
    }

    /// Restore every brick, lives and score, then restart
    pub fn reset_stage(&mut self, loadout: &dyn LoadoutProvider) {
        for brick in &mut self.bricks {
            brick.reset();
        }
        self.lives = self.config.rules.starting_lives;
        self.score = 0;
        self.events.clear();
        self.reset_level(loadout);
    }

    fn remove_all_balls(&mut self) {
        for ball in &mut self.balls {
            ball.cancel_scheduled();
        }
        self.balls.clear();
        self.balls_in_play = 0;
    }
}
