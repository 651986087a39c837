//! Collaborator traits the simulation reports to
//!
//! The simulation never waits on these. Every method has a no-op default so
//! a collaborator only implements what it cares about.

use crate::sim::effects::EffectKind;

/// Feedback sink for rendering, sound and VFX
pub trait Presentation {
    /// A brick took one or more unit hits
    fn on_brick_hit(&mut self, _brick_id: u32, _destroyed: bool) {}

    /// A life was lost and the level will reset after the delay
    fn on_life_lost(&mut self, _lives_left: u32) {}

    fn on_game_over(&mut self, _score: u64) {}

    fn on_victory(&mut self, _score: u64) {}

    fn on_effect_triggered(&mut self, _kind: EffectKind) {}
}

/// Scene flow: called at most once per match, on the terminal transition
pub trait FlowController {
    fn on_game_over(&mut self) {}

    fn on_victory(&mut self) {}
}

/// Ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

impl Presentation for NullHooks {}

impl FlowController for NullHooks {}
