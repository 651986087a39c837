//! Sigil Breaker headless runner
//!
//! Plays one stage on autopilot and logs what happens.
//!
//! Usage: `sigil-breaker [stage.json|-] [seed] [effect] [difficulty]`
//! where `-` (or nothing) uses the standard level 1 grid and `effect` names
//! the equipped sigil's special, e.g. `Multiply`.

use std::process::ExitCode;

use sigil_breaker::consts::*;
use sigil_breaker::sim::{Collaborators, EffectKind, GameState, TickInput, tick};
use sigil_breaker::{FlowController, LoadoutProvider, NoLoadout, Presentation, Sigil, StageConfig, StageError};

/// Wall-clock frame length the runner pretends to render at
const FRAME_DT: f32 = 1.0 / 60.0;
/// Ten simulated minutes
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Logs presentation feedback and keeps a few run totals
#[derive(Default)]
struct Console {
    bricks_destroyed: u32,
    effects_triggered: u32,
}

impl Presentation for Console {
    fn on_brick_hit(&mut self, brick_id: u32, destroyed: bool) {
        if destroyed {
            self.bricks_destroyed += 1;
            log::debug!("Brick {} destroyed", brick_id);
        }
    }

    fn on_life_lost(&mut self, lives_left: u32) {
        log::info!("Ball lost, {} lives left", lives_left);
    }

    fn on_game_over(&mut self, score: u64) {
        log::info!("GAME OVER - score {}", score);
    }

    fn on_victory(&mut self, score: u64) {
        log::info!("VICTORY - score {}", score);
    }

    fn on_effect_triggered(&mut self, kind: EffectKind) {
        self.effects_triggered += 1;
        log::debug!("{} triggered", kind.as_str());
    }
}

#[derive(Default)]
struct SceneFlow {
    finished: bool,
}

impl FlowController for SceneFlow {
    fn on_game_over(&mut self) {
        self.finished = true;
    }

    fn on_victory(&mut self) {
        self.finished = true;
    }
}

fn load_stage(path: Option<&str>) -> Result<StageConfig, StageError> {
    match path {
        None | Some("-") => Ok(StageConfig::default()),
        Some(path) => {
            log::info!("Loading stage from {}", path);
            StageConfig::from_file(path)
        }
    }
}

fn parse_sigil(effect: Option<&str>, difficulty: Option<&str>) -> Option<Sigil> {
    let name = effect?;
    let Some(kind) = EffectKind::ALL
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(name))
    else {
        log::warn!("Unknown effect '{}', playing without a sigil", name);
        return None;
    };
    let mut sigil = Sigil::with_effect(kind);
    if let Some(difficulty) = difficulty.and_then(|d| d.parse().ok()) {
        sigil.difficulty = difficulty;
    }
    Some(sigil)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Sigil Breaker (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).map(String::as_str);

    let mut config = match load_stage(arg(0)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Stage load failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let seed = arg(1).and_then(|s| s.parse().ok()).unwrap_or(0x5eed);

    let sigil = parse_sigil(arg(2), arg(3));
    if let Some(sigil) = &sigil {
        sigil.tune_ball(&mut config.ball);
        log::info!("Equipped sigil {} (difficulty {})", sigil.name, sigil.difficulty);
    }
    let loadout: &dyn LoadoutProvider = match &sigil {
        Some(sigil) => sigil,
        None => &NoLoadout,
    };

    let mut state = match GameState::new(config, seed, loadout) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Stage load failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::default();
    let mut flow = SceneFlow::default();
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut accumulator = 0.0;
    for _ in 0..MAX_FRAMES {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut collab = Collaborators {
                loadout,
                presentation: &mut console,
                flow: &mut flow,
            };
            tick(&mut state, &input, SIM_DT, &mut collab);
            accumulator -= SIM_DT;
            substeps += 1;
        }
        // Cleared settles into Victory on the following tick
        if state.phase.is_terminal() {
            break;
        }
    }

    let snapshot = state.snapshot();
    log::info!(
        "Finished after {} ticks: phase {:?}, score {}, lives {}, {} bricks destroyed, {} effect triggers",
        snapshot.tick,
        snapshot.phase,
        snapshot.score,
        snapshot.lives,
        console.bricks_destroyed,
        console.effects_triggered
    );
    if !flow.finished {
        log::warn!("Tick budget exhausted before the match ended");
    }
    ExitCode::SUCCESS
}
