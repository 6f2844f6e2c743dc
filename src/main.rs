//! Tilt Maze headless demo host
//!
//! Real hosts (browser, mobile) own the window, sensors and sprites. This
//! one builds a board, steers the ball with a scripted key sequence at the
//! game's 30 fps and logs what happens.
//!
//! Usage: `tilt-maze [layout.json]`

use std::process::ExitCode;

use tilt_maze::consts::FRAME_DT;
use tilt_maze::platform::{InputMapper, KeyState};
use tilt_maze::sim::{BoardLayout, GamePhase, GameState, TickInput, tick};
use tilt_maze::{ConfigError, Settings};

/// Seconds of play before the demo gives up
const DEMO_SECONDS: f32 = 60.0;

fn load_layout(path: Option<String>) -> Result<BoardLayout, ConfigError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|err| {
                ConfigError::MalformedLayout(format!("cannot read {path}: {err}"))
            })?;
            BoardLayout::from_json(&json)
        }
        None => Ok(BoardLayout::classic(768.0, 1024.0)),
    }
}

/// Hold each direction for two seconds, cycling down, right, up, left
fn scripted_keys(frame: u32) -> KeyState {
    let phase = (frame as f32 * FRAME_DT / 2.0) as u32 % 4;
    KeyState {
        down: phase == 0,
        right: phase == 1,
        up: phase == 2,
        left: phase == 3,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tilt Maze (headless) starting...");

    let layout = match load_layout(std::env::args().nth(1)) {
        Ok(layout) => layout,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let mut state = match GameState::new(&layout, Settings::default(), InputMapper::default()) {
        Ok(state) => state,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let frames = (DEMO_SECONDS / FRAME_DT) as u32;
    let frame_ms = FRAME_DT * 1000.0;
    for n in 0..frames {
        let input = TickInput {
            keys: scripted_keys(n),
            ..Default::default()
        };
        let frame = tick(&mut state, &input, frame_ms);
        if let Some(ball) = frame.ball.filter(|_| n % 30 == 0) {
            log::debug!("t={:.1}s ball at {}", n as f32 * FRAME_DT, ball.pos);
        }
        if frame.phase != GamePhase::Playing {
            log::info!("{:?} after {:.1}s", frame.phase, n as f32 * FRAME_DT);
            break;
        }
    }

    let stats = state.world().stats();
    log::info!(
        "Finished: phase={:?} steps={} skipped={} bullet_substeps={}",
        state.phase(),
        stats.steps,
        stats.skipped_steps,
        stats.bullet_substeps
    );
    ExitCode::SUCCESS
}
