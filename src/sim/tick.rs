//! Per-frame game loop step
//!
//! Picks this frame's gravity, advances the world and feeds the resulting
//! contact events into the state machine.

use glam::Vec2;

use super::body::BodyView;
use super::state::{GameEvent, GamePhase, GameState};
use crate::platform::{KeyState, MotionSample};

/// Everything the host polled for this frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Gravity chosen by the host itself; overrides sample and keys
    pub gravity: Option<Vec2>,
    /// Most recent motion sample, if the host has sensors
    pub sample: Option<MotionSample>,
    /// Arrow keys currently held
    pub keys: KeyState,
    /// Restart (tap or space). Only honoured once the game has ended.
    pub restart: bool,
}

/// Render-facing snapshot returned from every tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub phase: GamePhase,
    /// The ball, unless it has dropped into a losing hole
    pub ball: Option<BodyView>,
    pub gravity: Vec2,
    /// False when the host should show the "no orientation support" hint
    pub orientation_supported: bool,
    pub events: Vec<GameEvent>,
}

/// Advance the game by one frame of `dt_millis` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_millis: f32) -> Frame {
    state.events.clear();

    if input.restart && state.phase != GamePhase::Playing {
        state.reset();
    }

    // Finished games stay frozen until reset
    if state.phase == GamePhase::Playing {
        let gravity = choose_gravity(state, input);
        if state.world.set_gravity(gravity) {
            state.gravity_request = gravity;

            let max = state.settings.max_frame_seconds;
            let mut dt = dt_millis / 1000.0;
            if dt > max {
                log::debug!("Clamping long frame of {dt_millis}ms");
                dt = max;
            }

            let steps_before = state.world.stats().steps;
            let contacts = state
                .world
                .step(
                    dt,
                    state.settings.velocity_iterations,
                    state.settings.position_iterations,
                )
                .to_vec();
            if state.world.stats().steps > steps_before {
                state.time_ticks += 1;
            }
            state.handle_contacts(&contacts);
        }
    }

    frame(state)
}

/// Host override first, then the motion sample, then keyboard steering
fn choose_gravity(state: &GameState, input: &TickInput) -> Vec2 {
    if let Some(gravity) = input.gravity {
        return gravity;
    }
    if let Some(gravity) = input.sample.and_then(|s| state.mapper.map(s)) {
        return gravity;
    }
    input.keys.steer(
        state.gravity_request,
        state.settings.key_gravity,
        state.settings.key_gravity_ceiling,
    )
}

/// Snapshot the state for the renderer without advancing it
pub fn frame(state: &GameState) -> Frame {
    Frame {
        phase: state.phase,
        ball: if state.ball_alive {
            state.world.view(state.ball())
        } else {
            None
        },
        gravity: state.gravity_request,
        orientation_supported: state.mapper.supports_orientation(),
        events: state.events.clone(),
    }
}
