//! Game state and the win/lose state machine
//!
//! `GameState` owns the physics world and the board's body handles. Phase
//! changes happen only in response to Begin contacts between the ball and
//! a hole, or to an explicit reset.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::BoardLayout;
use super::body::BodyId;
use super::contact::{ContactEvent, ContactKind};
use super::world::World;
use crate::error::ConfigError;
use crate::platform::InputMapper;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball rolling, tilt applies
    Playing,
    /// Ball dropped into a losing hole
    Lost,
    /// Ball reached the win hole
    Won,
}

/// Notable things that happened during a tick, for hosts to react to
/// (sounds, overlays)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Ball fell into the losing hole with this body id
    Lost { hole: BodyId },
    Won,
    /// Board was reset after a finished game
    Reset,
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) phase: GamePhase,
    pub(crate) world: World,
    pub(crate) settings: Settings,
    pub(crate) mapper: InputMapper,
    /// Gravity the player is currently asking for
    pub(crate) gravity_request: Vec2,
    /// False once the ball has dropped into a losing hole
    pub(crate) ball_alive: bool,
    /// Ticks that actually advanced the world
    pub(crate) time_ticks: u64,
    /// Events raised by the latest tick
    pub(crate) events: Vec<GameEvent>,
    ball: BodyId,
    ball_start: Vec2,
    win_hole: BodyId,
    holes: Vec<BodyId>,
}

impl GameState {
    /// Build the world from a layout. Fails before any stepping if the
    /// layout or settings are invalid.
    pub fn new(
        layout: &BoardLayout,
        settings: Settings,
        mapper: InputMapper,
    ) -> Result<Self, ConfigError> {
        layout.validate()?;
        settings.validate()?;

        // Settings are the single source for the accelerometer convention
        let mut mapper = mapper;
        if mapper.convention != settings.accel_convention {
            log::debug!(
                "Using {} accelerometer convention from settings",
                settings.accel_convention.as_str()
            );
            mapper.convention = settings.accel_convention;
        }

        let mut world = World::new(Vec2::ZERO);
        for wall in &layout.walls {
            world.create_body(wall.body_def())?;
        }
        let holes = layout
            .holes
            .iter()
            .map(|hole| world.create_body(hole.body_def()))
            .collect::<Result<Vec<_>, _>>()?;
        let win_hole = world.create_body(layout.win_hole.body_def())?;
        let ball = world.create_body(layout.ball.body_def())?;

        log::info!(
            "Board ready: {} walls, {} holes, ball at {}",
            layout.walls.len(),
            holes.len(),
            layout.ball.start
        );

        Ok(Self {
            phase: GamePhase::Playing,
            world,
            settings,
            mapper,
            gravity_request: Vec2::ZERO,
            ball_alive: true,
            time_ticks: 0,
            events: Vec::new(),
            ball,
            ball_start: layout.ball.start,
            win_hole,
            holes,
        })
    }

    /// Build from a JSON layout
    pub fn from_json(
        layout_json: &str,
        settings: Settings,
        mapper: InputMapper,
    ) -> Result<Self, ConfigError> {
        Self::new(&BoardLayout::from_json(layout_json)?, settings, mapper)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Read-only view of the physics world
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mapper(&self) -> InputMapper {
        self.mapper
    }

    pub fn gravity_request(&self) -> Vec2 {
        self.gravity_request
    }

    pub fn ball_alive(&self) -> bool {
        self.ball_alive
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Move the ball to `pos` at rest, for scripted demos and level
    /// editors. The phase is left alone; a hole under `pos` ends the game
    /// on the next tick.
    pub fn place_ball(&mut self, pos: Vec2) -> bool {
        self.world.teleport(self.ball, pos)
    }

    pub fn ball(&self) -> BodyId {
        self.ball
    }

    pub fn ball_start(&self) -> Vec2 {
        self.ball_start
    }

    pub fn win_hole(&self) -> BodyId {
        self.win_hole
    }

    pub fn holes(&self) -> &[BodyId] {
        &self.holes
    }

    /// Put the ball back at its start and resume play. Calling it again
    /// right away changes nothing.
    pub fn reset(&mut self) {
        self.world.teleport(self.ball, self.ball_start);
        self.world.clear_contacts();
        self.gravity_request = Vec2::ZERO;
        self.world.set_gravity(Vec2::ZERO);
        self.ball_alive = true;

        if self.phase != GamePhase::Playing {
            log::info!("Reset after {:?}", self.phase);
            self.phase = GamePhase::Playing;
            self.events.push(GameEvent::Reset);
        }
    }

    /// Apply one step's contact events. The win hole is checked across the
    /// whole batch before any losing hole, so touching both at once wins.
    pub fn handle_contacts(&mut self, contacts: &[ContactEvent]) {
        if self.phase != GamePhase::Playing {
            return;
        }

        let ball = self.ball;
        let touched: Vec<BodyId> = contacts
            .iter()
            .filter(|e| e.kind == ContactKind::Begin)
            .filter_map(|e| e.pair.other(ball))
            .collect();

        if touched.contains(&self.win_hole) {
            self.finish(GamePhase::Won);
            self.events.push(GameEvent::Won);
        } else if let Some(&hole) = touched.iter().find(|id| self.holes.contains(id)) {
            self.finish(GamePhase::Lost);
            self.ball_alive = false;
            self.events.push(GameEvent::Lost { hole });
        }
    }

    /// Leave Playing: stop the ball dead and drop all gravity so it stays
    /// where the hole caught it
    fn finish(&mut self, phase: GamePhase) {
        log::info!("Game over: {:?} after {} ticks", phase, self.time_ticks);
        self.phase = phase;
        self.gravity_request = Vec2::ZERO;
        self.world.set_gravity(Vec2::ZERO);
        self.world.set_velocity(self.ball, Vec2::ZERO, 0.0);
    }
}
