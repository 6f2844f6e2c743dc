//! Tilt Maze - a tilt-controlled ball maze game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rigid bodies, collisions, game state)
//! - `platform`: Input mapping (device tilt / keyboard to gravity)
//! - `settings`: Data-driven tuning of the solver and controls
//! - `error`: Configuration and invariant errors

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, InvariantViolation};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Frame rate hosts drive the loop at
    pub const TARGET_FPS: f32 = 30.0;
    /// Nominal frame duration in seconds
    pub const FRAME_DT: f32 = 1.0 / TARGET_FPS;

    /// Solver quality knobs
    pub const VELOCITY_ITERATIONS: u32 = 10;
    pub const POSITION_ITERATIONS: u32 = 8;

    /// Screen pixels per world unit. Only hosts (and the classic layout
    /// builder, which starts from a pixel viewport) use this.
    pub const PIXELS_PER_UNIT: f32 = 15.0;

    /// Allowed penetration before positional correction kicks in
    pub const LINEAR_SLOP: f32 = 0.005;
    /// Fraction of the remaining penetration removed per position pass
    pub const BAUMGARTE: f32 = 0.2;
    /// Largest positional correction applied in a single pass
    pub const MAX_CORRECTION: f32 = 0.2;
    /// Approach speed below which collisions are treated as inelastic
    pub const VELOCITY_THRESHOLD: f32 = 1.0;
    /// Upper bound on bullet sub-steps per world step
    pub const MAX_BULLET_SUBSTEPS: u32 = 8;

    /// Earth gravity, used to normalise accelerometer samples
    pub const EARTH_GRAVITY: f32 = 9.81;

    /// Keyboard steering: gravity magnitude per axis and the ceiling the
    /// opposite direction must be under before a key takes effect
    pub const KEY_GRAVITY: f32 = 2.5;
    pub const KEY_GRAVITY_CEILING: f32 = 10.0;
}

/// 2D cross product of two vectors (z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar (angular velocity) with a vector
#[inline]
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}
