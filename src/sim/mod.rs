//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - dt is always supplied by the caller, never read from a clock
//! - Stable iteration order (by body id, then by contact pair)
//! - No rendering or platform dependencies

pub mod board;
pub mod body;
pub mod collision;
pub mod contact;
pub mod shape;
pub mod state;
pub mod tick;
pub mod world;

pub use board::{BallDef, BoardLayout, HoleDef, WallDef};
pub use body::{Body, BodyDef, BodyId, BodyKind, BodyView, Material};
pub use collision::{Manifold, collide};
pub use contact::{ContactEvent, ContactKind, ContactPair};
pub use shape::{Aabb, Shape};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Frame, TickInput, frame, tick};
pub use world::{Contact, StepStats, World};
