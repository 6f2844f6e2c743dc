//! Collision shapes
//!
//! Two primitives are enough for the maze: axis-aligned boxes for walls and
//! circles for the ball and the holes. Shapes are described in body-local
//! space, centred on the body position.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Geometric boundary attached to a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned box given by its half extents
    Box { half_width: f32, half_height: f32 },
    Circle { radius: f32 },
}

impl Shape {
    /// Box from full width and height
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Box {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Reject zero, negative and non-finite dimensions
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Shape::Box {
                half_width,
                half_height,
            } if !ok(half_width) || !ok(half_height) => Err(ConfigError::InvalidShape {
                what: format!("box half extents {half_width} x {half_height}"),
            }),
            Shape::Circle { radius } if !ok(radius) => Err(ConfigError::InvalidShape {
                what: format!("circle radius {radius}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn area(&self) -> f32 {
        match *self {
            Shape::Box {
                half_width,
                half_height,
            } => 4.0 * half_width * half_height,
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
        }
    }

    /// Rotational inertia about the centre for a given mass
    pub fn inertia(&self, mass: f32) -> f32 {
        match *self {
            Shape::Box {
                half_width,
                half_height,
            } => mass * (half_width * half_width + half_height * half_height) / 3.0,
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
        }
    }

    /// Half of the smallest extent; bullets never move further than this
    /// in one sub-step
    pub fn min_half_extent(&self) -> f32 {
        match *self {
            Shape::Box {
                half_width,
                half_height,
            } => half_width.min(half_height),
            Shape::Circle { radius } => radius,
        }
    }

    /// World-space bounding box when centred at `pos`
    pub fn aabb(&self, pos: Vec2) -> Aabb {
        let half = match *self {
            Shape::Box {
                half_width,
                half_height,
            } => Vec2::new(half_width, half_height),
            Shape::Circle { radius } => Vec2::splat(radius),
        };
        Aabb {
            min: pos - half,
            max: pos + half,
        }
    }
}

/// Axis-aligned bounding box used by the broad phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Overlap test; touching edges count as overlapping
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}
