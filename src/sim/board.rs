//! Declarative board layouts
//!
//! A board is pure data: wall rectangles, losing holes, the win hole and the
//! ball's start. It can be loaded from JSON or built with
//! [`BoardLayout::classic`], the maze the game ships with.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyDef, BodyKind, Material};
use super::shape::Shape;
use crate::consts::PIXELS_PER_UNIT;
use crate::error::ConfigError;

/// A static wall, given by centre and full size in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallDef {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub name: Option<String>,
}

/// A circular pocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleDef {
    pub center: Vec2,
    pub radius: f32,
    #[serde(default)]
    pub name: Option<String>,
    /// Sensor holes let the ball roll over them without a bump
    #[serde(default)]
    pub sensor: bool,
}

/// The player's ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallDef {
    pub start: Vec2,
    pub radius: f32,
    #[serde(default = "BallDef::default_density")]
    pub density: f32,
    #[serde(default = "BallDef::default_friction")]
    pub friction: f32,
    #[serde(default = "BallDef::default_restitution")]
    pub restitution: f32,
    #[serde(default = "BallDef::default_linear_damping")]
    pub linear_damping: f32,
    #[serde(default = "BallDef::default_angular_damping")]
    pub angular_damping: f32,
}

impl BallDef {
    fn default_density() -> f32 {
        5.0
    }
    fn default_friction() -> f32 {
        0.3
    }
    fn default_restitution() -> f32 {
        0.4
    }
    /// Keeps the ball from rolling forever without a tilt
    fn default_linear_damping() -> f32 {
        0.15
    }
    fn default_angular_damping() -> f32 {
        0.9
    }

    pub fn new(start: Vec2, radius: f32) -> Self {
        Self {
            start,
            radius,
            density: Self::default_density(),
            friction: Self::default_friction(),
            restitution: Self::default_restitution(),
            linear_damping: Self::default_linear_damping(),
            angular_damping: Self::default_angular_damping(),
        }
    }

    pub(crate) fn body_def(&self) -> BodyDef {
        let mut def = BodyDef::new(BodyKind::Dynamic, self.start, Shape::circle(self.radius))
            .with_material(Material {
                density: self.density,
                friction: self.friction,
                restitution: self.restitution,
            })
            .with_name("ball");
        def.linear_damping = self.linear_damping;
        def.angular_damping = self.angular_damping;
        def.bullet = true;
        def
    }
}

/// Wall surface: bouncy, default friction, never rotates
pub const WALL_MATERIAL: Material = Material {
    density: 0.0,
    friction: 0.2,
    restitution: 0.4,
};

/// Hole surface: dead stop
pub const HOLE_MATERIAL: Material = Material {
    density: 1.0,
    friction: 0.0,
    restitution: 0.0,
};

impl WallDef {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            width,
            height,
            name: None,
        }
    }

    pub(crate) fn body_def(&self) -> BodyDef {
        let mut def = BodyDef::new(
            BodyKind::Static,
            self.center,
            Shape::rect(self.width, self.height),
        )
        .with_material(WALL_MATERIAL);
        def.fixed_rotation = true;
        def.name = self.name.clone();
        def
    }
}

impl HoleDef {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
            name: None,
            sensor: false,
        }
    }

    pub(crate) fn body_def(&self) -> BodyDef {
        let mut def = BodyDef::new(BodyKind::Static, self.center, Shape::circle(self.radius))
            .with_material(HOLE_MATERIAL);
        def.fixed_rotation = true;
        def.angular_damping = 0.9;
        def.sensor = self.sensor;
        def.name = self.name.clone();
        def
    }
}

/// Complete board description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Playfield size in world units
    pub width: f32,
    pub height: f32,
    pub walls: Vec<WallDef>,
    pub holes: Vec<HoleDef>,
    pub win_hole: HoleDef,
    pub ball: BallDef,
}

impl BoardLayout {
    /// Parse and validate a JSON layout
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject layouts that could never produce a playable world
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(ConfigError::MalformedLayout(format!(
                "board size {} x {}",
                self.width, self.height
            )));
        }

        let check_pos = |what: &str, p: Vec2| {
            if p.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::MalformedLayout(format!("{what} at {p}")))
            }
        };

        for (i, wall) in self.walls.iter().enumerate() {
            check_pos(&format!("wall {i}"), wall.center)?;
            Shape::rect(wall.width, wall.height).validate()?;
        }
        for (i, hole) in self.holes.iter().enumerate() {
            check_pos(&format!("hole {i}"), hole.center)?;
            Shape::circle(hole.radius).validate()?;
        }
        check_pos("win hole", self.win_hole.center)?;
        Shape::circle(self.win_hole.radius).validate()?;
        check_pos("ball start", self.ball.start)?;
        Shape::circle(self.ball.radius).validate()?;
        Ok(())
    }

    /// The shipped maze, sized for a browser viewport in pixels.
    ///
    /// The viewport is clamped to 640..=768 by 480..=1024 pixels and
    /// converted to world units with [`PIXELS_PER_UNIT`]. Ball and hole
    /// sizes scale with the viewport aspect.
    pub fn classic(viewport_width: f32, viewport_height: f32) -> Self {
        let px_w = viewport_width.clamp(640.0, 768.0);
        let px_h = viewport_height.clamp(480.0, 1024.0);
        let w = px_w / PIXELS_PER_UNIT;
        let h = px_h / PIXELS_PER_UNIT;
        let scale = px_w.min(px_h) / px_w.max(px_h);

        let walls = vec![
            // Outer boundary
            WallDef::new(w / 2.0, 0.5, w, 1.0),
            WallDef::new(0.5, h / 2.0, 1.0, h - 2.0),
            WallDef::new(w / 2.0, h - 0.5, w, 1.0),
            WallDef::new(w - 0.5, h / 2.0, 1.0, h - 2.0),
            // Maze
            WallDef::new(w * 0.12, h * 0.20, w * 0.20, 1.0),
            WallDef::new(w * 0.35, h * 0.32, 1.0, h * 0.60),
            WallDef::new(w * 0.24, h * 0.61, w * 0.20, 1.0),
            WallDef::new(w * 0.27, h * 0.80, w * 0.50, 1.0),
            WallDef::new(w * 0.53, h * 0.58, 1.0, h * 0.60),
            WallDef::new(w * 0.67, h * 0.27, w * 0.30, 1.0),
            WallDef::new(w * 0.67, h * 0.19, 1.0, h * 0.15),
            WallDef::new(w * 0.83, h * 0.45, w * 0.30, 1.0),
            WallDef::new(w * 0.69, h * 0.65, w * 0.30, 1.0),
            WallDef::new(w * 0.25, h * 0.95, 1.0, h * 0.07),
        ];

        let hole_radius = 1.5 * scale;
        let holes = vec![
            HoleDef::new(w * 0.11, h * 0.28, hole_radius),
            HoleDef::new(w * 0.25, h * 0.53, hole_radius),
            HoleDef::new(w * 0.44, h * 0.09, hole_radius),
            HoleDef::new(w * 0.85, h * 0.87, hole_radius),
        ];

        Self {
            width: w,
            height: h,
            walls,
            holes,
            win_hole: HoleDef::new(w * 0.12, h * 0.89, 1.5 * scale * 1.5),
            ball: BallDef::new(Vec2::new(w * 0.10, h * 0.10), 1.9 * scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_layout_is_valid() {
        let layout = BoardLayout::classic(768.0, 1024.0);
        assert!(layout.validate().is_ok());
        assert_eq!(layout.walls.len(), 14);
        assert_eq!(layout.holes.len(), 4);
        assert!(layout.win_hole.radius > layout.holes[0].radius);
        assert!((layout.width - 768.0 / 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_classic_clamps_viewport() {
        let tiny = BoardLayout::classic(100.0, 100.0);
        assert!((tiny.width - 640.0 / 15.0).abs() < 1e-4);
        assert!((tiny.height - 480.0 / 15.0).abs() < 1e-4);

        let huge = BoardLayout::classic(4000.0, 4000.0);
        assert!((huge.width - 768.0 / 15.0).abs() < 1e-4);
        assert!((huge.height - 1024.0 / 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let layout = BoardLayout::classic(700.0, 900.0);
        let json = layout.to_json().unwrap();
        assert_eq!(BoardLayout::from_json(&json).unwrap(), layout);

        // Ball material fields fall back to the shipped values
        let minimal = r#"{
            "width": 20.0, "height": 20.0,
            "walls": [{ "center": [10.0, 0.5], "width": 20.0, "height": 1.0 }],
            "holes": [],
            "win_hole": { "center": [15.0, 15.0], "radius": 2.0 },
            "ball": { "start": [2.0, 2.0], "radius": 1.9 }
        }"#;
        let parsed = BoardLayout::from_json(minimal).unwrap();
        assert_eq!(parsed.ball.restitution, 0.4);
        assert_eq!(parsed.ball.linear_damping, 0.15);
    }

    #[test]
    fn test_rejects_malformed_layouts() {
        let mut layout = BoardLayout::classic(768.0, 1024.0);
        layout.walls[3].width = 0.0;
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::InvalidShape { .. })
        ));

        let mut layout = BoardLayout::classic(768.0, 1024.0);
        layout.ball.start = Vec2::new(f32::NAN, 1.0);
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::MalformedLayout(_))
        ));

        assert!(matches!(
            BoardLayout::from_json("{ \"width\": 1 }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
