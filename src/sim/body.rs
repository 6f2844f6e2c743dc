//! Rigid bodies
//!
//! A body carries its motion state plus exactly one shape (its fixture).
//! Mass properties are derived from the shape and density when the body is
//! created and never change afterwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::error::ConfigError;

/// Stable body handle; equals the creation index within its world
pub type BodyId = u32;

/// Static bodies never move under simulation; dynamic ones do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    #[default]
    Static,
    Dynamic,
}

/// Surface and mass properties of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
        }
    }
}

impl Material {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f32| v.is_finite() && v >= 0.0;
        if ok(self.density) && ok(self.friction) && ok(self.restitution) {
            Ok(())
        } else {
            Err(ConfigError::InvalidMaterial {
                what: format!(
                    "density {} friction {} restitution {}",
                    self.density, self.friction, self.restitution
                ),
            })
        }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub pos: Vec2,
    pub angle: f32,
    pub vel: Vec2,
    pub angular_vel: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub fixed_rotation: bool,
    /// Continuous collision: integrate in sub-steps so thin walls hold
    pub bullet: bool,
    /// Report contacts without resolving them
    pub sensor: bool,
    pub shape: Shape,
    pub material: Material,
    pub name: Option<String>,
}

impl BodyDef {
    pub fn new(kind: BodyKind, pos: Vec2, shape: Shape) -> Self {
        Self {
            kind,
            pos,
            angle: 0.0,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            bullet: false,
            sensor: false,
            shape,
            material: Material::default(),
            name: None,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A rigid body owned by a [`super::World`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub angle: f32,
    pub vel: Vec2,
    pub angular_vel: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub fixed_rotation: bool,
    pub bullet: bool,
    pub sensor: bool,
    pub shape: Shape,
    pub material: Material,
    #[serde(default)]
    pub name: Option<String>,
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: f32,
    pub inv_inertia: f32,
    /// Accumulated force, cleared after every step
    #[serde(skip)]
    pub force: Vec2,
    #[serde(skip)]
    pub torque: f32,
}

impl Body {
    /// Build a body from a validated definition
    pub(crate) fn from_def(id: BodyId, def: BodyDef) -> Result<Self, ConfigError> {
        def.shape.validate()?;
        def.material.validate()?;
        if !def.pos.is_finite() || !def.angle.is_finite() || !def.vel.is_finite() {
            return Err(ConfigError::MalformedLayout(format!(
                "body {id} has a non-finite initial state"
            )));
        }

        // Boxes collide axis-aligned, so they are never allowed to spin
        let fixed_rotation = def.fixed_rotation || matches!(def.shape, Shape::Box { .. });

        let (mass, inertia) = match def.kind {
            BodyKind::Static => (0.0, 0.0),
            BodyKind::Dynamic => {
                let mass = def.material.density * def.shape.area();
                let mass = if mass > 0.0 { mass } else { 1.0 };
                let inertia = if fixed_rotation {
                    0.0
                } else {
                    def.shape.inertia(mass)
                };
                (mass, inertia)
            }
        };
        let inv = |v: f32| if v > 0.0 { 1.0 / v } else { 0.0 };

        let is_static = def.kind == BodyKind::Static;
        Ok(Self {
            id,
            kind: def.kind,
            pos: def.pos,
            angle: def.angle,
            vel: if is_static { Vec2::ZERO } else { def.vel },
            angular_vel: if is_static || fixed_rotation {
                0.0
            } else {
                def.angular_vel
            },
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            fixed_rotation,
            bullet: def.bullet,
            sensor: def.sensor,
            shape: def.shape,
            material: def.material,
            name: def.name,
            mass,
            inv_mass: inv(mass),
            inertia,
            inv_inertia: inv(inertia),
            force: Vec2::ZERO,
            torque: 0.0,
        })
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Read-only snapshot for renderers
    pub fn view(&self) -> BodyView {
        BodyView {
            id: self.id,
            pos: self.pos,
            angle: self.angle,
            shape: self.shape,
        }
    }
}

/// Presentation-facing copy of a body's state. Renderers read these; they
/// never get mutable access to the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub pos: Vec2,
    pub angle: f32,
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_mass_from_density() {
        let def = BodyDef::new(BodyKind::Dynamic, Vec2::ZERO, Shape::circle(1.0)).with_material(
            Material {
                density: 2.0,
                ..Default::default()
            },
        );
        let body = Body::from_def(0, def).unwrap();
        let expected = 2.0 * std::f32::consts::PI;
        assert!((body.mass - expected).abs() < 1e-4);
        assert!((body.inv_mass * body.mass - 1.0).abs() < 1e-5);
        assert!(body.inv_inertia > 0.0);
    }

    #[test]
    fn test_zero_density_dynamic_gets_unit_mass() {
        let def = BodyDef::new(BodyKind::Dynamic, Vec2::ZERO, Shape::circle(1.0));
        let body = Body::from_def(0, def).unwrap();
        assert_eq!(body.mass, 1.0);
    }

    #[test]
    fn test_static_body_is_immovable() {
        let mut def = BodyDef::new(BodyKind::Static, Vec2::ONE, Shape::rect(2.0, 1.0));
        def.vel = Vec2::new(3.0, 4.0);
        let body = Body::from_def(0, def).unwrap();
        assert_eq!(body.inv_mass, 0.0);
        assert_eq!(body.vel, Vec2::ZERO);
        assert!(body.fixed_rotation);
    }

    #[test]
    fn test_rejects_bad_definitions() {
        let bad_shape = BodyDef::new(BodyKind::Dynamic, Vec2::ZERO, Shape::circle(0.0));
        assert!(matches!(
            Body::from_def(0, bad_shape),
            Err(ConfigError::InvalidShape { .. })
        ));

        let bad_material = BodyDef::new(BodyKind::Dynamic, Vec2::ZERO, Shape::circle(1.0))
            .with_material(Material {
                restitution: -0.5,
                ..Default::default()
            });
        assert!(matches!(
            Body::from_def(0, bad_material),
            Err(ConfigError::InvalidMaterial { .. })
        ));

        let bad_pos = BodyDef::new(BodyKind::Dynamic, Vec2::NAN, Shape::circle(1.0));
        assert!(matches!(
            Body::from_def(0, bad_pos),
            Err(ConfigError::MalformedLayout(_))
        ));
    }
}
