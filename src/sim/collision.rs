//! Narrow-phase collision detection
//!
//! Exact overlap tests for every pair of shape kinds. Dispatch is a plain
//! match over `(Shape, Shape)` so adding a shape kind is a compile error
//! until every pair is handled.

use glam::Vec2;

use super::shape::Shape;

/// Contact information for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from shape A toward shape B
    pub normal: Vec2,
    /// Contact point in world space
    pub point: Vec2,
    /// Overlap depth along the normal (0 when exactly touching)
    pub penetration: f32,
}

impl Manifold {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Test two shapes placed at `pos_a` / `pos_b` for overlap
pub fn collide(shape_a: &Shape, pos_a: Vec2, shape_b: &Shape, pos_b: Vec2) -> Option<Manifold> {
    match (*shape_a, *shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pos_a, ra, pos_b, rb)
        }
        (
            Shape::Box {
                half_width,
                half_height,
            },
            Shape::Circle { radius },
        ) => box_circle(pos_a, Vec2::new(half_width, half_height), pos_b, radius),
        (
            Shape::Circle { radius },
            Shape::Box {
                half_width,
                half_height,
            },
        ) => box_circle(pos_b, Vec2::new(half_width, half_height), pos_a, radius)
            .map(Manifold::flipped),
        (
            Shape::Box {
                half_width: wa,
                half_height: ha,
            },
            Shape::Box {
                half_width: wb,
                half_height: hb,
            },
        ) => box_box(pos_a, Vec2::new(wa, ha), pos_b, Vec2::new(wb, hb)),
    }
}

fn circle_circle(pos_a: Vec2, ra: f32, pos_b: Vec2, rb: f32) -> Option<Manifold> {
    let delta = pos_b - pos_a;
    let dist_sq = delta.length_squared();
    let radii = ra + rb;
    if dist_sq > radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Concentric circles: any direction works, pick +x
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    Some(Manifold {
        normal,
        point: pos_a + normal * ra,
        penetration: radii - dist,
    })
}

fn box_circle(box_pos: Vec2, half: Vec2, circle_pos: Vec2, radius: f32) -> Option<Manifold> {
    let local = circle_pos - box_pos;
    let closest = local.clamp(-half, half);

    if closest != local {
        // Centre outside the box: nearest point on the boundary decides
        let diff = local - closest;
        let dist_sq = diff.length_squared();
        if dist_sq > radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Manifold {
            normal: diff / dist,
            point: box_pos + closest,
            penetration: radius - dist,
        });
    }

    // Centre inside (or on) the box: push out through the nearest face
    let to_face_x = half.x - local.x.abs();
    let to_face_y = half.y - local.y.abs();
    let sign = |v: f32| if v >= 0.0 { 1.0 } else { -1.0 };
    let (normal, face_point, depth) = if to_face_x < to_face_y {
        let s = sign(local.x);
        (Vec2::new(s, 0.0), Vec2::new(s * half.x, local.y), to_face_x)
    } else {
        let s = sign(local.y);
        (Vec2::new(0.0, s), Vec2::new(local.x, s * half.y), to_face_y)
    };
    Some(Manifold {
        normal,
        point: box_pos + face_point,
        penetration: radius + depth,
    })
}

fn box_box(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> Option<Manifold> {
    let delta = pos_b - pos_a;
    let overlap = half_a + half_b - delta.abs();
    if overlap.x < 0.0 || overlap.y < 0.0 {
        return None;
    }

    // Centre of the intersection rectangle
    let lo = (pos_a - half_a).max(pos_b - half_b);
    let hi = (pos_a + half_a).min(pos_b + half_b);
    let point = (lo + hi) * 0.5;

    let (normal, penetration) = if overlap.x < overlap.y {
        (Vec2::new(if delta.x >= 0.0 { 1.0 } else { -1.0 }, 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, if delta.y >= 0.0 { 1.0 } else { -1.0 }), overlap.y)
    };
    Some(Manifold {
        normal,
        point,
        penetration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle() {
        let a = Shape::circle(1.0);
        let b = Shape::circle(1.0);

        let m = collide(&a, Vec2::ZERO, &b, Vec2::new(1.5, 0.0)).unwrap();
        assert!((m.normal - Vec2::X).length() < 1e-6);
        assert!((m.penetration - 0.5).abs() < 1e-6);

        assert!(collide(&a, Vec2::ZERO, &b, Vec2::new(2.5, 0.0)).is_none());
        // Exactly touching still counts
        let touch = collide(&a, Vec2::ZERO, &b, Vec2::new(2.0, 0.0)).unwrap();
        assert!(touch.penetration.abs() < 1e-6);
    }

    #[test]
    fn test_box_circle_outside_face() {
        let wall = Shape::rect(20.0, 1.0);
        let ball = Shape::circle(1.0);

        // Ball resting 0.25 into the top face of a wall centred at origin
        let m = collide(&wall, Vec2::ZERO, &ball, Vec2::new(3.0, 1.25)).unwrap();
        assert!((m.normal - Vec2::Y).length() < 1e-6);
        assert!((m.penetration - 0.25).abs() < 1e-5);
        assert!((m.point - Vec2::new(3.0, 0.5)).length() < 1e-5);

        // Argument order flips the normal
        let flipped = collide(&ball, Vec2::new(3.0, 1.25), &wall, Vec2::ZERO).unwrap();
        assert!((flipped.normal + Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_box_circle_corner_miss() {
        let wall = Shape::rect(2.0, 2.0);
        let ball = Shape::circle(1.0);
        // Diagonal from corner (1,1), distance ~1.13 > radius
        assert!(collide(&wall, Vec2::ZERO, &ball, Vec2::new(1.8, 1.8)).is_none());
    }

    #[test]
    fn test_box_circle_centre_inside() {
        let wall = Shape::rect(20.0, 1.0);
        let ball = Shape::circle(1.9);
        // Ball centre inside the wall, nearer the bottom face
        let m = collide(&wall, Vec2::new(10.0, 0.5), &ball, Vec2::new(2.0, 0.8)).unwrap();
        assert!((m.normal - Vec2::Y).length() < 1e-6);
        assert!((m.penetration - (1.9 + 0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_box_box_picks_shallow_axis() {
        let a = Shape::rect(2.0, 2.0);
        let b = Shape::rect(2.0, 2.0);
        let m = collide(&a, Vec2::ZERO, &b, Vec2::new(1.8, 0.5)).unwrap();
        assert!((m.normal - Vec2::X).length() < 1e-6);
        assert!((m.penetration - 0.2).abs() < 1e-5);

        assert!(collide(&a, Vec2::ZERO, &b, Vec2::new(0.0, 2.1)).is_none());
    }
}
