//! Physics world and fixed-order stepper
//!
//! The world owns every body, the global gravity vector and the contact
//! history. `step` is fully deterministic: no clocks, no randomness, and all
//! iteration happens in body-id or pair order.

use std::collections::{BTreeSet, HashMap};

use glam::Vec2;

use super::body::{Body, BodyDef, BodyId, BodyView};
use super::collision::{Manifold, collide};
use super::contact::{ContactEvent, ContactKind, ContactPair, ContactTracker};
use crate::consts::*;
use crate::error::{ConfigError, InvariantViolation};
use crate::{cross, cross_sv};

/// Counters for anomalies the stepper absorbed instead of failing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Steps that actually advanced the simulation
    pub steps: u64,
    /// Steps ignored because dt was not a positive finite number
    pub skipped_steps: u64,
    /// Gravity updates rejected for being non-finite
    pub rejected_gravity: u64,
    /// Extra position sub-steps taken by bullet bodies
    pub bullet_substeps: u64,
}

/// A touching pair found during the latest step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub pair: ContactPair,
    pub kind: ContactKind,
    /// Manifold with the normal pointing from `pair.a` to `pair.b`
    pub manifold: Manifold,
}

/// Per-contact solver state for one step
#[derive(Debug, Clone, Copy)]
struct Constraint {
    ia: usize,
    ib: usize,
    normal: Vec2,
    tangent: Vec2,
    ra: Vec2,
    rb: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    friction: f32,
    velocity_bias: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    bodies: Vec<Body>,
    gravity: Vec2,
    names: HashMap<String, BodyId>,
    tracker: ContactTracker,
    contacts: Vec<Contact>,
    events: Vec<ContactEvent>,
    stats: StepStats,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: if gravity.is_finite() { gravity } else { Vec2::ZERO },
            ..Default::default()
        }
    }

    /// Validate and add a body. Ids are assigned in creation order.
    pub fn create_body(&mut self, def: BodyDef) -> Result<BodyId, ConfigError> {
        let id = self.bodies.len() as BodyId;
        if let Some(name) = &def.name {
            if self.names.contains_key(name) {
                return Err(ConfigError::DuplicateName(name.clone()));
            }
        }

        let body = Body::from_def(id, def)?;
        if let Some(name) = &body.name {
            self.names.insert(name.clone(), id);
        }
        log::debug!("Created {:?} body {} at {}", body.kind, id, body.pos);
        self.bodies.push(body);
        Ok(id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id as usize)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.names.get(name).and_then(|&id| self.body(id))
    }

    pub fn view(&self, id: BodyId) -> Option<BodyView> {
        self.body(id).map(Body::view)
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Set world gravity. Non-finite vectors are rejected and counted;
    /// returns whether the new value was accepted.
    pub fn set_gravity(&mut self, gravity: Vec2) -> bool {
        if gravity.is_finite() {
            self.gravity = gravity;
            true
        } else {
            self.stats.rejected_gravity += 1;
            log::warn!("Rejected non-finite gravity {gravity}");
            false
        }
    }

    /// Move a body instantly and stop it. This is the only way a static
    /// body ever changes position.
    pub fn teleport(&mut self, id: BodyId, pos: Vec2) -> bool {
        if !pos.is_finite() {
            log::warn!("Rejected teleport of body {id} to {pos}");
            return false;
        }
        let Some(body) = self.bodies.get_mut(id as usize) else {
            return false;
        };
        body.pos = pos;
        body.vel = Vec2::ZERO;
        body.angular_vel = 0.0;
        body.force = Vec2::ZERO;
        body.torque = 0.0;
        self.tracker.forget_body(id);
        true
    }

    /// Set a dynamic body's velocities; ignored for static bodies
    pub fn set_velocity(&mut self, id: BodyId, vel: Vec2, angular_vel: f32) {
        if let Some(body) = self.bodies.get_mut(id as usize).filter(|b| b.is_dynamic()) {
            body.vel = vel;
            if !body.fixed_rotation {
                body.angular_vel = angular_vel;
            }
        }
    }

    /// Accumulate a force at the centre of mass until the next step
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(id as usize).filter(|b| b.is_dynamic()) {
            body.force += force;
        }
    }

    pub fn apply_torque(&mut self, id: BodyId, torque: f32) {
        if let Some(body) = self.bodies.get_mut(id as usize).filter(|b| b.is_dynamic()) {
            body.torque += torque;
        }
    }

    /// Immediate change of momentum at the centre of mass
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(id as usize).filter(|b| b.is_dynamic()) {
            body.vel += impulse * body.inv_mass;
        }
    }

    /// Begin/End events produced by the latest step
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Every pair touching at the start of the latest step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn is_touching(&self, a: BodyId, b: BodyId) -> bool {
        self.tracker.is_touching(ContactPair::new(a, b))
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Forget all contact history, so overlapping pairs begin again
    pub fn clear_contacts(&mut self) {
        self.tracker.clear();
        self.contacts.clear();
        self.events.clear();
    }

    /// Check the static/dynamic invariants
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for body in &self.bodies {
            if !body.pos.is_finite() || !body.vel.is_finite() || !body.angular_vel.is_finite() {
                return Err(InvariantViolation::NonFiniteState { id: body.id });
            }
            if !body.is_dynamic() && (body.vel != Vec2::ZERO || body.angular_vel != 0.0) {
                return Err(InvariantViolation::StaticBodyMoving { id: body.id });
            }
        }
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// A non-positive or non-finite `dt` leaves every body untouched and
    /// yields no events.
    pub fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
    ) -> &[ContactEvent] {
        self.events.clear();
        if !(dt > 0.0 && dt.is_finite()) {
            self.stats.skipped_steps += 1;
            log::debug!("Skipping step with dt={dt}");
            return &self.events;
        }

        self.integrate_velocities(dt);

        let pairs = self.broad_phase();
        self.narrow_phase(&pairs);

        let mut constraints = self.prepare_constraints();
        for _ in 0..velocity_iterations {
            self.solve_velocities(&mut constraints);
        }

        self.integrate_positions(dt);

        for _ in 0..position_iterations {
            if self.solve_positions() {
                break;
            }
        }

        for body in &mut self.bodies {
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }

        let touching: BTreeSet<ContactPair> = self.contacts.iter().map(|c| c.pair).collect();
        self.events = self.tracker.update(touching);
        for event in &self.events {
            log::trace!(
                "Contact {:?} between {} and {}",
                event.kind,
                event.pair.a,
                event.pair.b
            );
        }

        self.stats.steps += 1;
        debug_assert!(
            self.check_invariants().is_ok(),
            "world invariant violated: {:?}",
            self.check_invariants()
        );
        &self.events
    }

    fn integrate_velocities(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            body.vel += (gravity + body.force * body.inv_mass) * dt;
            if !body.fixed_rotation {
                body.angular_vel += body.torque * body.inv_inertia * dt;
            }

            body.vel *= 1.0 / (1.0 + dt * body.linear_damping);
            body.angular_vel *= 1.0 / (1.0 + dt * body.angular_damping);
        }
    }

    /// Sweep-and-prune along x. Returns index pairs `(i, j)` with `i < j`
    /// whose bounding boxes overlap and where at least one body is dynamic.
    fn broad_phase(&self) -> Vec<(usize, usize)> {
        let mut entries: Vec<_> = self
            .bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.shape.aabb(b.pos), i))
            .collect();
        entries.sort_by(|a, b| a.0.min.x.total_cmp(&b.0.min.x).then(a.1.cmp(&b.1)));

        let mut pairs = Vec::new();
        for (n, (aabb_i, i)) in entries.iter().enumerate() {
            for (aabb_j, j) in &entries[n + 1..] {
                if aabb_j.min.x > aabb_i.max.x {
                    break;
                }
                if !self.bodies[*i].is_dynamic() && !self.bodies[*j].is_dynamic() {
                    continue;
                }
                if aabb_i.overlaps(aabb_j) {
                    pairs.push(((*i).min(*j), (*i).max(*j)));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    fn narrow_phase(&mut self, pairs: &[(usize, usize)]) {
        self.contacts.clear();
        for &(i, j) in pairs {
            let (a, b) = (&self.bodies[i], &self.bodies[j]);
            if let Some(manifold) = collide(&a.shape, a.pos, &b.shape, b.pos) {
                let pair = ContactPair::new(a.id, b.id);
                let kind = self
                    .tracker
                    .classify(pair, true)
                    .unwrap_or(ContactKind::Begin);
                self.contacts.push(Contact {
                    pair,
                    kind,
                    manifold,
                });
            }
        }
    }

    fn prepare_constraints(&self) -> Vec<Constraint> {
        self.contacts
            .iter()
            .filter_map(|contact| {
                let (ia, ib) = (contact.pair.a as usize, contact.pair.b as usize);
                let (a, b) = (&self.bodies[ia], &self.bodies[ib]);
                if a.sensor || b.sensor {
                    return None;
                }

                let normal = contact.manifold.normal;
                let tangent = Vec2::new(-normal.y, normal.x);
                let ra = contact.manifold.point - a.pos;
                let rb = contact.manifold.point - b.pos;

                let effective_mass = |dir: Vec2| {
                    let rna = cross(ra, dir);
                    let rnb = cross(rb, dir);
                    let k = a.inv_mass
                        + b.inv_mass
                        + a.inv_inertia * rna * rna
                        + b.inv_inertia * rnb * rnb;
                    if k > 0.0 { 1.0 / k } else { 0.0 }
                };

                let dv = b.vel + cross_sv(b.angular_vel, rb) - a.vel - cross_sv(a.angular_vel, ra);
                let vn = dv.dot(normal);
                let restitution = a.material.restitution.max(b.material.restitution);
                let velocity_bias = if vn < -VELOCITY_THRESHOLD {
                    -restitution * vn
                } else {
                    0.0
                };

                Some(Constraint {
                    ia,
                    ib,
                    normal,
                    tangent,
                    ra,
                    rb,
                    normal_mass: effective_mass(normal),
                    tangent_mass: effective_mass(tangent),
                    friction: (a.material.friction * b.material.friction).sqrt(),
                    velocity_bias,
                    normal_impulse: 0.0,
                    tangent_impulse: 0.0,
                })
            })
            .collect()
    }

    fn solve_velocities(&mut self, constraints: &mut [Constraint]) {
        for c in constraints.iter_mut() {
            // Friction first, bounded by the current normal impulse
            let dv = self.relative_velocity(c);
            let vt = dv.dot(c.tangent);
            let max_friction = c.friction * c.normal_impulse;
            let new_tangent =
                (c.tangent_impulse - c.tangent_mass * vt).clamp(-max_friction, max_friction);
            let lambda = new_tangent - c.tangent_impulse;
            c.tangent_impulse = new_tangent;
            self.apply_contact_impulse(c, c.tangent * lambda);

            let dv = self.relative_velocity(c);
            let vn = dv.dot(c.normal);
            let new_normal = (c.normal_impulse + c.normal_mass * (-vn + c.velocity_bias)).max(0.0);
            let lambda = new_normal - c.normal_impulse;
            c.normal_impulse = new_normal;
            self.apply_contact_impulse(c, c.normal * lambda);
        }
    }

    fn relative_velocity(&self, c: &Constraint) -> Vec2 {
        let (a, b) = (&self.bodies[c.ia], &self.bodies[c.ib]);
        b.vel + cross_sv(b.angular_vel, c.rb) - a.vel - cross_sv(a.angular_vel, c.ra)
    }

    fn apply_contact_impulse(&mut self, c: &Constraint, impulse: Vec2) {
        let a = &mut self.bodies[c.ia];
        if a.is_dynamic() {
            a.vel -= impulse * a.inv_mass;
            a.angular_vel -= a.inv_inertia * cross(c.ra, impulse);
        }
        let b = &mut self.bodies[c.ib];
        if b.is_dynamic() {
            b.vel += impulse * b.inv_mass;
            b.angular_vel += b.inv_inertia * cross(c.rb, impulse);
        }
    }

    fn integrate_positions(&mut self, dt: f32) {
        for i in 0..self.bodies.len() {
            let body = &self.bodies[i];
            if !body.is_dynamic() {
                continue;
            }

            let substeps = if body.bullet {
                let travel = body.vel.length() * dt;
                let limit = body.shape.min_half_extent();
                ((travel / limit).ceil() as u32).clamp(1, MAX_BULLET_SUBSTEPS)
            } else {
                1
            };
            if substeps > 1 {
                self.stats.bullet_substeps += u64::from(substeps - 1);
            }

            let h = dt / substeps as f32;
            for _ in 0..substeps {
                let body = &mut self.bodies[i];
                body.pos += body.vel * h;
                if body.bullet {
                    self.project_out_of_statics(i);
                }
            }

            let body = &mut self.bodies[i];
            if !body.fixed_rotation {
                body.angle += body.angular_vel * dt;
            }
        }
    }

    /// Push a bullet out of any solid static body it has entered, leaving
    /// `LINEAR_SLOP` of overlap so the contact is still seen next step
    fn project_out_of_statics(&mut self, i: usize) {
        if self.bodies[i].sensor {
            return;
        }
        for j in 0..self.bodies.len() {
            let (stat, bullet) = (&self.bodies[j], &self.bodies[i]);
            if stat.is_dynamic() || stat.sensor {
                continue;
            }
            if let Some(m) = collide(&stat.shape, stat.pos, &bullet.shape, bullet.pos) {
                let excess = m.penetration - LINEAR_SLOP;
                if excess > 0.0 {
                    self.bodies[i].pos += m.normal * excess;
                }
            }
        }
    }

    /// One pass of positional correction. Returns true once every contact
    /// is within tolerance.
    fn solve_positions(&mut self) -> bool {
        let mut max_penetration = 0.0f32;
        for n in 0..self.contacts.len() {
            let (ia, ib) = (
                self.contacts[n].pair.a as usize,
                self.contacts[n].pair.b as usize,
            );
            let (a, b) = (&self.bodies[ia], &self.bodies[ib]);
            if a.sensor || b.sensor {
                continue;
            }
            let total_inv_mass = a.inv_mass + b.inv_mass;
            if total_inv_mass == 0.0 {
                continue;
            }
            let Some(m) = collide(&a.shape, a.pos, &b.shape, b.pos) else {
                continue;
            };
            max_penetration = max_penetration.max(m.penetration);

            let correction =
                (BAUMGARTE * (m.penetration - LINEAR_SLOP)).clamp(0.0, MAX_CORRECTION);
            let push = m.normal * (correction / total_inv_mass);
            let (inv_a, inv_b) = (a.inv_mass, b.inv_mass);
            self.bodies[ia].pos -= push * inv_a;
            self.bodies[ib].pos += push * inv_b;
        }
        max_penetration <= 3.0 * LINEAR_SLOP
    }
}
