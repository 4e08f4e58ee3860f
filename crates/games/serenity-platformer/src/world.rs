//! Minimal rigid-body world driving the gameplay contact protocol.
//!
//! Bodies carry axis-aligned box fixtures. Each step integrates forces and
//! gravity, runs a brute-force broad phase, reports separations
//! (`end_contact`) before new overlaps (`begin_contact`), then calls
//! `pre_solve` for every touching solid pair and pushes dynamic bodies out of
//! the pairs that stay enabled.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::obstacles::{FountainId, ObstacleId, ShardId};

/// Separation below which boxes are not considered overlapping.
const LINEAR_SLOP: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    /// Moved only by its velocity; ignores gravity and contacts.
    Kinematic,
    Dynamic,
}

/// Opaque identity attached to a fixture for contact classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureTag {
    Player,
    PlayerFoot,
    Obstacle(ObstacleId),
    Fountain(FountainId),
    Shard(ShardId),
    Goal,
    Untagged,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x - LINEAR_SLOP
            && self.max.x > other.min.x + LINEAR_SLOP
            && self.min.y < other.max.y - LINEAR_SLOP
            && self.max.y > other.min.y + LINEAR_SLOP
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// Construction parameters for a body.
#[derive(Debug, Clone, Copy)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub gravity_scale: f32,
}

impl BodyDef {
    pub fn new(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            mass: 1.0,
            gravity_scale: 1.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }
}

/// Construction parameters for a box fixture.
#[derive(Debug, Clone, Copy)]
pub struct FixtureDef {
    pub half_extents: Vec2,
    pub offset: Vec2,
    pub sensor: bool,
    pub tag: FixtureTag,
}

impl FixtureDef {
    pub fn solid(half_extents: Vec2, tag: FixtureTag) -> Self {
        Self {
            half_extents,
            offset: Vec2::ZERO,
            sensor: false,
            tag,
        }
    }

    pub fn sensor(half_extents: Vec2, tag: FixtureTag) -> Self {
        Self {
            sensor: true,
            ..Self::solid(half_extents, tag)
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub gravity_scale: f32,
    /// Disabled bodies keep their fixtures but take part in no contacts.
    pub enabled: bool,
    force: Vec2,
    fixtures: Vec<FixtureId>,
}

impl Body {
    pub fn fixtures(&self) -> &[FixtureId] {
        &self.fixtures
    }
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub body: BodyId,
    pub half_extents: Vec2,
    pub offset: Vec2,
    pub sensor: bool,
    pub tag: FixtureTag,
}

/// Body and fixture storage, handed to contact callbacks for reads and
/// velocity writes.
#[derive(Debug, Default)]
pub struct BodySet {
    bodies: Vec<Body>,
    fixtures: Vec<Fixture>,
}

impl BodySet {
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id.0 as usize)
    }

    pub fn position(&self, id: BodyId) -> Vec2 {
        self.body(id).map(|b| b.position).unwrap_or_default()
    }

    pub fn velocity(&self, id: BodyId) -> Vec2 {
        self.body(id).map(|b| b.velocity).unwrap_or_default()
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(b) = self.body_mut(id) {
            b.velocity = velocity;
        }
    }

    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(b) = self.body_mut(id) {
            b.position = position;
        }
    }

    pub fn translate(&mut self, id: BodyId, delta: Vec2) {
        if let Some(b) = self.body_mut(id) {
            b.position += delta;
        }
    }

    /// Accumulate a force for the next step. Ignored on non-dynamic bodies.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(b) = self.body_mut(id)
            && b.kind == BodyKind::Dynamic
        {
            b.force += force;
        }
    }

    /// Change velocity immediately by `impulse / mass`. Ignored on non-dynamic bodies.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(b) = self.body_mut(id)
            && b.kind == BodyKind::Dynamic
        {
            b.velocity += impulse / b.mass.max(f32::EPSILON);
        }
    }

    pub fn pending_force(&self, id: BodyId) -> Vec2 {
        self.body(id).map(|b| b.force).unwrap_or_default()
    }

    /// World-space bounds of a fixture.
    pub fn fixture_aabb(&self, id: FixtureId) -> Option<Aabb> {
        let fixture = self.fixture(id)?;
        let body = self.body(fixture.body)?;
        Some(Aabb::from_center(
            body.position + fixture.offset,
            fixture.half_extents,
        ))
    }

    /// Union of all fixture bounds on a body, sensors excluded.
    pub fn body_aabb(&self, id: BodyId) -> Option<Aabb> {
        let body = self.body(id)?;
        body.fixtures
            .iter()
            .filter(|&&f| self.fixture(f).is_some_and(|fx| !fx.sensor))
            .filter_map(|&f| self.fixture_aabb(f))
            .reduce(|a, b| Aabb {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            })
    }

    fn is_enabled(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(|b| b.enabled)
    }
}

/// A touching fixture pair as seen by contact callbacks.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub fixture_a: FixtureId,
    pub fixture_b: FixtureId,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub tag_a: FixtureTag,
    pub tag_b: FixtureTag,
    pub sensor: bool,
    enabled: bool,
}

impl Contact {
    /// Disable the contact for the current step only.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Gameplay hooks into the contact lifecycle.
pub trait ContactListener {
    fn begin_contact(&mut self, contact: &Contact, bodies: &mut BodySet);

    /// Called for touching solid pairs before resolution. May disable the contact.
    fn pre_solve(&mut self, contact: &mut Contact, bodies: &mut BodySet);

    fn end_contact(&mut self, contact: &Contact, bodies: &mut BodySet);
}

/// Listener that ignores every callback.
impl ContactListener for () {
    fn begin_contact(&mut self, _: &Contact, _: &mut BodySet) {}
    fn pre_solve(&mut self, _: &mut Contact, _: &mut BodySet) {}
    fn end_contact(&mut self, _: &Contact, _: &mut BodySet) {}
}

type PairKey = (FixtureId, FixtureId);

/// The physics world.
#[derive(Debug)]
pub struct World {
    bodies: BodySet,
    gravity: Vec2,
    touching: BTreeSet<PairKey>,
}

impl World {
    pub fn new(gravity: f32) -> Self {
        Self {
            bodies: BodySet::default(),
            gravity: Vec2::new(0.0, gravity),
            touching: BTreeSet::new(),
        }
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet {
        &mut self.bodies
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn create_body(&mut self, def: BodyDef) -> BodyId {
        let id = BodyId(self.bodies.bodies.len() as u32);
        self.bodies.bodies.push(Body {
            kind: def.kind,
            position: def.position,
            velocity: def.velocity,
            mass: def.mass,
            gravity_scale: def.gravity_scale,
            enabled: true,
            force: Vec2::ZERO,
            fixtures: Vec::new(),
        });
        id
    }

    pub fn add_fixture(&mut self, body: BodyId, def: FixtureDef) -> FixtureId {
        let id = FixtureId(self.bodies.fixtures.len() as u32);
        self.bodies.fixtures.push(Fixture {
            body,
            half_extents: def.half_extents,
            offset: def.offset,
            sensor: def.sensor,
            tag: def.tag,
        });
        if let Some(b) = self.bodies.body_mut(body) {
            b.fixtures.push(id);
        }
        id
    }

    /// Enable or disable a body. Contacts of a disabled body end on the next step.
    pub fn set_enabled(&mut self, body: BodyId, enabled: bool) {
        if let Some(b) = self.bodies.body_mut(body) {
            b.enabled = enabled;
        }
    }

    pub fn is_touching(&self, a: FixtureId, b: FixtureId) -> bool {
        self.touching.contains(&pair_key(a, b))
    }

    pub fn touching_count(&self) -> usize {
        self.touching.len()
    }

    /// Contact view of a fixture pair, whether or not it is touching.
    pub fn contact(&self, a: FixtureId, b: FixtureId) -> Option<Contact> {
        self.make_contact(pair_key(a, b))
    }

    /// Advance the world by `dt`, reporting contact events to `listener`.
    pub fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        self.integrate(dt);

        let current = self.find_overlaps();

        let ended: Vec<PairKey> = self.touching.difference(&current).copied().collect();
        let began: Vec<PairKey> = current.difference(&self.touching).copied().collect();
        self.touching = current;

        for key in ended {
            if let Some(contact) = self.make_contact(key) {
                listener.end_contact(&contact, &mut self.bodies);
            }
        }
        for key in began {
            if let Some(contact) = self.make_contact(key) {
                listener.begin_contact(&contact, &mut self.bodies);
            }
        }

        let solid: Vec<PairKey> = self.touching.iter().copied().collect();
        for key in solid {
            let Some(mut contact) = self.make_contact(key) else {
                continue;
            };
            if contact.sensor {
                continue;
            }
            listener.pre_solve(&mut contact, &mut self.bodies);
            if contact.enabled {
                self.resolve(&contact, dt);
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.bodies.iter_mut().filter(|b| b.enabled) {
            match body.kind {
                BodyKind::Static => {},
                BodyKind::Kinematic => body.position += body.velocity * dt,
                BodyKind::Dynamic => {
                    let accel = gravity * body.gravity_scale + body.force / body.mass.max(f32::EPSILON);
                    body.velocity += accel * dt;
                    body.position += body.velocity * dt;
                },
            }
            body.force = Vec2::ZERO;
        }
    }

    fn find_overlaps(&self) -> BTreeSet<PairKey> {
        let mut out = BTreeSet::new();
        let fixtures = &self.bodies.fixtures;
        for (i, fa) in fixtures.iter().enumerate() {
            if !self.bodies.is_enabled(fa.body) {
                continue;
            }
            let Some(aabb_a) = self.bodies.fixture_aabb(FixtureId(i as u32)) else {
                continue;
            };
            for (j, fb) in fixtures.iter().enumerate().skip(i + 1) {
                if fa.body == fb.body || (fa.sensor && fb.sensor) {
                    continue;
                }
                if !self.bodies.is_enabled(fb.body) {
                    continue;
                }
                if !self.is_dynamic(fa.body) && !self.is_dynamic(fb.body) {
                    continue;
                }
                let Some(aabb_b) = self.bodies.fixture_aabb(FixtureId(j as u32)) else {
                    continue;
                };
                if aabb_a.overlaps(&aabb_b) {
                    out.insert((FixtureId(i as u32), FixtureId(j as u32)));
                }
            }
        }
        out
    }

    fn is_dynamic(&self, body: BodyId) -> bool {
        self.bodies
            .body(body)
            .is_some_and(|b| b.kind == BodyKind::Dynamic)
    }

    fn make_contact(&self, (a, b): PairKey) -> Option<Contact> {
        let fa = self.bodies.fixture(a)?;
        let fb = self.bodies.fixture(b)?;
        Some(Contact {
            fixture_a: a,
            fixture_b: b,
            body_a: fa.body,
            body_b: fb.body,
            tag_a: fa.tag,
            tag_b: fb.tag,
            sensor: fa.sensor || fb.sensor,
            enabled: true,
        })
    }

    /// Push dynamic bodies out of an enabled solid contact.
    fn resolve(&mut self, contact: &Contact, dt: f32) {
        let (Some(a), Some(b)) = (
            self.bodies.fixture_aabb(contact.fixture_a),
            self.bodies.fixture_aabb(contact.fixture_b),
        ) else {
            return;
        };
        if !a.overlaps(&b) {
            return;
        }

        let a_dyn = self.is_dynamic(contact.body_a);
        let b_dyn = self.is_dynamic(contact.body_b);
        let relative = self.bodies.velocity(contact.body_a) - self.bodies.velocity(contact.body_b);
        let normal = separation_normal(&a, &b, relative * dt);
        let depth = if normal.x != 0.0 {
            (a.max.x - b.min.x).min(b.max.x - a.min.x)
        } else {
            (a.max.y - b.min.y).min(b.max.y - a.min.y)
        };

        let (share_a, share_b) = match (a_dyn, b_dyn) {
            (true, true) => (0.5, 0.5),
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (false, false) => return,
        };
        if share_a > 0.0 {
            self.push_out(contact.body_a, normal, depth * share_a);
        }
        if share_b > 0.0 {
            self.push_out(contact.body_b, -normal, depth * share_b);
        }
    }

    fn push_out(&mut self, body: BodyId, normal: Vec2, depth: f32) {
        if let Some(b) = self.bodies.body_mut(body) {
            b.position += normal * depth;
            let into = b.velocity.dot(normal);
            if into < 0.0 {
                b.velocity -= normal * into;
            }
        }
    }
}

fn pair_key(a: FixtureId, b: FixtureId) -> PairKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// Unit axis along which `a` should be pushed out of `b`.
///
/// Prefers the axis on which the boxes were still separated before this
/// step's relative displacement, so a body sliding along a floor made of
/// several boxes is not snagged on the seams.
fn separation_normal(a: &Aabb, b: &Aabb, relative_displacement: Vec2) -> Vec2 {
    let prev = a.translated(-relative_displacement);
    let was_apart_x = prev.max.x <= b.min.x + LINEAR_SLOP || prev.min.x >= b.max.x - LINEAR_SLOP;
    let was_apart_y = prev.max.y <= b.min.y + LINEAR_SLOP || prev.min.y >= b.max.y - LINEAR_SLOP;

    let overlap_x = (a.max.x - b.min.x).min(b.max.x - a.min.x);
    let overlap_y = (a.max.y - b.min.y).min(b.max.y - a.min.y);

    let use_y = match (was_apart_x, was_apart_y) {
        (false, true) => true,
        (true, false) => false,
        _ => overlap_y <= overlap_x,
    };

    let delta = a.center() - b.center();
    if use_y {
        Vec2::new(0.0, if delta.y >= 0.0 { 1.0 } else { -1.0 })
    } else {
        Vec2::new(if delta.x >= 0.0 { 1.0 } else { -1.0 }, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        begins: Vec<(FixtureTag, FixtureTag)>,
        ends: Vec<(FixtureTag, FixtureTag)>,
        pre_solves: usize,
        disable: bool,
    }

    impl ContactListener for Recorder {
        fn begin_contact(&mut self, c: &Contact, _: &mut BodySet) {
            self.begins.push((c.tag_a, c.tag_b));
        }
        fn pre_solve(&mut self, c: &mut Contact, _: &mut BodySet) {
            self.pre_solves += 1;
            if self.disable {
                c.set_enabled(false);
            }
        }
        fn end_contact(&mut self, c: &Contact, _: &mut BodySet) {
            self.ends.push((c.tag_a, c.tag_b));
        }
    }

    fn ground(world: &mut World) -> BodyId {
        let body = world.create_body(BodyDef::new(BodyKind::Static, Vec2::new(0.0, -0.5)));
        world.add_fixture(
            body,
            FixtureDef::solid(Vec2::new(10.0, 0.5), FixtureTag::Obstacle(ObstacleId(0))),
        );
        body
    }

    fn falling_box(world: &mut World, y: f32) -> BodyId {
        let body = world.create_body(BodyDef::new(BodyKind::Dynamic, Vec2::new(0.0, y)));
        world.add_fixture(body, FixtureDef::solid(Vec2::splat(0.5), FixtureTag::Player));
        body
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut world = World::new(-10.0);
        let b = falling_box(&mut world, 5.0);
        world.step(0.1, &mut ());
        assert!(world.bodies().position(b).y < 5.0);
        assert!(world.bodies().velocity(b).y < 0.0);
    }

    #[test]
    fn static_bodies_do_not_move() {
        let mut world = World::new(-10.0);
        let g = ground(&mut world);
        for _ in 0..10 {
            world.step(0.1, &mut ());
        }
        assert_eq!(world.bodies().position(g), Vec2::new(0.0, -0.5));
    }

    #[test]
    fn box_lands_on_ground_and_stays() {
        let mut world = World::new(-10.0);
        ground(&mut world);
        let b = falling_box(&mut world, 2.0);
        let mut rec = Recorder::default();
        for _ in 0..120 {
            world.step(1.0 / 60.0, &mut rec);
        }
        let pos = world.bodies().position(b);
        assert!(
            (pos.y - 0.5).abs() < 0.05,
            "Box should rest on ground, got y={}",
            pos.y
        );
        assert_eq!(rec.begins.len(), 1, "Resting contact must begin once");
        assert!(rec.ends.is_empty(), "Resting contact must not churn");
        assert!(rec.pre_solves > 0);
    }

    #[test]
    fn disabled_contact_lets_body_fall_through() {
        let mut world = World::new(-10.0);
        ground(&mut world);
        let b = falling_box(&mut world, 2.0);
        let mut rec = Recorder {
            disable: true,
            ..Default::default()
        };
        for _ in 0..120 {
            world.step(1.0 / 60.0, &mut rec);
        }
        assert!(world.bodies().position(b).y < -1.0, "Body should fall through");
        assert_eq!(rec.ends.len(), 1, "Contact ends once the body leaves");
    }

    #[test]
    fn sensors_report_but_do_not_block() {
        let mut world = World::new(-10.0);
        let s = world.create_body(BodyDef::new(BodyKind::Static, Vec2::new(0.0, 0.0)));
        world.add_fixture(s, FixtureDef::sensor(Vec2::new(5.0, 0.5), FixtureTag::Goal));
        let b = falling_box(&mut world, 2.0);
        let mut rec = Recorder::default();
        for _ in 0..120 {
            world.step(1.0 / 60.0, &mut rec);
        }
        assert!(world.bodies().position(b).y < -1.0);
        assert_eq!(rec.begins.len(), 1);
        assert_eq!(rec.ends.len(), 1);
        assert_eq!(rec.pre_solves, 0, "Sensors never reach pre_solve");
    }

    #[test]
    fn static_pairs_are_ignored() {
        let mut world = World::new(-10.0);
        ground(&mut world);
        let other = world.create_body(BodyDef::new(BodyKind::Kinematic, Vec2::new(0.0, -0.5)));
        world.add_fixture(other, FixtureDef::solid(Vec2::splat(1.0), FixtureTag::Untagged));
        world.step(0.1, &mut ());
        assert_eq!(world.touching_count(), 0);
    }

    #[test]
    fn disabling_a_body_ends_its_contacts() {
        let mut world = World::new(0.0);
        let s = world.create_body(BodyDef::new(BodyKind::Static, Vec2::ZERO));
        world.add_fixture(s, FixtureDef::sensor(Vec2::splat(1.0), FixtureTag::Goal));
        falling_box(&mut world, 0.0);
        let mut rec = Recorder::default();
        world.step(0.1, &mut rec);
        assert_eq!(rec.begins.len(), 1);
        world.set_enabled(s, false);
        world.step(0.1, &mut rec);
        assert_eq!(rec.ends.len(), 1);
    }

    #[test]
    fn kinematic_moves_by_velocity() {
        let mut world = World::new(-10.0);
        let k = world.create_body(
            BodyDef::new(BodyKind::Kinematic, Vec2::ZERO).with_velocity(Vec2::new(2.0, 0.0)),
        );
        world.step(0.5, &mut ());
        assert_eq!(world.bodies().position(k), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn impulse_scales_by_mass() {
        let mut world = World::new(0.0);
        let b = world.create_body(BodyDef::new(BodyKind::Dynamic, Vec2::ZERO).with_mass(2.0));
        world.bodies_mut().apply_impulse(b, Vec2::new(4.0, 0.0));
        assert_eq!(world.bodies().velocity(b), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn forces_clear_after_step() {
        let mut world = World::new(0.0);
        let b = world.create_body(BodyDef::new(BodyKind::Dynamic, Vec2::ZERO));
        world.bodies_mut().apply_force(b, Vec2::new(10.0, 0.0));
        world.step(0.1, &mut ());
        assert!((world.bodies().velocity(b).x - 1.0).abs() < 1e-5);
        assert_eq!(world.bodies().pending_force(b), Vec2::ZERO);
        world.step(0.1, &mut ());
        assert!((world.bodies().velocity(b).x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn walking_across_seam_does_not_snag() {
        let mut world = World::new(-10.0);
        for i in 0..4 {
            let tile = world.create_body(BodyDef::new(
                BodyKind::Static,
                Vec2::new(i as f32 - 1.5, -0.5),
            ));
            world.add_fixture(
                tile,
                FixtureDef::solid(Vec2::splat(0.5), FixtureTag::Obstacle(ObstacleId(i))),
            );
        }
        let b = falling_box(&mut world, 0.55);
        for _ in 0..60 {
            world.step(1.0 / 60.0, &mut ());
        }
        for _ in 0..60 {
            let v = world.bodies().velocity(b);
            world.bodies_mut().set_velocity(b, Vec2::new(2.0, v.y));
            world.step(1.0 / 60.0, &mut ());
        }
        assert!(
            world.bodies().position(b).x > 1.5,
            "Body should slide over tile seams, got x={}",
            world.bodies().position(b).x
        );
    }

    #[test]
    fn aabb_touching_edges_do_not_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(0.5));
        let b = Aabb::from_center(Vec2::new(1.0, 0.0), Vec2::splat(0.5));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(Vec2::new(-0.1, 0.0))));
    }
}
