//! Physics collaborator contract.
//!
//! The combat and behavior code never owns a physics engine. It reaches the
//! world through [`PhysicsWorld`]: obstacle raycasts for visibility and aim,
//! and body calls for impulses and velocity. [`MockPhysics`] is a small
//! kinematic implementation with axis-aligned obstacles, used by tests and
//! the headless runner.

use ahash::AHashMap;
use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use saga_common::ActorId;

use crate::actor::ActorArena;

bitflags! {
    /// Collision layer mask of a fixture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PhysicsLayer: u16 {
        /// Player-controlled characters
        const PLAYER = 1 << 0;
        /// Static terrain and walls
        const OBSTACLE = 1 << 1;
        /// Hostile characters
        const NPC = 1 << 2;
        /// Projectiles in flight
        const PROJECTILE_WEAPON = 1 << 3;
        /// Projectiles waiting to be launched
        const IDLE_PROJECTILE_WEAPON = 1 << 4;
    }
}

impl PhysicsLayer {
    /// True for either projectile layer.
    #[must_use]
    pub fn is_projectile(self) -> bool {
        self.intersects(Self::PROJECTILE_WEAPON | Self::IDLE_PROJECTILE_WEAPON)
    }
}

/// One side of a contact: the owning actor and the layer of its fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixture {
    /// Owning actor
    pub actor: ActorId,
    /// Fixture layer
    pub layer: PhysicsLayer,
}

impl Fixture {
    /// Creates a fixture handle.
    #[must_use]
    pub const fn new(actor: ActorId, layer: PhysicsLayer) -> Self {
        Self { actor, layer }
    }
}

/// Closest obstacle hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World-space hit point
    pub point: Vec2,
    /// Fraction of the segment travelled before the hit (0.0 to 1.0)
    pub fraction: f32,
}

/// Physics services consumed by combat and behavior code.
pub trait PhysicsWorld {
    /// Casts a segment from `origin` to `destination` against fixtures in
    /// `mask` and returns the closest hit.
    fn raycast(&self, origin: Vec2, destination: Vec2, mask: PhysicsLayer) -> Option<RaycastHit>;

    /// True if the actor has a simulated body.
    fn has_body(&self, actor: ActorId) -> bool;

    /// Applies an impulse at the body centre.
    fn apply_impulse(&mut self, actor: ActorId, impulse: Vec2);

    /// Current linear velocity, zero for actors without a body.
    fn linear_velocity(&self, actor: ActorId) -> Vec2;

    /// Overwrites the linear velocity.
    fn set_linear_velocity(&mut self, actor: ActorId, velocity: Vec2);

    /// Body mass, zero for actors without a body.
    fn mass(&self, actor: ActorId) -> f32;
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl AABB {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from its lower-left corner and size.
    #[must_use]
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, position + size)
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Checks if this box overlaps another.
    #[must_use]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Checks if a point lies inside (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Entry fraction of the segment `origin -> origin + delta`, if it hits.
    #[must_use]
    pub fn segment_entry(&self, origin: Vec2, delta: Vec2) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;
        for axis in 0..2 {
            let (o, d, lo, hi) = (origin[axis], delta[axis], self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let mut t1 = (lo - o) / d;
            let mut t2 = (hi - o) / d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

#[derive(Debug, Clone, Copy)]
struct Obstacle {
    bounds: AABB,
    layer: PhysicsLayer,
}

#[derive(Debug, Clone, Copy)]
struct Body {
    velocity: Vec2,
    mass: f32,
}

/// Kinematic physics stand-in with box obstacles.
#[derive(Debug, Default)]
pub struct MockPhysics {
    obstacles: Vec<Obstacle>,
    bodies: AHashMap<ActorId, Body>,
    impulses: Vec<(ActorId, Vec2)>,
}

impl MockPhysics {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a static obstacle on the obstacle layer.
    pub fn add_obstacle(&mut self, bounds: AABB) {
        self.obstacles.push(Obstacle {
            bounds,
            layer: PhysicsLayer::OBSTACLE,
        });
    }

    /// Creates or replaces a dynamic body.
    pub fn add_body(&mut self, actor: ActorId, mass: f32) {
        self.bodies.insert(
            actor,
            Body {
                velocity: Vec2::ZERO,
                mass,
            },
        );
    }

    /// Removes a body.
    pub fn remove_body(&mut self, actor: ActorId) {
        self.bodies.remove(&actor);
    }

    /// Impulses applied since the last clear, in order.
    #[must_use]
    pub fn impulses(&self) -> &[(ActorId, Vec2)] {
        &self.impulses
    }

    /// Impulses applied to one actor.
    #[must_use]
    pub fn impulses_on(&self, actor: ActorId) -> Vec<Vec2> {
        self.impulses
            .iter()
            .filter(|(id, _)| *id == actor)
            .map(|(_, impulse)| *impulse)
            .collect()
    }

    /// Clears the impulse log.
    pub fn clear_impulses(&mut self) {
        self.impulses.clear();
    }

    /// Integrates velocities into arena positions and drops bodies whose
    /// actor is gone.
    pub fn step(&mut self, actors: &mut ActorArena, dt_secs: f32) {
        self.bodies.retain(|id, body| match actors.get_mut(*id) {
            Some(actor) => {
                actor.position += body.velocity * dt_secs;
                true
            }
            None => false,
        });
    }
}

impl PhysicsWorld for MockPhysics {
    fn raycast(&self, origin: Vec2, destination: Vec2, mask: PhysicsLayer) -> Option<RaycastHit> {
        let delta = destination - origin;
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.layer.intersects(mask))
            .filter_map(|obstacle| obstacle.bounds.segment_entry(origin, delta))
            .min_by(f32::total_cmp)
            .map(|fraction| RaycastHit {
                point: origin + delta * fraction,
                fraction,
            })
    }

    fn has_body(&self, actor: ActorId) -> bool {
        self.bodies.contains_key(&actor)
    }

    fn apply_impulse(&mut self, actor: ActorId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            if body.mass > 0.0 {
                body.velocity += impulse / body.mass;
            }
            self.impulses.push((actor, impulse));
        }
    }

    fn linear_velocity(&self, actor: ActorId) -> Vec2 {
        self.bodies.get(&actor).map_or(Vec2::ZERO, |body| body.velocity)
    }

    fn set_linear_velocity(&mut self, actor: ActorId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.velocity = velocity;
        }
    }

    fn mass(&self, actor: ActorId) -> f32 {
        self.bodies.get(&actor).map_or(0.0, |body| body.mass)
    }
}
