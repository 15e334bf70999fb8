//! Per-tick context handed to behavior tasks and touch resolvers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use saga_common::{ActorId, Clock};

use crate::actor::{Actor, ActorArena};
use crate::events::{EventBus, GameEvent};
use crate::physics::{PhysicsLayer, PhysicsWorld};

/// World-level switches owned by the simulation and flipped externally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldFlags {
    /// Freezes every pausable enemy
    pub enemies_paused: bool,
    /// Set once a guard spots the player
    pub alarm_raised: bool,
}

/// Everything a task or resolver may touch during one tick.
pub struct TickContext<'a> {
    /// Actor currently being processed
    pub owner: ActorId,
    /// All actors
    pub actors: &'a mut ActorArena,
    /// Physics collaborator
    pub physics: &'a mut dyn PhysicsWorld,
    /// Monotonic time source
    pub clock: &'a dyn Clock,
    /// Outgoing notifications
    pub events: &'a EventBus,
    /// World switches
    pub flags: &'a mut WorldFlags,
    /// Seeded random source
    pub rng: &'a mut fastrand::Rng,
    /// Simulation ticks per second
    pub frame_rate: f32,
}

impl std::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickContext")
            .field("owner", &self.owner)
            .field("actors", &self.actors.len())
            .field("flags", &self.flags)
            .field("frame_rate", &self.frame_rate)
            .finish_non_exhaustive()
    }
}

impl TickContext<'_> {
    /// Current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The owner, if it still exists.
    #[must_use]
    pub fn owner(&self) -> Option<&Actor> {
        self.actors.get(self.owner)
    }

    /// The owner, mutably.
    pub fn owner_mut(&mut self) -> Option<&mut Actor> {
        self.actors.get_mut(self.owner)
    }

    /// Centre of any live actor.
    #[must_use]
    pub fn center_of(&self, id: ActorId) -> Option<Vec2> {
        self.actors.get(id).map(Actor::center)
    }

    /// Publishes an event.
    pub fn publish(&self, event: GameEvent) {
        self.events.publish(event);
    }

    /// True when neither the centre-to-centre nor the position-to-position
    /// ray between two actors hits an obstacle.
    #[must_use]
    pub fn can_see(&self, from: ActorId, to: ActorId) -> bool {
        let (Some(a), Some(b)) = (self.actors.get(from), self.actors.get(to)) else {
            return false;
        };
        let mask = PhysicsLayer::OBSTACLE;
        self.physics.raycast(a.center(), b.center(), mask).is_none()
            && self.physics.raycast(a.position, b.position, mask).is_none()
    }

    /// Distance between the owner's centre and another actor's centre.
    #[must_use]
    pub fn distance_to(&self, id: ActorId) -> Option<f32> {
        Some(self.owner()?.center().distance(self.center_of(id)?))
    }

    /// Steers the owner toward `center`.
    pub fn move_owner_to(&mut self, center: Vec2) {
        if let Some(movement) = self.owner_mut().and_then(|actor| actor.movement.as_mut()) {
            movement.move_to(center);
        }
    }

    /// Disables the owner's steering and zeroes its velocity.
    pub fn halt_owner(&mut self) {
        let owner = self.owner;
        if let Some(movement) = self.owner_mut().and_then(|actor| actor.movement.as_mut()) {
            movement.set_moving(false);
            movement.clear_target();
        }
        if self.physics.has_body(owner) {
            self.physics.set_linear_velocity(owner, Vec2::ZERO);
        }
    }

    /// Re-enables the owner's steering.
    pub fn resume_owner(&mut self) {
        if let Some(movement) = self.owner_mut().and_then(|actor| actor.movement.as_mut()) {
            movement.set_moving(true);
        }
    }
}
