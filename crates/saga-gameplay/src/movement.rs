//! Velocity steering toward a movement target.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use saga_common::{direction_between, ActorId, Facing};

use crate::events::{EventBus, GameEvent};
use crate::physics::PhysicsWorld;

/// Steering controller of a mobile actor.
///
/// Each tick the body receives the impulse that turns its current velocity
/// into `direction * max_speed`, where direction points at the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    max_speed: Vec2,
    target: Option<Vec2>,
    moving: bool,
    facing: Option<Facing>,
}

impl Movement {
    /// Creates an idle controller.
    #[must_use]
    pub const fn new(max_speed: Vec2) -> Self {
        Self {
            max_speed,
            target: None,
            moving: false,
            facing: None,
        }
    }

    /// Creates an idle controller with the same speed on both axes.
    #[must_use]
    pub const fn uniform(speed: f32) -> Self {
        Self::new(Vec2::new(speed, speed))
    }

    /// Per-axis speed limit.
    #[must_use]
    pub const fn max_speed(&self) -> Vec2 {
        self.max_speed
    }

    /// Changes the speed limit.
    pub fn set_max_speed(&mut self, max_speed: Vec2) {
        self.max_speed = max_speed;
    }

    /// Point the actor's centre is steered toward.
    #[must_use]
    pub const fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Sets the target and enables steering.
    pub fn move_to(&mut self, target: Vec2) {
        self.target = Some(target);
        self.moving = true;
    }

    /// Drops the target.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// True while steering is enabled.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Enables or disables steering. Zeroing the body velocity is the
    /// caller's job.
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    /// Last published facing.
    #[must_use]
    pub const fn facing(&self) -> Option<Facing> {
        self.facing
    }

    /// Applies this tick's steering impulse.
    pub fn steer(
        &mut self,
        actor: ActorId,
        center: Vec2,
        physics: &mut dyn PhysicsWorld,
        events: &EventBus,
    ) {
        if !self.moving {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        let Some(direction) = direction_between(center, target) else {
            return;
        };

        let desired = direction * self.max_speed;
        let impulse = (desired - physics.linear_velocity(actor)) * physics.mass(actor);
        physics.apply_impulse(actor, impulse);

        let facing = Facing::from_direction(direction);
        if self.facing != Some(facing) {
            self.facing = Some(facing);
            events.publish(GameEvent::MoveStart { actor, facing });
        }
    }
}
