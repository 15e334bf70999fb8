//! Shared fixtures for unit tests.

use saga_common::{ActorId, ManualClock};

use crate::actor::{Actor, ActorArena};
use crate::context::{TickContext, WorldFlags};
use crate::events::EventBus;
use crate::physics::MockPhysics;

/// Collaborators for driving tasks by hand.
pub struct TestWorld {
    pub actors: ActorArena,
    pub physics: MockPhysics,
    pub clock: ManualClock,
    pub events: EventBus,
    pub flags: WorldFlags,
    pub rng: fastrand::Rng,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            actors: ActorArena::new(),
            physics: MockPhysics::new(),
            clock: ManualClock::new(1_000),
            events: EventBus::default(),
            flags: WorldFlags::default(),
            rng: fastrand::Rng::with_seed(0x5a6a),
        }
    }

    pub fn ctx(&mut self, owner: ActorId) -> TickContext<'_> {
        TickContext {
            owner,
            actors: &mut self.actors,
            physics: &mut self.physics,
            clock: &self.clock,
            events: &self.events,
            flags: &mut self.flags,
            rng: &mut self.rng,
            frame_rate: 60.0,
        }
    }

    /// Inserts an actor and gives it a unit-mass body.
    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        let id = self.actors.insert(actor).expect("insert");
        self.physics.add_body(id, 1.0);
        id
    }

    pub fn health(&self, id: ActorId) -> u32 {
        self.actors
            .get(id)
            .and_then(|actor| actor.stats)
            .map_or(0, |stats| stats.health())
    }

    pub fn move_center(&mut self, id: ActorId, center: glam::Vec2) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.set_center(center);
        }
    }
}
