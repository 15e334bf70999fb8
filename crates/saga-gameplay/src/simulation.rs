//! Frame-stepped driver for actors, touch resolvers and brains.

use glam::Vec2;
use tracing::{debug, info, trace};

use saga_common::{ActorId, ArenaError, Clock};

use crate::actor::{Actor, ActorArena, SpawnFlags};
use crate::context::{TickContext, WorldFlags};
use crate::events::{EventBus, GameEvent};
use crate::physics::{Fixture, PhysicsWorld};
use crate::projectile::steer_projectiles;

/// Owns the actors and runs one tick at a time.
///
/// Collision callbacks for a frame must be delivered through
/// [`Simulation::collision_started`] and [`Simulation::collision_ended`]
/// before [`Simulation::tick`] so brains see post-collision health.
#[derive(Debug)]
pub struct Simulation {
    actors: ActorArena,
    events: EventBus,
    flags: WorldFlags,
    rng: fastrand::Rng,
    frame_rate: f32,
    ticks: u64,
}

impl Simulation {
    /// Creates an empty simulation.
    #[must_use]
    pub fn new(seed: u64, frame_rate: f32) -> Self {
        Self {
            actors: ActorArena::new(),
            events: EventBus::default(),
            flags: WorldFlags::default(),
            rng: fastrand::Rng::with_seed(seed),
            frame_rate,
            ticks: 0,
        }
    }

    /// All actors.
    #[must_use]
    pub const fn actors(&self) -> &ActorArena {
        &self.actors
    }

    /// All actors, mutably.
    pub fn actors_mut(&mut self) -> &mut ActorArena {
        &mut self.actors
    }

    /// Outgoing events.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// World switches.
    #[must_use]
    pub const fn flags(&self) -> WorldFlags {
        self.flags
    }

    /// Freezes or releases every pausable enemy.
    pub fn set_enemies_paused(&mut self, paused: bool) {
        if self.flags.enemies_paused != paused {
            info!("Enemies {}", if paused { "paused" } else { "resumed" });
        }
        self.flags.enemies_paused = paused;
    }

    /// Ticks per second.
    #[must_use]
    pub const fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Completed ticks.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Places an actor and publishes [`GameEvent::ActorSpawned`].
    pub fn spawn_at(&mut self, actor: Actor, position: Vec2, flags: SpawnFlags) -> Result<ActorId, ArenaError> {
        self.actors.spawn_at(actor, position, flags, &self.events)
    }

    fn context<'a>(
        &'a mut self,
        owner: ActorId,
        physics: &'a mut dyn PhysicsWorld,
        clock: &'a dyn Clock,
    ) -> TickContext<'a> {
        TickContext {
            owner,
            actors: &mut self.actors,
            physics,
            clock,
            events: &self.events,
            flags: &mut self.flags,
            rng: &mut self.rng,
            frame_rate: self.frame_rate,
        }
    }

    /// Forwards a contact start to the touch resolver of `me`.
    pub fn collision_started(
        &mut self,
        me: Fixture,
        other: Fixture,
        physics: &mut dyn PhysicsWorld,
        clock: &dyn Clock,
    ) {
        let Some(mut touch) = self.actors.get_mut(me.actor).and_then(|actor| actor.touch.take()) else {
            return;
        };
        touch.collision_started(me, other, &mut self.context(me.actor, physics, clock));
        if let Some(actor) = self.actors.get_mut(me.actor) {
            actor.touch = Some(touch);
        }
    }

    /// Forwards a contact end to the touch resolver of `me`.
    pub fn collision_ended(
        &mut self,
        me: Fixture,
        other: Fixture,
        physics: &mut dyn PhysicsWorld,
        clock: &dyn Clock,
    ) {
        let Some(mut touch) = self.actors.get_mut(me.actor).and_then(|actor| actor.touch.take()) else {
            return;
        };
        touch.collision_ended(me, other, &mut self.context(me.actor, physics, clock));
        if let Some(actor) = self.actors.get_mut(me.actor) {
            actor.touch = Some(touch);
        }
    }

    /// Advances the world by one frame.
    ///
    /// Order: sustained touch contacts, brains, projectile targets, steering,
    /// then removal of actors whose time is up.
    pub fn tick(&mut self, physics: &mut dyn PhysicsWorld, clock: &dyn Clock) {
        let ids = self.actors.ids();

        for &id in &ids {
            let Some(mut touch) = self.actors.get_mut(id).and_then(|actor| actor.touch.take()) else {
                continue;
            };
            touch.update(&mut self.context(id, physics, clock));
            if let Some(actor) = self.actors.get_mut(id) {
                actor.touch = Some(touch);
            }
        }

        for &id in &ids {
            let Some(mut brain) = self.actors.get_mut(id).and_then(|actor| actor.brain.take()) else {
                continue;
            };
            brain.tick(&mut self.context(id, physics, clock));
            if let Some(actor) = self.actors.get_mut(id) {
                actor.brain = Some(brain);
            }
        }

        let now = clock.now_ms();
        steer_projectiles(&mut self.actors, now);

        for id in self.actors.ids() {
            let Some(actor) = self.actors.get_mut(id) else {
                continue;
            };
            let center = actor.center();
            if let Some(movement) = actor.movement.as_mut() {
                movement.steer(id, center, physics, &self.events);
            }
        }

        self.reap(now, physics, clock);
        self.ticks += 1;
        trace!("Tick {} done, {} actors", self.ticks, self.actors.len());
    }

    fn reap(&mut self, now: u64, physics: &mut dyn PhysicsWorld, clock: &dyn Clock) {
        for id in self.actors.take_due_removals(now) {
            let mut actor = match self.actors.remove(id) {
                Ok(actor) => actor,
                Err(e) => {
                    trace!("Skipping removal: {}", e);
                    continue;
                }
            };
            if let Some(touch) = actor.touch.as_mut() {
                touch.dispose();
            }
            if let Some(mut brain) = actor.brain.take() {
                brain.dispose(&mut self.context(id, physics, clock));
            }
            debug!("Removed {:?} {}", actor.kind, id);
            self.events.publish(GameEvent::ActorRemoved { actor: id });
        }
    }
}
