//! Event bus for gameplay notifications.
//!
//! Combat and behavior code publishes typed [`GameEvent`]s; animation, audio
//! and UI collaborators drain them. Publishing never blocks.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use saga_common::{ActorId, Facing};

use crate::actor::ActorKind;

/// What a summon task brought into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummonKind {
    /// Hostile helpers
    Minions,
    /// Look-alikes that draw attention
    Decoys,
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Actor placed in the world
    ActorSpawned {
        /// Actor ID
        actor: ActorId,
        /// Actor kind
        kind: ActorKind,
        /// Spawn position
        position: Vec2,
    },
    /// Actor removed from the world
    ActorRemoved {
        /// Actor ID
        actor: ActorId,
    },
    /// Actor lost health
    ActorDamaged {
        /// Damaged actor
        target: ActorId,
        /// Source actor (if any)
        source: Option<ActorId>,
        /// Health actually removed
        amount: u32,
        /// Health left
        remaining: u32,
    },
    /// Melee attack animation
    AttackAnimation {
        /// Attacker
        actor: ActorId,
        /// Direction bucket toward the target
        facing: Facing,
    },
    /// Ranged attack animation
    ShootAnimation {
        /// Shooter
        actor: ActorId,
        /// Direction bucket toward the target
        facing: Facing,
    },
    /// Movement direction changed
    MoveStart {
        /// Moving actor
        actor: ActorId,
        /// New facing
        facing: Facing,
    },
    /// Projectile hit something and dissolves
    ProjectileBroken {
        /// Projectile actor
        actor: ActorId,
    },
    /// Death animation started
    DeathStarted {
        /// Dying actor
        actor: ActorId,
        /// Facing for the death animation
        facing: Facing,
    },
    /// Actor relocated instantly
    Teleported {
        /// Teleporting actor
        actor: ActorId,
        /// Old position
        from: Vec2,
        /// New position
        to: Vec2,
    },
    /// Charge-up telegraph line
    AimingLine {
        /// Shooter
        actor: ActorId,
        /// Line start
        from: Vec2,
        /// Line end
        to: Vec2,
        /// RGBA colour
        color: [f32; 4],
    },
    /// Telegraph line removed
    AimingLineCleared {
        /// Shooter
        actor: ActorId,
    },
    /// Pooled fireball sent toward a target
    FireballLaunched {
        /// Shooter
        actor: ActorId,
        /// Fireball actor
        fireball: ActorId,
    },
    /// Summon task spawned helpers
    Summoned {
        /// Summoner
        actor: ActorId,
        /// What was summoned
        kind: SummonKind,
        /// Spawned actors
        spawned: Vec<ActorId>,
    },
    /// Area blast
    Explosion {
        /// Source actor
        actor: ActorId,
        /// Blast centre
        center: Vec2,
        /// Blast radius
        radius: f32,
    },
    /// Alarm raised by a guard
    AlarmRaised {
        /// Guard that spotted the target
        actor: ActorId,
    },
}

/// Bounded, fire-and-forget queue of [`GameEvent`]s.
///
/// Producers hold a shared reference; the frame driver drains the queue once
/// per tick. A full queue drops new events rather than stalling a tick.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undrained events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Queues `event`, dropping it when the bus is full.
    pub fn publish(&self, event: GameEvent) {
        if let Err(err) = self.sender.try_send(event) {
            trace!("event bus full, dropped {:?}", err.into_inner());
        }
    }

    /// Takes every queued event in publication order.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_publication_order() {
        let bus = EventBus::new(8);
        let actor = ActorId::new(0, 0);
        bus.publish(GameEvent::ActorRemoved { actor });
        bus.publish(GameEvent::AlarmRaised { actor });

        assert_eq!(
            bus.drain(),
            vec![
                GameEvent::ActorRemoved { actor },
                GameEvent::AlarmRaised { actor }
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_full_bus_drops_newest() {
        let bus = EventBus::new(1);
        let actor = ActorId::new(1, 0);
        bus.publish(GameEvent::ActorRemoved { actor });
        bus.publish(GameEvent::AlarmRaised { actor });
        assert_eq!(bus.drain(), vec![GameEvent::ActorRemoved { actor }]);

        bus.publish(GameEvent::AlarmRaised { actor });
        assert_eq!(bus.drain(), vec![GameEvent::AlarmRaised { actor }]);
    }
}
