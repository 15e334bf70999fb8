//! Event consumer: keeps the mock physics bodies in sync and counts what
//! happened during a run.

use tracing::{debug, info};

use saga_gameplay::{ActorKind, GameEvent, MockPhysics};

/// Mass of every dynamic body created for a spawned actor.
pub const BODY_MASS: f32 = 1.0;

/// Running totals of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BattleTally {
    /// Actors placed in the world
    pub spawned: u32,
    /// Actors removed from the world
    pub removed: u32,
    /// Damaging hits
    pub hits: u32,
    /// Total damage dealt
    pub damage: u64,
    /// Deaths started
    pub deaths: u32,
    /// Shots fired, charged releases and fireball launches included
    pub shots: u32,
    /// Defensive teleports
    pub teleports: u32,
    /// Summon waves
    pub summons: u32,
    /// Projectiles that broke on impact
    pub broken_projectiles: u32,
    /// Alarms raised
    pub alarms: u32,
}

impl BattleTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one batch of events.
    pub fn absorb(&mut self, events: Vec<GameEvent>, physics: &mut MockPhysics, log_events: bool) {
        for event in events {
            if log_events {
                debug!("{:?}", event);
            }
            match event {
                GameEvent::ActorSpawned { actor, kind, .. } => {
                    self.spawned += 1;
                    if kind != ActorKind::Anchor {
                        physics.add_body(actor, BODY_MASS);
                    }
                },
                GameEvent::ActorRemoved { actor } => {
                    self.removed += 1;
                    physics.remove_body(actor);
                },
                GameEvent::ActorDamaged { amount, .. } => {
                    self.hits += 1;
                    self.damage += u64::from(amount);
                },
                GameEvent::DeathStarted { actor, .. } => {
                    self.deaths += 1;
                    info!("{} is dying", actor);
                },
                GameEvent::ShootAnimation { .. } => self.shots += 1,
                GameEvent::Teleported { actor, to, .. } => {
                    self.teleports += 1;
                    info!("{} teleported to ({:.1}, {:.1})", actor, to.x, to.y);
                },
                GameEvent::Summoned { actor, kind, spawned } => {
                    self.summons += 1;
                    info!("{} summoned {} {:?}", actor, spawned.len(), kind);
                },
                GameEvent::ProjectileBroken { .. } => self.broken_projectiles += 1,
                GameEvent::AlarmRaised { actor } => {
                    self.alarms += 1;
                    info!("{} raised the alarm", actor);
                },
                _ => {},
            }
        }
    }
}
