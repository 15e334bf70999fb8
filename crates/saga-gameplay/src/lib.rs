//! # Saga Gameplay
//!
//! NPC behavior and combat for Saga.
//!
//! This crate provides:
//! - Actors in a generational arena
//! - Per-actor AI task schedulers with priority arbitration
//! - Behavior tasks (wander, chase, anchored retreat, pause, death,
//!   teleport, shoot, summon)
//! - Touch combat with per-target hit cooldowns and knockback
//! - Projectile targeting strategies and the boss fireball pool
//! - A typed event bus and a physics collaborator trait with a mock
//! - A frame-stepped [`Simulation`] driving all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod anchor;
pub mod behavior;
pub mod chase;
pub mod combat_stats;
pub mod config;
pub mod context;
pub mod cooldown;
pub mod events;
pub mod movement;
pub mod pause;
pub mod physics;
pub mod projectile;
pub mod scheduler;
pub mod shoot;
pub mod simulation;
pub mod summon;
pub mod teleport;
pub mod touch;
pub mod wander;

#[cfg(test)]
mod test_support;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::anchor::*;
    pub use crate::behavior::*;
    pub use crate::chase::*;
    pub use crate::combat_stats::*;
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::cooldown::*;
    pub use crate::events::*;
    pub use crate::movement::*;
    pub use crate::pause::*;
    pub use crate::physics::*;
    pub use crate::projectile::*;
    pub use crate::scheduler::*;
    pub use crate::shoot::*;
    pub use crate::simulation::*;
    pub use crate::summon::*;
    pub use crate::teleport::*;
    pub use crate::touch::*;
    pub use crate::wander::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_priority_bands_are_ordered() {
        let bands = [
            priority::WANDER,
            priority::CHASE,
            priority::ZIGZAG_CHASE,
            priority::RETREAT,
            priority::SHOOT,
            priority::TELEPORT,
            priority::SUMMON,
            priority::PAUSE,
            priority::DEATH,
        ];
        assert!(priority::INELIGIBLE < 0);
        assert!(bands.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_spawn_through_prelude() {
        let mut sim = Simulation::new(1, 60.0);
        let id = sim
            .spawn_at(
                Actor::new(ActorKind::Melee).with_stats(CombatStats::new(50, 5)),
                Vec2::new(2.0, 2.0),
                SpawnFlags::CENTERED,
            )
            .expect("spawn");

        assert_eq!(sim.actors().get(id).map(Actor::center), Some(Vec2::new(2.0, 2.0)));
        assert!(matches!(
            sim.events().drain().as_slice(),
            [GameEvent::ActorSpawned { kind: ActorKind::Melee, .. }]
        ));
    }
}
