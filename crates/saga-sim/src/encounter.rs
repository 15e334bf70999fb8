//! Arena layout and encounter script.

use anyhow::{Context, Result};
use glam::Vec2;
use tracing::info;

use saga_common::{unit_from_deg, ActorId};
use saga_gameplay::{ActorKind, MockPhysics, Simulation, SpawnFlags, AABB};

use crate::config::SimConfig;
use crate::roster::Roster;

/// Where the boss waits.
pub const BOSS_POSITION: Vec2 = Vec2::new(24.0, 0.0);

/// Player distance from the boss that starts the boss fight.
pub const BOSS_TRIGGER_RADIUS: f32 = 14.0;

/// Distance of the regular enemies from the player start.
const ENEMY_RING_RADIUS: f32 = 10.0;

/// Handles of the actors the script cares about.
#[derive(Debug)]
pub struct Encounter {
    player: ActorId,
    boss: Option<ActorId>,
    boss_fight: bool,
}

impl Encounter {
    /// Lays out walls, the player and the configured roster.
    pub fn build(sim: &mut Simulation, physics: &mut MockPhysics, config: &SimConfig) -> Result<Self> {
        physics.add_obstacle(AABB::new(Vec2::new(5.0, -1.0), Vec2::new(6.0, 1.0)));
        physics.add_obstacle(AABB::new(Vec2::new(-8.0, 6.0), Vec2::new(-6.0, 7.0)));
        physics.add_obstacle(AABB::new(Vec2::new(14.0, -6.0), Vec2::new(15.0, -3.0)));

        let player = sim
            .spawn_at(Roster::player(&config.combat), Vec2::ZERO, SpawnFlags::CENTERED)
            .context("spawning player")?;
        let roster = Roster::new(config.combat.clone(), player);

        let roster_cfg = &config.roster;
        let mut enemies = Vec::new();
        enemies.extend((0..roster_cfg.melee).map(|_| roster.melee()));
        enemies.extend((0..roster_cfg.humanoids).map(|_| roster.humanoid()));
        enemies.extend((0..roster_cfg.archers).map(|_| roster.archer()));
        enemies.extend((0..roster_cfg.assassins).map(|_| roster.assassin()));

        let step = 360.0 / enemies.len().max(1) as f32;
        for (i, enemy) in enemies.into_iter().enumerate() {
            let spot = unit_from_deg(step * i as f32 + 90.0) * ENEMY_RING_RADIUS;
            sim.spawn_at(enemy, spot, SpawnFlags::CENTERED)
                .context("spawning enemy")?;
        }

        for i in 0..roster_cfg.guards {
            let spot = Vec2::new(-12.0, 12.0 - 8.0 * i as f32);
            let post = sim
                .spawn_at(Roster::guard_post(), spot, SpawnFlags::CENTERED)
                .context("spawning guard post")?;
            sim.spawn_at(roster.guard(post), spot, SpawnFlags::CENTERED)
                .context("spawning guard")?;
        }

        let boss = if roster_cfg.boss {
            Some(
                sim.spawn_at(roster.boss(), BOSS_POSITION, SpawnFlags::CENTERED)
                    .context("spawning boss")?,
            )
        } else {
            None
        };

        info!("Encounter ready with {} actors", sim.actors().len());
        Ok(Self {
            player,
            boss,
            boss_fight: false,
        })
    }

    /// Player handle.
    #[must_use]
    pub const fn player(&self) -> ActorId {
        self.player
    }

    /// True once the boss fight began.
    #[must_use]
    pub const fn boss_fight(&self) -> bool {
        self.boss_fight
    }

    /// Starts the boss fight when the player comes close enough.
    pub fn update(&mut self, sim: &mut Simulation) {
        if self.boss_fight {
            return;
        }
        let Some(boss) = self.boss else {
            return;
        };
        let (Some(player), Some(boss_center)) = (
            sim.actors().get(self.player).map(|a| a.center()),
            sim.actors().get(boss).map(|a| a.center()),
        ) else {
            return;
        };
        if player.distance(boss_center) > BOSS_TRIGGER_RADIUS {
            return;
        }
        if let Some(actor) = sim.actors_mut().get_mut(boss) {
            actor.encounter_ready = true;
            self.boss_fight = true;
            info!("Boss fight started");
        }
    }

    /// The run ends when the player is gone or no hostile actor is left.
    #[must_use]
    pub fn is_over(&self, sim: &Simulation) -> bool {
        if !sim.actors().contains(self.player) {
            return true;
        }
        !sim.actors().iter().any(|(_, actor)| {
            !matches!(
                actor.kind,
                ActorKind::Player | ActorKind::Anchor | ActorKind::Decoy | ActorKind::Projectile(_)
            )
        })
    }
}
