//! Tuning records read once when actors are created.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat_stats::CombatStats;
use crate::movement::Movement;

/// Stats and physical tuning of one actor archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTuning {
    /// Starting health
    pub health: u32,
    /// Damage per hit
    pub base_attack: u32,
    /// Maximum speed in units per second
    pub speed: f32,
    /// Ranged attack reach
    pub attack_range: f32,
    /// Knockback impulse on touch
    pub knockback: f32,
    /// Edge length of the hitbox
    pub size: f32,
}

impl Default for ActorTuning {
    fn default() -> Self {
        Self {
            health: 100,
            base_attack: 10,
            speed: 2.0,
            attack_range: 0.0,
            knockback: 1.0,
            size: 1.0,
        }
    }
}

impl ActorTuning {
    /// Creates tuning with the given health and attack.
    #[must_use]
    pub fn new(health: u32, base_attack: u32) -> Self {
        Self {
            health,
            base_attack,
            ..Self::default()
        }
    }

    /// Sets speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Sets attack range.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Sets knockback.
    #[must_use]
    pub fn with_knockback(mut self, knockback: f32) -> Self {
        self.knockback = knockback;
        self
    }

    /// Fresh combat stats.
    #[must_use]
    pub const fn stats(&self) -> CombatStats {
        CombatStats::new(self.health, self.base_attack)
    }

    /// Idle steering controller.
    #[must_use]
    pub const fn movement(&self) -> Movement {
        Movement::uniform(self.speed)
    }

    /// Hitbox size.
    #[must_use]
    pub fn size_vec(&self) -> Vec2 {
        Vec2::splat(self.size)
    }
}

/// Tuning of one projectile flavour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Flight speed
    pub speed: f32,
    /// Damage on contact
    pub base_attack: u32,
    /// Knockback on contact
    pub knockback: f32,
    /// Edge length of the hitbox
    pub size: f32,
    /// Lifetime before removal, `None` for unlimited. Pooled fireballs count
    /// it from launch.
    pub lifetime_ms: Option<u64>,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 6.0,
            base_attack: 10,
            knockback: 1.5,
            size: 0.5,
            lifetime_ms: Some(4_000),
        }
    }
}

/// Timing of a shooter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    /// Minimum time between shots (and charge time of charged shots)
    pub cooldown_ms: u64,
    /// Expected number of extra projectile pairs per shot
    pub multishot_chance: f32,
    /// Time the shooter holds still after a shot
    pub shoot_animation_ms: u64,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 2_000,
            multishot_chance: 0.0,
            shoot_animation_ms: 500,
        }
    }
}

/// All combat tuning of an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Player character
    pub player: ActorTuning,
    /// Plain melee enemy
    pub melee: ActorTuning,
    /// Armed humanoid
    pub humanoid: ActorTuning,
    /// Archer
    pub archer: ActorTuning,
    /// Assassin
    pub assassin: ActorTuning,
    /// Boss
    pub boss: ActorTuning,
    /// Summoned minion
    pub minion: ActorTuning,
    /// Straight arrow
    pub arrow: ProjectileTuning,
    /// Homing arrow
    pub tracking_arrow: ProjectileTuning,
    /// Charged arrow
    pub fast_arrow: ProjectileTuning,
    /// Boss fireball
    pub fireball: ProjectileTuning,
    /// Archer timing
    pub archer_shooting: ShooterTuning,
    /// Assassin timing
    pub assassin_shooting: ShooterTuning,
    /// Boss timing
    pub boss_shooting: ShooterTuning,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            player: ActorTuning::new(100, 10).with_speed(3.0).with_knockback(1.0),
            melee: ActorTuning::new(60, 10).with_speed(1.5).with_knockback(2.0),
            humanoid: ActorTuning::new(80, 15).with_speed(1.8).with_knockback(3.0),
            archer: ActorTuning::new(50, 5).with_speed(1.5).with_attack_range(8.0),
            assassin: ActorTuning::new(40, 8).with_speed(2.5).with_attack_range(10.0),
            boss: ActorTuning {
                size: 2.0,
                ..ActorTuning::new(1_000, 20)
                    .with_speed(1.0)
                    .with_attack_range(12.0)
                    .with_knockback(5.0)
            },
            minion: ActorTuning::new(30, 5).with_speed(2.0).with_knockback(0.5),
            arrow: ProjectileTuning::default(),
            tracking_arrow: ProjectileTuning {
                speed: 4.0,
                base_attack: 8,
                ..ProjectileTuning::default()
            },
            fast_arrow: ProjectileTuning {
                speed: 14.0,
                base_attack: 25,
                knockback: 3.0,
                ..ProjectileTuning::default()
            },
            fireball: ProjectileTuning {
                speed: 5.0,
                base_attack: 20,
                knockback: 4.0,
                size: 0.8,
                lifetime_ms: Some(6_000),
            },
            archer_shooting: ShooterTuning {
                cooldown_ms: 2_000,
                multishot_chance: 0.5,
                shoot_animation_ms: 500,
            },
            assassin_shooting: ShooterTuning {
                cooldown_ms: 1_500,
                multishot_chance: 0.0,
                shoot_animation_ms: 200,
            },
            boss_shooting: ShooterTuning {
                cooldown_ms: 2_000,
                multishot_chance: 0.0,
                shoot_animation_ms: 500,
            },
        }
    }
}
