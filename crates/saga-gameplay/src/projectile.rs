//! Projectile actors: construction, multishot spread and per-tick steering.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use saga_common::ActorId;

use crate::actor::{Actor, ActorArena, ActorKind, SpawnFlags};
use crate::combat_stats::CombatStats;
use crate::config::ProjectileTuning;
use crate::context::TickContext;
use crate::movement::Movement;
use crate::physics::PhysicsLayer;
use crate::touch::TouchAttack;

/// Straight shots aim at the target's offset scaled by this factor, so the
/// arrow keeps flying past it.
pub const OVERSHOOT_FACTOR: f32 = 30.0;

/// Minimum spread divisor for multishot pairs.
pub const MIN_MULTISHOT_DIVISOR: f32 = 8.0;

/// Flavour of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Flies straight to a fixed point
    Arrow,
    /// Follows a live target
    TrackingArrow,
    /// Released after a charge-up
    FastArrow,
    /// Pooled boss projectile that hovers until launched
    Fireball,
}

/// Projectile state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Flavour
    pub kind: ProjectileKind,
    /// Actor that fired it
    pub shooter: ActorId,
    /// Point it flies toward
    pub destination: Vec2,
    /// Target followed by tracking projectiles
    pub homing_target: Option<ActorId>,
    /// Hover offset from the shooter's centre while idle
    pub hover_offset: Vec2,
    /// False while a pooled projectile waits to be launched
    pub moving: bool,
    /// Removal time
    pub expires_at_ms: Option<u64>,
}

impl Projectile {
    /// Creates an in-flight projectile heading to `destination`.
    #[must_use]
    pub const fn new(kind: ProjectileKind, shooter: ActorId, destination: Vec2) -> Self {
        Self {
            kind,
            shooter,
            destination,
            homing_target: None,
            hover_offset: Vec2::ZERO,
            moving: true,
            expires_at_ms: None,
        }
    }
}

/// Builds a projectile actor from tuning values.
#[must_use]
pub fn build_projectile(
    kind: ProjectileKind,
    shooter: ActorId,
    tuning: &ProjectileTuning,
    target_layer: PhysicsLayer,
    now_ms: u64,
) -> Actor {
    let mut state = Projectile::new(kind, shooter, Vec2::ZERO);
    state.expires_at_ms = tuning.lifetime_ms.map(|lifetime| now_ms + lifetime);
    Actor::new(ActorKind::Projectile(kind))
        .with_size(Vec2::splat(tuning.size))
        .with_layer(PhysicsLayer::PROJECTILE_WEAPON)
        .with_stats(CombatStats::new(1, tuning.base_attack))
        .with_movement(Movement::uniform(tuning.speed))
        .with_touch(TouchAttack::new(target_layer, tuning.knockback))
        .with_projectile(state)
}

/// Spawns a projectile centred on `origin` flying toward `destination`.
///
/// Returns `None` when the arena refuses the spawn.
pub fn launch(ctx: &mut TickContext<'_>, mut actor: Actor, origin: Vec2, destination: Vec2) -> Option<ActorId> {
    if let Some(state) = actor.projectile.as_mut() {
        state.destination = destination;
    }
    if let Some(movement) = actor.movement.as_mut() {
        movement.move_to(destination);
    }
    match ctx.actors.spawn_at(actor, origin, SpawnFlags::CENTERED, ctx.events) {
        Ok(id) => Some(id),
        Err(err) => {
            warn!("Projectile spawn failed: {}", err);
            None
        }
    }
}

/// Number of extra symmetric pairs for a multishot chance.
///
/// Draws `u` in `[0, 1)` and adds a pair while the remaining chance is at
/// least `u`, subtracting one per pair. The integer part of `chance` is
/// guaranteed; the fraction is the probability of one more pair.
pub fn multishot_pairs(chance: f32, rng: &mut fastrand::Rng) -> u32 {
    if chance <= 0.0 {
        return 0;
    }
    let mut pairs = 0;
    let mut remaining = chance;
    let mut draw = rng.f32();
    while remaining >= draw {
        pairs += 1;
        draw = rng.f32();
        remaining -= 1.0;
    }
    pairs
}

/// Angular spacing between multishot pairs, in degrees.
#[must_use]
pub fn multishot_spacing_deg(chance: f32) -> f32 {
    360.0 / (chance.floor().max(MIN_MULTISHOT_DIVISOR) * 2.0 + 1.0)
}

/// Per-tick projectile pass: expiry, hovering, homing and flight targets.
pub fn steer_projectiles(actors: &mut ActorArena, now_ms: u64) {
    for id in actors.ids() {
        let Some(state) = actors.get(id).and_then(|actor| actor.projectile) else {
            continue;
        };
        if state.expires_at_ms.is_some_and(|at| at <= now_ms) {
            actors.schedule_removal(id, now_ms);
            continue;
        }

        let goal = if state.moving {
            match state.homing_target.and_then(|target| actors.get(target)) {
                Some(target) => target.center(),
                None => state.destination,
            }
        } else if state.kind == ProjectileKind::Fireball {
            match actors.get(state.shooter) {
                Some(shooter) => shooter.center() + state.hover_offset,
                None => {
                    actors.schedule_removal(id, now_ms);
                    continue;
                }
            }
        } else {
            continue;
        };

        if let Some(actor) = actors.get_mut(id) {
            if let Some(projectile) = actor.projectile.as_mut() {
                if projectile.moving {
                    projectile.destination = goal;
                }
            }
            if let Some(movement) = actor.movement.as_mut() {
                movement.move_to(goal);
            }
        }
    }
}
