//! Actor records and the generational arena that stores them.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use saga_common::{ActorId, ArenaError};

use crate::combat_stats::CombatStats;
use crate::events::{EventBus, GameEvent};
use crate::movement::Movement;
use crate::physics::{Fixture, PhysicsLayer, AABB};
use crate::projectile::{Projectile, ProjectileKind};
use crate::scheduler::AiTaskScheduler;
use crate::touch::TouchAttack;

/// Maximum number of live actor slots.
pub const MAX_ACTORS: usize = 65_536;

/// Broad classification of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Player character
    Player,
    /// Plain melee enemy
    Melee,
    /// Armed humanoid that swings in the direction of its victim
    MeleeHumanoid,
    /// Archer
    Ranged,
    /// Fast ranged attacker
    Assassin,
    /// Encounter boss
    Boss,
    /// Summoned helper
    Minion,
    /// Summoned look-alike
    Decoy,
    /// Short-lived projectile
    Projectile(ProjectileKind),
    /// Static point other actors are tethered to
    Anchor,
}

impl ActorKind {
    /// True for kinds that publish directional attack animations on touch hits.
    #[must_use]
    pub const fn plays_attack_animation(self) -> bool {
        matches!(self, Self::MeleeHumanoid)
    }
}

/// A simulated actor with optional capabilities.
#[derive(Debug)]
pub struct Actor {
    /// Classification
    pub kind: ActorKind,
    /// Lower-left corner in world units
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
    /// Layer of the actor's hitbox fixture
    pub hitbox_layer: PhysicsLayer,
    /// Health and attack
    pub stats: Option<CombatStats>,
    /// Steering controller
    pub movement: Option<Movement>,
    /// Maximum distance for ranged attacks
    pub attack_range: f32,
    /// Switch for all damage and knockback this actor deals
    pub deal_damage: bool,
    /// Set by the encounter script before the boss may create fireballs
    pub encounter_ready: bool,
    /// Projectile state
    pub projectile: Option<Projectile>,
    /// Touch combat resolver
    pub touch: Option<TouchAttack>,
    /// Behavior scheduler
    pub brain: Option<AiTaskScheduler>,
}

impl Actor {
    /// Creates a unit-sized actor with no capabilities.
    #[must_use]
    pub fn new(kind: ActorKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            size: Vec2::ONE,
            hitbox_layer: PhysicsLayer::NPC,
            stats: None,
            movement: None,
            attack_range: 0.0,
            deal_damage: true,
            encounter_ready: false,
            projectile: None,
            touch: None,
            brain: None,
        }
    }

    /// Sets the lower-left position.
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the size.
    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Sets the hitbox layer.
    #[must_use]
    pub fn with_layer(mut self, layer: PhysicsLayer) -> Self {
        self.hitbox_layer = layer;
        self
    }

    /// Adds combat stats.
    #[must_use]
    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Adds a steering controller.
    #[must_use]
    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = Some(movement);
        self
    }

    /// Sets the ranged attack range.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Adds projectile state.
    #[must_use]
    pub fn with_projectile(mut self, projectile: Projectile) -> Self {
        self.projectile = Some(projectile);
        self
    }

    /// Adds a touch resolver.
    #[must_use]
    pub fn with_touch(mut self, touch: TouchAttack) -> Self {
        self.touch = Some(touch);
        self
    }

    /// Adds a behavior scheduler.
    #[must_use]
    pub fn with_brain(mut self, brain: AiTaskScheduler) -> Self {
        self.brain = Some(brain);
        self
    }

    /// Centre of the actor's box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Moves the actor so its centre lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size * 0.5;
    }

    /// World-space box.
    #[must_use]
    pub fn bounds(&self) -> AABB {
        AABB::from_position_size(self.position, self.size)
    }

    /// Hitbox fixture handle for this actor.
    #[must_use]
    pub const fn fixture(&self, id: ActorId) -> Fixture {
        Fixture::new(id, self.hitbox_layer)
    }

    /// False once health reached zero. Actors without stats count as alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.map_or(true, |stats| !stats.is_dead())
    }
}

bitflags! {
    /// Placement options for [`ActorArena::spawn_at`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SpawnFlags: u8 {
        /// Centre the actor horizontally on the spawn point
        const CENTER_X = 1 << 0;
        /// Centre the actor vertically on the spawn point
        const CENTER_Y = 1 << 1;
        /// Both
        const CENTERED = Self::CENTER_X.bits() | Self::CENTER_Y.bits();
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Generational storage for actors.
///
/// Handles of removed actors stop resolving even after their slot is reused.
#[derive(Debug, Default)]
pub struct ActorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    removals: Vec<(ActorId, u64)>,
    live: usize,
}

impl ActorArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an actor as-is.
    pub fn insert(&mut self, actor: Actor) -> Result<ActorId, ArenaError> {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            ActorId::new(index, slot.generation)
        } else {
            if self.slots.len() >= MAX_ACTORS {
                return Err(ArenaError::Full {
                    capacity: MAX_ACTORS,
                });
            }
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                actor: Some(actor),
            });
            ActorId::new(index, 0)
        };
        self.live += 1;
        Ok(id)
    }

    /// Places an actor at `position` and announces it on the bus.
    pub fn spawn_at(
        &mut self,
        mut actor: Actor,
        position: Vec2,
        flags: SpawnFlags,
        events: &EventBus,
    ) -> Result<ActorId, ArenaError> {
        let mut placed = position;
        if flags.contains(SpawnFlags::CENTER_X) {
            placed.x -= actor.size.x * 0.5;
        }
        if flags.contains(SpawnFlags::CENTER_Y) {
            placed.y -= actor.size.y * 0.5;
        }
        actor.position = placed;
        let kind = actor.kind;
        let id = self.insert(actor)?;
        debug!("Spawned {:?} {} at ({:.2}, {:.2})", kind, id, placed.x, placed.y);
        events.publish(GameEvent::ActorSpawned {
            actor: id,
            kind,
            position: placed,
        });
        Ok(id)
    }

    /// Resolves a handle.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_ref())
    }

    /// Resolves a handle mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_mut())
    }

    /// True if the handle resolves.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    /// Removes an actor and invalidates its handle.
    pub fn remove(&mut self, id: ActorId) -> Result<Actor, ArenaError> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .ok_or(ArenaError::StaleHandle(id))?;
        let actor = slot.actor.take().ok_or(ArenaError::StaleHandle(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.removals.retain(|(pending, _)| *pending != id);
        self.live -= 1;
        trace!("Removed actor {}", id);
        Ok(actor)
    }

    /// Handles of all live actors in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<ActorId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Iterates live actors in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.actor
                .as_ref()
                .map(|actor| (ActorId::new(index as u32, slot.generation), actor))
        })
    }

    /// Number of live actors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// True if no actor is alive.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// First live actor of a kind.
    #[must_use]
    pub fn find_kind(&self, kind: ActorKind) -> Option<ActorId> {
        self.iter()
            .find(|(_, actor)| actor.kind == kind)
            .map(|(id, _)| id)
    }

    /// Requests removal at `at_ms`. An earlier pending request wins.
    pub fn schedule_removal(&mut self, id: ActorId, at_ms: u64) {
        if !self.contains(id) {
            return;
        }
        if let Some(entry) = self.removals.iter_mut().find(|(pending, _)| *pending == id) {
            entry.1 = entry.1.min(at_ms);
        } else {
            self.removals.push((id, at_ms));
        }
    }

    /// Time at which an actor is due for removal.
    #[must_use]
    pub fn removal_time(&self, id: ActorId) -> Option<u64> {
        self.removals
            .iter()
            .find(|(pending, _)| *pending == id)
            .map(|(_, at)| *at)
    }

    /// Takes every pending removal due at or before `now_ms`.
    pub fn take_due_removals(&mut self, now_ms: u64) -> Vec<ActorId> {
        let mut due = Vec::new();
        self.removals.retain(|(id, at)| {
            if *at <= now_ms {
                due.push(*id);
                false
            } else {
                true
            }
        });
        due
    }
}
