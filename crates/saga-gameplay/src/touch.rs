//! Touch combat: damage and knockback driven by physics contacts.
//!
//! A resolver lives on the attacking actor. The physics collaborator reports
//! contact start and end through the simulation; while a contact persists the
//! resolver re-applies damage every [`HIT_COOLDOWN_MS`] per target.

use ahash::AHashMap;
use glam::Vec2;
use tracing::{debug, trace};

use saga_common::{angle_deg, direction_between, ActorId, Facing};

use crate::context::TickContext;
use crate::cooldown::{CooldownGate, HIT_COOLDOWN_MS};
use crate::events::GameEvent;
use crate::physics::{Fixture, PhysicsLayer};

/// Impulse length of the push applied every tick while overlapping.
pub const SUSTAINED_KNOCKBACK: f32 = 0.5;

/// Velocity clamp after knockback, as a multiple of the knockback force.
pub const VELOCITY_CLAMP_FACTOR: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Began,
    Sustained,
    Ended,
}

/// An active attacker-target contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchLink {
    /// Attacker hitbox
    pub attacker: Fixture,
    /// Target fixture
    pub target: Fixture,
    /// When the contact began
    pub colliding_since_ms: u64,
}

/// Contact damage resolver of one attacker.
#[derive(Debug, Clone)]
pub struct TouchAttack {
    target_layer: PhysicsLayer,
    knockback_force: f32,
    links: Vec<TouchLink>,
    hit_cooldowns: AHashMap<ActorId, CooldownGate>,
    disposed: bool,
}

impl TouchAttack {
    /// Creates a resolver hitting fixtures in `target_layer`.
    #[must_use]
    pub fn new(target_layer: PhysicsLayer, knockback_force: f32) -> Self {
        Self {
            target_layer,
            knockback_force,
            links: Vec::new(),
            hit_cooldowns: AHashMap::new(),
            disposed: false,
        }
    }

    /// Layers this resolver hits.
    #[must_use]
    pub const fn target_layer(&self) -> PhysicsLayer {
        self.target_layer
    }

    /// Changes the layers this resolver hits.
    pub fn set_target_layer(&mut self, layer: PhysicsLayer) {
        self.target_layer = layer;
    }

    /// Knockback impulse on contact start and end.
    #[must_use]
    pub const fn knockback_force(&self) -> f32 {
        self.knockback_force
    }

    /// True while at least one contact is active.
    #[must_use]
    pub fn is_colliding(&self) -> bool {
        !self.links.is_empty()
    }

    /// Active contacts.
    #[must_use]
    pub fn links(&self) -> &[TouchLink] {
        &self.links
    }

    /// True after [`TouchAttack::dispose`].
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Disables the resolver for good.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.links.clear();
    }

    /// Contact between `me` (this attacker's fixture) and `other` began.
    pub fn collision_started(&mut self, me: Fixture, other: Fixture, ctx: &mut TickContext<'_>) {
        if !self.accepts(me, other) {
            return;
        }
        if !self.links.iter().any(|link| link.target == other) {
            self.links.push(TouchLink {
                attacker: me,
                target: other,
                colliding_since_ms: ctx.now_ms(),
            });
        }
        self.resolve(me, other, Contact::Began, ctx);

        if me.layer.is_projectile() {
            self.dissolve(me.actor, ctx);
        }
    }

    /// Contact between `me` and `other` ended.
    pub fn collision_ended(&mut self, me: Fixture, other: Fixture, ctx: &mut TickContext<'_>) {
        if self.disposed {
            return;
        }
        let Some(index) = self.links.iter().position(|link| link.target == other) else {
            return;
        };
        self.resolve(me, other, Contact::Ended, ctx);
        self.links.remove(index);
    }

    /// Re-resolves every active contact. Called once per tick.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.disposed {
            return;
        }
        self.links.retain(|link| ctx.actors.contains(link.target.actor));
        let links = self.links.clone();
        for link in links {
            if self.disposed {
                break;
            }
            self.resolve(link.attacker, link.target, Contact::Sustained, ctx);
        }
    }

    fn accepts(&self, me: Fixture, other: Fixture) -> bool {
        !self.disposed && me.actor != other.actor && self.target_layer.intersects(other.layer)
    }

    fn resolve(&mut self, me: Fixture, other: Fixture, contact: Contact, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let Some(attacker) = ctx.actors.get(me.actor) else {
            return;
        };
        if !attacker.deal_damage {
            return;
        }
        let attacker_kind = attacker.kind;
        let attacker_center = attacker.center();
        let attack = attacker.stats.map(|stats| stats.base_attack());

        let Some(target) = ctx.actors.get_mut(other.actor) else {
            return;
        };
        let target_center = target.center();

        if let (Some(attack), Some(stats)) = (attack, target.stats.as_mut()) {
            if !stats.is_dead() {
                let gate = self
                    .hit_cooldowns
                    .entry(other.actor)
                    .or_insert_with(|| CooldownGate::new(HIT_COOLDOWN_MS));
                if gate.try_trigger(now) {
                    let amount = stats.hit(attack);
                    let remaining = stats.health();
                    debug!(
                        "{} touched {} for {} ({} left)",
                        me.actor, other.actor, amount, remaining
                    );
                    ctx.events.publish(GameEvent::ActorDamaged {
                        target: other.actor,
                        source: Some(me.actor),
                        amount,
                        remaining,
                    });
                    if attacker_kind.plays_attack_animation() {
                        ctx.events.publish(GameEvent::AttackAnimation {
                            actor: me.actor,
                            facing: Facing::from_angle_deg(angle_deg(target_center - attacker_center)),
                        });
                    }
                }
            }
        }

        let magnitude = match contact {
            Contact::Began | Contact::Ended => self.knockback_force,
            Contact::Sustained => SUSTAINED_KNOCKBACK,
        };
        self.knockback(other.actor, attacker_center, target_center, magnitude, ctx);
    }

    fn knockback(
        &self,
        target: ActorId,
        attacker_center: Vec2,
        target_center: Vec2,
        magnitude: f32,
        ctx: &mut TickContext<'_>,
    ) {
        if self.knockback_force <= 0.0 || !ctx.physics.has_body(target) {
            return;
        }
        let Some(direction) = direction_between(attacker_center, target_center) else {
            return;
        };
        ctx.physics.apply_impulse(target, direction * magnitude);

        let limit = self.knockback_force * VELOCITY_CLAMP_FACTOR;
        let velocity = ctx
            .physics
            .linear_velocity(target)
            .clamp(Vec2::splat(-limit), Vec2::splat(limit));
        ctx.physics.set_linear_velocity(target, velocity);
    }

    fn dissolve(&mut self, projectile: ActorId, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let Some(actor) = ctx.actors.get_mut(projectile) else {
            return;
        };
        if let Some(movement) = actor.movement.as_mut() {
            movement.set_moving(false);
            movement.clear_target();
        }
        if let Some(state) = actor.projectile.as_mut() {
            state.moving = false;
        }
        if let Some(stats) = actor.stats.as_mut() {
            stats.set_health(0);
        }
        if ctx.physics.has_body(projectile) {
            ctx.physics.set_linear_velocity(projectile, Vec2::ZERO);
        }
        trace!("Projectile {} broke", projectile);
        ctx.events.publish(GameEvent::ProjectileBroken { actor: projectile });
        ctx.actors.schedule_removal(projectile, now);
        self.dispose();
    }
}
