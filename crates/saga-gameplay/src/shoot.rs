//! Ranged attacks.
//!
//! [`ShootProjectileTask`] owns the shot cadence and the gating rule (cooldown,
//! visibility, range); a [`TargetingStrategy`] decides what leaves the bow.

use glam::Vec2;
use tracing::{debug, trace};

use saga_common::{rotate_deg, signed_angle_deg, ActorId, Facing};

use crate::behavior::{priority, BehaviorTask};
use crate::config::{ProjectileTuning, ShooterTuning};
use crate::context::TickContext;
use crate::cooldown::CooldownGate;
use crate::events::GameEvent;
use crate::physics::PhysicsLayer;
use crate::projectile::{
    build_projectile, launch, multishot_pairs, multishot_spacing_deg, ProjectileKind, OVERSHOOT_FACTOR,
};

/// Degrees per second the charged aim turns toward the target.
pub const AIM_TURN_RATE_DEG: f32 = 30.0;

/// Aim points closer than this to the target centre count as direct hits.
pub const AIM_HIT_TOLERANCE: f32 = 1.0;

/// Gap left between the aim point and an obstacle in the way.
pub const AIM_OBSTACLE_MARGIN: f32 = 0.1;

/// Number of fireball slots.
pub const FIREBALL_POOL_SIZE: usize = 2;

/// Fireball refill interval as a multiple of the shot cooldown.
pub const FIREBALL_RESPAWN_FACTOR: f32 = 2.5;

/// Distance idle fireballs hover from the boss centre.
pub const FIREBALL_HOVER_DISTANCE: f32 = 1.5;

/// Angle between the hover spots of consecutive slots.
pub const FIREBALL_HOVER_STEP_DEG: f32 = 60.0;

/// Radius of the ring tracking arrows are spawned on.
pub const TRACKING_RING_RADIUS: f32 = 1.0;

/// Reusable fireballs hovering around a boss.
#[derive(Debug, Clone, Default)]
pub struct FireballPool {
    slots: [Option<ActorId>; FIREBALL_POOL_SIZE],
    last_created_at_ms: Option<u64>,
}

impl FireballPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot contents.
    #[must_use]
    pub const fn slots(&self) -> &[Option<ActorId>; FIREBALL_POOL_SIZE] {
        &self.slots
    }

    /// Time of the last creation.
    #[must_use]
    pub const fn last_created_at_ms(&self) -> Option<u64> {
        self.last_created_at_ms
    }

    /// Number of fireballs that are neither destroyed nor dissolving.
    #[must_use]
    pub fn live(&self, ctx: &TickContext<'_>) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|id| Self::usable(ctx, **id))
            .count()
    }

    fn usable(ctx: &TickContext<'_>, id: ActorId) -> bool {
        ctx.actors
            .get(id)
            .is_some_and(|actor| actor.is_alive() && ctx.actors.removal_time(id).is_none())
    }

    /// First idle fireball, if any.
    #[must_use]
    pub fn ready(&self, ctx: &TickContext<'_>) -> Option<ActorId> {
        self.slots.iter().flatten().copied().find(|id| {
            Self::usable(ctx, *id)
                && ctx
                    .actors
                    .get(*id)
                    .and_then(|actor| actor.projectile)
                    .is_some_and(|state| !state.moving)
        })
    }

    /// Creates a fireball when one is due and a slot is free.
    fn maintain(&mut self, ctx: &mut TickContext<'_>, tuning: &ProjectileTuning, cooldown_ms: u64) {
        if !ctx.owner().is_some_and(|owner| owner.encounter_ready) {
            return;
        }
        let now = ctx.now_ms();
        let due = match self.last_created_at_ms {
            None => true,
            Some(last) => {
                now.saturating_sub(last) as f32 >= cooldown_ms as f32 * FIREBALL_RESPAWN_FACTOR
            }
        };
        if due {
            let free = (0..FIREBALL_POOL_SIZE)
                .find(|index| !self.slots[*index].is_some_and(|id| Self::usable(ctx, id)));
            if let Some(index) = free {
                if let Some(id) = spawn_fireball(ctx, tuning, index) {
                    self.slots[index] = Some(id);
                    self.last_created_at_ms = Some(now);
                }
            }
        }
    }
}

/// Idle fireballs touch nothing until launched.
fn spawn_fireball(ctx: &mut TickContext<'_>, tuning: &ProjectileTuning, index: usize) -> Option<ActorId> {
    let center = ctx.owner()?.center();
    let hover = rotate_deg(
        Vec2::new(0.0, FIREBALL_HOVER_DISTANCE),
        index as f32 * FIREBALL_HOVER_STEP_DEG,
    );
    let mut actor = build_projectile(ProjectileKind::Fireball, ctx.owner, tuning, PhysicsLayer::empty(), ctx.now_ms())
        .with_layer(PhysicsLayer::IDLE_PROJECTILE_WEAPON);
    if let Some(state) = actor.projectile.as_mut() {
        state.moving = false;
        state.hover_offset = hover;
        state.expires_at_ms = None;
    }
    let id = launch(ctx, actor, center + hover, center + hover)?;
    debug!("{} conjured fireball {} in slot {}", ctx.owner, id, index);
    Some(id)
}

/// What a shot produces.
#[derive(Debug, Clone)]
pub enum TargetingStrategy {
    /// Arrow toward the target plus symmetric multishot pairs
    Straight,
    /// Arrows that follow the target
    Homing,
    /// Telegraphed aim that releases a fast arrow after a charge
    Charged,
    /// Launches idle fireballs from a pool
    Fireball(FireballPool),
}

/// Fires projectiles at a target when it is in range and in sight.
#[derive(Debug)]
pub struct ShootProjectileTask {
    target: ActorId,
    strategy: TargetingStrategy,
    projectile: ProjectileTuning,
    cooldown: CooldownGate,
    multishot_chance: f32,
    shoot_animation_ms: u64,
    last_shot_at_ms: Option<u64>,
    aim: Option<Vec2>,
}

impl ShootProjectileTask {
    /// Creates a shoot task.
    #[must_use]
    pub fn new(
        target: ActorId,
        strategy: TargetingStrategy,
        projectile: ProjectileTuning,
        timing: &ShooterTuning,
    ) -> Self {
        Self {
            target,
            strategy,
            projectile,
            cooldown: CooldownGate::new(timing.cooldown_ms),
            multishot_chance: timing.multishot_chance,
            shoot_animation_ms: timing.shoot_animation_ms,
            last_shot_at_ms: None,
            aim: None,
        }
    }

    /// Straight arrows.
    #[must_use]
    pub fn straight(target: ActorId, projectile: ProjectileTuning, timing: &ShooterTuning) -> Self {
        Self::new(target, TargetingStrategy::Straight, projectile, timing)
    }

    /// Homing arrows.
    #[must_use]
    pub fn homing(target: ActorId, projectile: ProjectileTuning, timing: &ShooterTuning) -> Self {
        Self::new(target, TargetingStrategy::Homing, projectile, timing)
    }

    /// Charge-and-release fast arrows.
    #[must_use]
    pub fn charged(target: ActorId, projectile: ProjectileTuning, timing: &ShooterTuning) -> Self {
        Self::new(target, TargetingStrategy::Charged, projectile, timing)
    }

    /// Pooled fireballs.
    #[must_use]
    pub fn fireball(target: ActorId, projectile: ProjectileTuning, timing: &ShooterTuning) -> Self {
        Self::new(
            target,
            TargetingStrategy::Fireball(FireballPool::new()),
            projectile,
            timing,
        )
    }

    /// Fireball pool, for the fireball strategy.
    #[must_use]
    pub const fn fireball_pool(&self) -> Option<&FireballPool> {
        match &self.strategy {
            TargetingStrategy::Fireball(pool) => Some(pool),
            _ => None,
        }
    }

    /// True while a charged shot is being aimed.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        self.aim.is_some()
    }

    /// Current aim offset from the shooter centre.
    #[must_use]
    pub const fn aim(&self) -> Option<Vec2> {
        self.aim
    }

    /// Cooldown elapsed, target visible on both rays, and within attack range.
    /// The fireball strategy additionally needs an idle fireball.
    pub fn can_shoot(&self, ctx: &TickContext<'_>) -> bool {
        if !self.cooldown.is_ready(ctx.now_ms()) {
            return false;
        }
        let (Some(owner), Some(target)) = (ctx.owner(), ctx.actors.get(self.target)) else {
            return false;
        };
        if !target.is_alive() {
            return false;
        }
        let in_range = owner.center().distance(target.center()) <= owner.attack_range;
        let has_ammo = match &self.strategy {
            TargetingStrategy::Fireball(pool) => pool.ready(ctx).is_some(),
            _ => true,
        };
        in_range && has_ammo && ctx.can_see(ctx.owner, self.target)
    }

    fn in_animation(&self, now: u64) -> bool {
        self.last_shot_at_ms
            .is_some_and(|at| now.saturating_sub(at) < self.shoot_animation_ms)
    }

    fn target_layer(&self, ctx: &TickContext<'_>) -> PhysicsLayer {
        ctx.actors
            .get(self.target)
            .map_or(PhysicsLayer::PLAYER, |target| target.hitbox_layer)
    }

    fn maintain_fireballs(&mut self, ctx: &mut TickContext<'_>) {
        if !ctx.owner().is_some_and(crate::actor::Actor::is_alive) {
            return;
        }
        let cooldown_ms = self.cooldown.duration_ms();
        if let TargetingStrategy::Fireball(pool) = &mut self.strategy {
            pool.maintain(ctx, &self.projectile, cooldown_ms);
        }
    }

    fn shoot(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        if self.aim.is_none() {
            self.cooldown.trigger(now);
        }
        let (Some(origin), Some(target)) = (
            ctx.owner().map(crate::actor::Actor::center),
            ctx.center_of(self.target),
        ) else {
            return;
        };
        match self.strategy {
            TargetingStrategy::Straight => {
                self.fire_straight(ctx, origin, target);
                self.finish_shot(ctx, origin, target);
            }
            TargetingStrategy::Homing => {
                self.fire_homing(ctx, origin, target);
                self.finish_shot(ctx, origin, target);
            }
            TargetingStrategy::Charged => self.charge(ctx, origin, target),
            TargetingStrategy::Fireball(_) => {
                self.launch_fireball(ctx, origin, target);
                self.finish_shot(ctx, origin, target);
            }
        }
    }

    fn spawn_arrow(
        &self,
        ctx: &mut TickContext<'_>,
        kind: ProjectileKind,
        origin: Vec2,
        destination: Vec2,
    ) -> Option<ActorId> {
        let layer = self.target_layer(ctx) | PhysicsLayer::OBSTACLE;
        let mut actor = build_projectile(kind, ctx.owner, &self.projectile, layer, ctx.now_ms());
        if kind == ProjectileKind::TrackingArrow {
            if let Some(state) = actor.projectile.as_mut() {
                state.homing_target = Some(self.target);
            }
        }
        launch(ctx, actor, origin, destination)
    }

    fn fire_straight(&self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2) {
        let heading = (target - origin) * OVERSHOOT_FACTOR;
        if heading.length_squared() <= f32::EPSILON {
            return;
        }
        self.spawn_arrow(ctx, ProjectileKind::Arrow, origin, origin + heading);

        let pairs = multishot_pairs(self.multishot_chance, ctx.rng);
        let spacing = multishot_spacing_deg(self.multishot_chance);
        for pair in 1..=pairs {
            for side in [-1.0, 1.0] {
                let spread = rotate_deg(heading, side * spacing * pair as f32);
                self.spawn_arrow(ctx, ProjectileKind::Arrow, origin, origin + spread);
            }
        }
        trace!("{} fired {} straight arrows", ctx.owner, 1 + 2 * pairs);
    }

    fn fire_homing(&self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2) {
        let Some(direction) = saga_common::direction_between(origin, target) else {
            return;
        };
        let ring = direction * TRACKING_RING_RADIUS;
        self.spawn_arrow(ctx, ProjectileKind::TrackingArrow, origin + ring, target);

        let pairs = multishot_pairs(self.multishot_chance, ctx.rng);
        let spacing = multishot_spacing_deg(self.multishot_chance);
        for pair in 1..=pairs {
            for side in [-1.0, 1.0] {
                let spot = origin + rotate_deg(ring, side * spacing * pair as f32);
                self.spawn_arrow(ctx, ProjectileKind::TrackingArrow, spot, target);
            }
        }
    }

    fn charge(&mut self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2) {
        let now = ctx.now_ms();
        let to_target = target - origin;
        let range = ctx.owner().map_or(0.0, |owner| owner.attack_range);

        let mut aim = self.aim.unwrap_or(to_target);
        let turn = AIM_TURN_RATE_DEG / ctx.frame_rate.max(1.0);
        let delta = signed_angle_deg(aim, to_target);
        aim = if delta.abs() > turn {
            rotate_deg(aim, turn.copysign(delta))
        } else {
            to_target
        };
        let direction = aim.normalize_or_zero();
        aim = direction * range.min(to_target.length());
        if let Some(hit) = ctx
            .physics
            .raycast(origin, origin + aim, PhysicsLayer::OBSTACLE)
        {
            aim = direction * ((hit.point - origin).length() - AIM_OBSTACLE_MARGIN).max(0.0);
        }
        self.aim = Some(aim);

        let fade = self.cooldown.elapsed_ms(now).map_or(0.0, |elapsed| {
            elapsed as f32 / self.cooldown.duration_ms().max(1) as f32
        });
        ctx.publish(GameEvent::AimingLine {
            actor: ctx.owner,
            from: origin,
            to: origin + aim,
            color: aiming_color(fade),
        });

        if self.cooldown.is_ready(now) {
            self.release(ctx, origin, target, direction);
        }
    }

    fn release(&mut self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2, direction: Vec2) {
        let Some(aim) = self.aim.take() else {
            return;
        };
        let heading = if direction == Vec2::ZERO {
            (target - origin).normalize_or_zero()
        } else {
            direction
        };
        self.spawn_arrow(
            ctx,
            ProjectileKind::FastArrow,
            origin,
            origin + heading * OVERSHOOT_FACTOR,
        );

        if ctx.can_see(ctx.owner, self.target) && (origin + aim).distance(target) < AIM_HIT_TOLERANCE {
            let attack = self.projectile.base_attack;
            if let Some(stats) = ctx.actors.get_mut(self.target).and_then(|t| t.stats.as_mut()) {
                let amount = stats.hit(attack);
                let remaining = stats.health();
                debug!("{} charged shot hit {} for {}", ctx.owner, self.target, amount);
                ctx.events.publish(GameEvent::ActorDamaged {
                    target: self.target,
                    source: Some(ctx.owner),
                    amount,
                    remaining,
                });
            }
        }
        ctx.publish(GameEvent::AimingLineCleared { actor: ctx.owner });
        self.finish_shot(ctx, origin, target);
    }

    fn launch_fireball(&self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2) {
        let now = ctx.now_ms();
        let layer = self.target_layer(ctx) | PhysicsLayer::OBSTACLE;
        let TargetingStrategy::Fireball(pool) = &self.strategy else {
            return;
        };
        let Some(fireball) = pool.ready(ctx) else {
            trace!("{} has no idle fireball", ctx.owner);
            return;
        };
        let Some(actor) = ctx.actors.get_mut(fireball) else {
            return;
        };
        let from = actor.center();
        let destination = from + (target - from) * OVERSHOOT_FACTOR;
        let expires_at_ms = self.projectile.lifetime_ms.map(|lifetime| now + lifetime);
        actor.hitbox_layer = PhysicsLayer::PROJECTILE_WEAPON;
        if let Some(state) = actor.projectile.as_mut() {
            state.moving = true;
            state.destination = destination;
            state.expires_at_ms = expires_at_ms;
        }
        if let Some(touch) = actor.touch.as_mut() {
            touch.set_target_layer(layer);
        }
        if let Some(movement) = actor.movement.as_mut() {
            movement.move_to(destination);
        }
        debug!("{} launched fireball {} from ({:.1}, {:.1})", ctx.owner, fireball, origin.x, origin.y);
        ctx.publish(GameEvent::FireballLaunched {
            actor: ctx.owner,
            fireball,
        });
    }

    fn finish_shot(&mut self, ctx: &mut TickContext<'_>, origin: Vec2, target: Vec2) {
        self.last_shot_at_ms = Some(ctx.now_ms());
        ctx.publish(GameEvent::ShootAnimation {
            actor: ctx.owner,
            facing: Facing::from_direction(target - origin),
        });
    }
}

/// Telegraph colour for a charge that is `fade` of the way done: green
/// turning red.
#[must_use]
pub fn aiming_color(fade: f32) -> [f32; 4] {
    let fade = fade.clamp(0.0, 1.0);
    [
        (2.0 * fade).min(1.0),
        (2.0 * (1.0 - fade)).min(1.0),
        0.0,
        0.5,
    ]
}

impl BehaviorTask for ShootProjectileTask {
    fn name(&self) -> &'static str {
        match self.strategy {
            TargetingStrategy::Straight => "shoot",
            TargetingStrategy::Homing => "shoot_tracking",
            TargetingStrategy::Charged => "shoot_charged",
            TargetingStrategy::Fireball(_) => "shoot_fireball",
        }
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        if ctx.owner().is_none() || !ctx.actors.contains(self.target) {
            return priority::INELIGIBLE;
        }
        self.maintain_fireballs(ctx);
        let now = ctx.now_ms();
        if self.can_shoot(ctx) || self.is_charging() || self.in_animation(now) {
            priority::SHOOT
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, _ctx: &mut TickContext<'_>) {
        self.aim = None;
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.in_animation(ctx.now_ms()) {
            ctx.halt_owner();
        } else if self.can_shoot(ctx) || self.is_charging() {
            ctx.halt_owner();
            self.shoot(ctx);
        }
        self.maintain_fireballs(ctx);
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        if self.aim.take().is_some() {
            ctx.publish(GameEvent::AimingLineCleared { actor: ctx.owner });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::combat_stats::CombatStats;
    use crate::physics::AABB;
    use crate::projectile::steer_projectiles;
    use crate::test_support::TestWorld;
    use saga_common::angle_deg;

    fn timing(cooldown_ms: u64, multishot_chance: f32) -> ShooterTuning {
        ShooterTuning {
            cooldown_ms,
            multishot_chance,
            shoot_animation_ms: 500,
        }
    }

    fn setup(world: &mut TestWorld, kind: ActorKind, range: f32) -> (ActorId, ActorId) {
        let shooter = world.spawn(
            Actor::new(kind)
                .with_stats(CombatStats::new(100, 5))
                .with_attack_range(range),
        );
        let player = world.spawn(
            Actor::new(ActorKind::Player)
                .with_layer(PhysicsLayer::PLAYER)
                .with_stats(CombatStats::new(100, 10)),
        );
        world.move_center(shooter, Vec2::ZERO);
        world.move_center(player, Vec2::new(5.0, 0.0));
        (shooter, player)
    }

    fn count(world: &TestWorld, kind: ProjectileKind) -> usize {
        world
            .actors
            .iter()
            .filter(|(_, actor)| actor.kind == ActorKind::Projectile(kind))
            .count()
    }

    #[test]
    fn test_range_gate_is_inclusive() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Ranged, 8.0);
        let task = ShootProjectileTask::straight(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        world.move_center(player, Vec2::new(8.0, 0.0));
        assert!(task.can_shoot(&world.ctx(archer)));
        world.move_center(player, Vec2::new(8.5, 0.0));
        assert!(!task.can_shoot(&world.ctx(archer)));
    }

    #[test]
    fn test_either_blocked_ray_prevents_shot() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Ranged, 8.0);
        let mut task = ShootProjectileTask::straight(player, ProjectileTuning::default(), &timing(1_000, 0.0));
        world
            .physics
            .add_obstacle(AABB::new(Vec2::new(2.0, -1.0), Vec2::new(3.0, -0.3)));

        assert!(!task.can_shoot(&world.ctx(archer)));
        assert_eq!(task.priority(&mut world.ctx(archer)), priority::INELIGIBLE);
    }

    #[test]
    fn test_straight_shot_and_animation_hold() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Ranged, 8.0);
        let mut task = ShootProjectileTask::straight(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        assert_eq!(task.priority(&mut world.ctx(archer)), priority::SHOOT);
        task.start(&mut world.ctx(archer));
        task.update(&mut world.ctx(archer));

        assert_eq!(count(&world, ProjectileKind::Arrow), 1);
        let arrow = world
            .actors
            .iter()
            .find_map(|(_, actor)| actor.projectile)
            .expect("arrow");
        assert_eq!(arrow.destination, Vec2::new(150.0, 0.0));
        assert_eq!(arrow.shooter, archer);

        world.clock.advance(100);
        assert_eq!(task.priority(&mut world.ctx(archer)), priority::SHOOT);
        world.clock.advance(500);
        assert_eq!(task.priority(&mut world.ctx(archer)), priority::INELIGIBLE);
        world.clock.advance(400);
        assert_eq!(task.priority(&mut world.ctx(archer)), priority::SHOOT);
    }

    #[test]
    fn test_multishot_spawns_symmetric_pairs() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Ranged, 8.0);
        let mut task = ShootProjectileTask::straight(player, ProjectileTuning::default(), &timing(1_000, 1.5));

        task.start(&mut world.ctx(archer));
        task.update(&mut world.ctx(archer));

        let arrows = count(&world, ProjectileKind::Arrow);
        assert!(arrows == 3 || arrows == 5, "got {arrows}");
        let spread: f32 = world
            .actors
            .iter()
            .filter_map(|(_, actor)| actor.projectile)
            .map(|state| {
                let angle = angle_deg(state.destination);
                if angle > 180.0 {
                    angle - 360.0
                } else {
                    angle
                }
            })
            .sum();
        assert!(spread.abs() < 1e-2);
    }

    #[test]
    fn test_homing_arrows_track_target() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Assassin, 8.0);
        let mut task = ShootProjectileTask::homing(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        task.start(&mut world.ctx(archer));
        task.update(&mut world.ctx(archer));

        let (_, arrow) = world
            .actors
            .iter()
            .find(|(_, actor)| actor.projectile.is_some())
            .expect("arrow");
        assert_eq!(arrow.projectile.and_then(|p| p.homing_target), Some(player));
        assert!((arrow.center() - Vec2::new(TRACKING_RING_RADIUS, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_charged_shot_telegraphs_then_hits() {
        let mut world = TestWorld::new();
        let (assassin, player) = setup(&mut world, ActorKind::Assassin, 8.0);
        let fast = ProjectileTuning {
            base_attack: 25,
            ..ProjectileTuning::default()
        };
        let mut task = ShootProjectileTask::charged(player, fast, &timing(1_000, 0.0));

        assert_eq!(task.priority(&mut world.ctx(assassin)), priority::SHOOT);
        task.start(&mut world.ctx(assassin));
        task.update(&mut world.ctx(assassin));
        assert!(task.is_charging());
        assert_eq!(task.aim(), Some(Vec2::new(5.0, 0.0)));
        assert!(world.events.drain().contains(&GameEvent::AimingLine {
            actor: assassin,
            from: Vec2::ZERO,
            to: Vec2::new(5.0, 0.0),
            color: [0.0, 1.0, 0.0, 0.5],
        }));

        world.clock.advance(500);
        assert_eq!(task.priority(&mut world.ctx(assassin)), priority::SHOOT);
        task.update(&mut world.ctx(assassin));
        assert_eq!(world.health(player), 100);

        world.clock.advance(500);
        task.update(&mut world.ctx(assassin));
        assert!(!task.is_charging());
        assert_eq!(world.health(player), 75);
        assert_eq!(count(&world, ProjectileKind::FastArrow), 1);
        let events = world.events.drain();
        assert!(events.contains(&GameEvent::AimingLineCleared { actor: assassin }));
        assert!(events.contains(&GameEvent::ShootAnimation {
            actor: assassin,
            facing: Facing::Right,
        }));
    }

    #[test]
    fn test_charged_aim_turns_slowly() {
        let mut world = TestWorld::new();
        let (assassin, player) = setup(&mut world, ActorKind::Assassin, 8.0);
        let mut task = ShootProjectileTask::charged(player, ProjectileTuning::default(), &timing(1_000, 0.0));
        task.start(&mut world.ctx(assassin));
        task.update(&mut world.ctx(assassin));

        world.move_center(player, Vec2::new(0.0, 5.0));
        task.update(&mut world.ctx(assassin));

        let aim = task.aim().expect("aim");
        assert!((angle_deg(aim) - 0.5).abs() < 1e-3);
        assert!((aim.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_charged_aim_stops_short_of_obstacle() {
        let mut world = TestWorld::new();
        let (assassin, player) = setup(&mut world, ActorKind::Assassin, 8.0);
        let mut task = ShootProjectileTask::charged(player, ProjectileTuning::default(), &timing(1_000, 0.0));
        task.start(&mut world.ctx(assassin));
        task.update(&mut world.ctx(assassin));

        world
            .physics
            .add_obstacle(AABB::new(Vec2::new(3.0, -1.0), Vec2::new(4.0, 1.0)));
        task.update(&mut world.ctx(assassin));
        let aim = task.aim().expect("aim");
        assert!((aim - Vec2::new(2.9, 0.0)).length() < 1e-4);

        world.clock.advance(1_000);
        task.update(&mut world.ctx(assassin));
        assert_eq!(world.health(player), 100);
    }

    #[test]
    fn test_stop_clears_aiming_line() {
        let mut world = TestWorld::new();
        let (assassin, player) = setup(&mut world, ActorKind::Assassin, 8.0);
        let mut task = ShootProjectileTask::charged(player, ProjectileTuning::default(), &timing(1_000, 0.0));
        task.start(&mut world.ctx(assassin));
        task.update(&mut world.ctx(assassin));
        world.events.drain();

        task.stop(&mut world.ctx(assassin));

        assert!(!task.is_charging());
        assert_eq!(
            world.events.drain(),
            vec![GameEvent::AimingLineCleared { actor: assassin }]
        );
    }

    #[test]
    fn test_fireball_pool_waits_for_encounter() {
        let mut world = TestWorld::new();
        let (boss, player) = setup(&mut world, ActorKind::Boss, 12.0);
        let mut task = ShootProjectileTask::fireball(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        assert_eq!(task.priority(&mut world.ctx(boss)), priority::INELIGIBLE);
        assert_eq!(count(&world, ProjectileKind::Fireball), 0);

        if let Some(actor) = world.actors.get_mut(boss) {
            actor.encounter_ready = true;
        }
        assert_eq!(task.priority(&mut world.ctx(boss)), priority::SHOOT);
        let pool = task.fireball_pool().expect("pool");
        assert!(pool.slots()[0].is_some());
        assert!(pool.slots()[1].is_none());
    }

    #[test]
    fn test_fireball_launch_and_refill_cadence() {
        let mut world = TestWorld::new();
        let (boss, player) = setup(&mut world, ActorKind::Boss, 12.0);
        if let Some(actor) = world.actors.get_mut(boss) {
            actor.encounter_ready = true;
        }
        let mut task = ShootProjectileTask::fireball(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        assert_eq!(task.priority(&mut world.ctx(boss)), priority::SHOOT);
        task.start(&mut world.ctx(boss));
        task.update(&mut world.ctx(boss));

        let first = task.fireball_pool().and_then(|pool| pool.slots()[0]).expect("slot 0");
        let fireball = world.actors.get(first).expect("fireball");
        assert!(fireball.projectile.is_some_and(|state| state.moving));
        assert_eq!(fireball.hitbox_layer, PhysicsLayer::PROJECTILE_WEAPON);
        assert_eq!(
            fireball.touch.as_ref().map(crate::touch::TouchAttack::target_layer),
            Some(PhysicsLayer::PLAYER | PhysicsLayer::OBSTACLE)
        );
        assert!(world.events.drain().contains(&GameEvent::FireballLaunched {
            actor: boss,
            fireball: first,
        }));

        world.clock.advance(2_000);
        assert_eq!(task.priority(&mut world.ctx(boss)), priority::INELIGIBLE);
        assert_eq!(count(&world, ProjectileKind::Fireball), 1);

        world.clock.advance(500);
        assert_eq!(task.priority(&mut world.ctx(boss)), priority::SHOOT);
        let pool = task.fireball_pool().expect("pool").clone();
        assert_eq!(pool.slots()[0], Some(first));
        assert!(pool.slots()[1].is_some());
        assert_eq!(pool.live(&world.ctx(boss)), 2);

        world.clock.advance(2_500);
        task.priority(&mut world.ctx(boss));
        assert_eq!(count(&world, ProjectileKind::Fireball), 2);

        world.actors.remove(first).expect("remove");
        world.clock.advance(2_500);
        task.priority(&mut world.ctx(boss));
        let refilled = task.fireball_pool().and_then(|pool| pool.slots()[0]).expect("slot 0");
        assert_ne!(refilled, first);
        assert_eq!(count(&world, ProjectileKind::Fireball), 2);
    }

    #[test]
    fn test_animation_hold_delays_next_shot() {
        let mut world = TestWorld::new();
        let (archer, player) = setup(&mut world, ActorKind::Ranged, 8.0);
        let mut task = ShootProjectileTask::straight(player, ProjectileTuning::default(), &timing(200, 0.0));

        task.start(&mut world.ctx(archer));
        task.update(&mut world.ctx(archer));
        assert_eq!(count(&world, ProjectileKind::Arrow), 1);

        world.clock.advance(300);
        assert_eq!(task.priority(&mut world.ctx(archer)), priority::SHOOT);
        task.update(&mut world.ctx(archer));
        assert_eq!(count(&world, ProjectileKind::Arrow), 1, "fired during the animation hold");

        world.clock.advance(200);
        task.update(&mut world.ctx(archer));
        assert_eq!(count(&world, ProjectileKind::Arrow), 2);
    }

    #[test]
    fn test_missed_fireball_expires_and_slot_refills() {
        let mut world = TestWorld::new();
        let (boss, player) = setup(&mut world, ActorKind::Boss, 12.0);
        if let Some(actor) = world.actors.get_mut(boss) {
            actor.encounter_ready = true;
        }
        let fireball = ProjectileTuning {
            lifetime_ms: Some(1_000),
            ..ProjectileTuning::default()
        };
        let mut task = ShootProjectileTask::fireball(player, fireball, &timing(1_000, 0.0));

        assert_eq!(task.priority(&mut world.ctx(boss)), priority::SHOOT);
        task.start(&mut world.ctx(boss));
        task.update(&mut world.ctx(boss));
        let first = task.fireball_pool().and_then(|pool| pool.slots()[0]).expect("slot 0");
        assert_eq!(
            world.actors.get(first).and_then(|a| a.projectile).and_then(|p| p.expires_at_ms),
            Some(2_000)
        );

        world.clock.advance(1_000);
        steer_projectiles(&mut world.actors, 2_000);
        assert_eq!(world.actors.removal_time(first), Some(2_000));
        task.priority(&mut world.ctx(boss));
        assert_eq!(task.fireball_pool().map(|pool| pool.live(&world.ctx(boss))), Some(0));

        world.clock.advance(1_500);
        assert_eq!(task.priority(&mut world.ctx(boss)), priority::SHOOT);
        let refilled = task.fireball_pool().and_then(|pool| pool.slots()[0]).expect("slot 0");
        assert_ne!(refilled, first);
        assert!(world
            .actors
            .get(refilled)
            .and_then(|a| a.projectile)
            .is_some_and(|state| !state.moving && state.expires_at_ms.is_none()));
    }

    #[test]
    fn test_dead_boss_conjures_nothing() {
        let mut world = TestWorld::new();
        let (boss, player) = setup(&mut world, ActorKind::Boss, 12.0);
        if let Some(actor) = world.actors.get_mut(boss) {
            actor.encounter_ready = true;
            if let Some(stats) = actor.stats.as_mut() {
                stats.set_health(0);
            }
        }
        let mut task = ShootProjectileTask::fireball(player, ProjectileTuning::default(), &timing(1_000, 0.0));

        task.priority(&mut world.ctx(boss));
        assert_eq!(count(&world, ProjectileKind::Fireball), 0);
        assert!(task.fireball_pool().is_some_and(|pool| pool.slots().iter().all(Option::is_none)));
    }

    #[test]
    fn test_aiming_color_fades_green_to_red() {
        assert_eq!(aiming_color(0.0), [0.0, 1.0, 0.0, 0.5]);
        assert_eq!(aiming_color(0.5), [1.0, 1.0, 0.0, 0.5]);
        assert_eq!(aiming_color(2.0), [1.0, 0.0, 0.0, 0.5]);
    }
}
