//! Enemy archetypes assembled from tuning records.

use glam::Vec2;

use saga_common::ActorId;
use saga_gameplay::{
    priority, Actor, ActorFactory, ActorKind, ActorTuning, AiTaskScheduler, Anchor, AnchoredRetreatTask,
    ChaseProfile, ChaseTask, CombatTuning, DeathPauseTask, PauseTask, PhysicsLayer, ShootProjectileTask,
    SummonTask, TeleportationTask, TouchAttack, WanderTask,
};

/// Death animation length shared by every archetype.
pub const DEATH_ANIMATION_MS: u64 = 600;

/// Radius of a guard post.
pub const GUARD_POST_RADIUS: f32 = 5.0;

fn body(kind: ActorKind, tuning: &ActorTuning) -> Actor {
    Actor::new(kind)
        .with_size(tuning.size_vec())
        .with_stats(tuning.stats())
        .with_movement(tuning.movement())
        .with_attack_range(tuning.attack_range)
}

fn touch_player(tuning: &ActorTuning) -> TouchAttack {
    TouchAttack::new(PhysicsLayer::PLAYER, tuning.knockback)
}

/// Builds actors that hunt one player.
#[derive(Debug, Clone)]
pub struct Roster {
    tuning: CombatTuning,
    player: ActorId,
}

impl Roster {
    /// Creates a roster against `player`.
    #[must_use]
    pub fn new(tuning: CombatTuning, player: ActorId) -> Self {
        Self { tuning, player }
    }

    /// Tuning in use.
    #[must_use]
    pub const fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Player character; it wanders on its own and hurts enemies it bumps into.
    #[must_use]
    pub fn player(tuning: &CombatTuning) -> Actor {
        body(ActorKind::Player, &tuning.player)
            .with_layer(PhysicsLayer::PLAYER)
            .with_touch(TouchAttack::new(PhysicsLayer::NPC, tuning.player.knockback))
            .with_brain(
                AiTaskScheduler::new()
                    .with_task(WanderTask::new(Vec2::splat(8.0), 300))
                    .with_task(DeathPauseTask::new(DEATH_ANIMATION_MS)),
            )
    }

    fn finish(&self, brain: AiTaskScheduler) -> AiTaskScheduler {
        brain
            .with_task(PauseTask::new())
            .with_task(DeathPauseTask::new(DEATH_ANIMATION_MS).facing_target(self.player))
    }

    /// Melee grunt: chases on sight, or from afar once the alarm is up.
    #[must_use]
    pub fn melee(&self) -> Actor {
        let tuning = &self.tuning.melee;
        body(ActorKind::Melee, tuning)
            .with_touch(touch_player(tuning))
            .with_brain(
                self.finish(
                    AiTaskScheduler::new()
                        .with_task(WanderTask::new(Vec2::splat(3.0), 1_500))
                        .with_task(ChaseTask::new(
                            self.player,
                            ChaseProfile::standard(priority::CHASE, 6.0, 10.0),
                        ))
                        .with_task(ChaseTask::new(
                            self.player,
                            ChaseProfile::alertable(priority::CHASE, 20.0, 25.0),
                        )),
                ),
            )
    }

    /// Armed humanoid that weaves toward the player.
    #[must_use]
    pub fn humanoid(&self) -> Actor {
        let tuning = &self.tuning.humanoid;
        body(ActorKind::MeleeHumanoid, tuning)
            .with_touch(touch_player(tuning))
            .with_brain(
                self.finish(
                    AiTaskScheduler::new()
                        .with_task(WanderTask::new(Vec2::splat(3.0), 1_000))
                        .with_task(ChaseTask::new(
                            self.player,
                            ChaseProfile::zigzag(priority::ZIGZAG_CHASE, 8.0, 12.0, 1.0),
                        )),
                ),
            )
    }

    /// Archer that keeps its distance and fires straight arrows.
    #[must_use]
    pub fn archer(&self) -> Actor {
        let tuning = &self.tuning.archer;
        body(ActorKind::Ranged, tuning).with_brain(
            self.finish(
                AiTaskScheduler::new()
                    .with_task(WanderTask::new(Vec2::splat(2.0), 2_000))
                    .with_task(ChaseTask::new(
                        self.player,
                        ChaseProfile::ranged(priority::CHASE, 12.0, 16.0, tuning.attack_range * 0.75),
                    ))
                    .with_task(ShootProjectileTask::straight(
                        self.player,
                        self.tuning.arrow.clone(),
                        &self.tuning.archer_shooting,
                    )),
            ),
        )
    }

    /// Assassin with telegraphed charged shots.
    #[must_use]
    pub fn assassin(&self) -> Actor {
        let tuning = &self.tuning.assassin;
        body(ActorKind::Assassin, tuning).with_brain(
            self.finish(
                AiTaskScheduler::new()
                    .with_task(WanderTask::new(Vec2::splat(4.0), 800))
                    .with_task(ChaseTask::new(
                        self.player,
                        ChaseProfile::melee(priority::CHASE, 14.0, 20.0),
                    ))
                    .with_task(ShootProjectileTask::charged(
                        self.player,
                        self.tuning.fast_arrow.clone(),
                        &self.tuning.assassin_shooting,
                    )),
            ),
        )
    }

    /// Post a guard can be tethered to.
    #[must_use]
    pub fn guard_post() -> Actor {
        Actor::new(ActorKind::Anchor).with_layer(PhysicsLayer::empty())
    }

    /// Guard bound to `post`: patrols it, raises the alarm on sight and fires
    /// homing arrows.
    #[must_use]
    pub fn guard(&self, post: ActorId) -> Actor {
        let tuning = &self.tuning.archer;
        let anchor = Anchor::circle(post, GUARD_POST_RADIUS);
        body(ActorKind::Ranged, tuning).with_brain(
            self.finish(
                AiTaskScheduler::new()
                    .with_task(WanderTask::anchored(anchor, 1_200))
                    .with_task(ChaseTask::new(
                        self.player,
                        ChaseProfile {
                            anchor: Some(anchor),
                            ..ChaseProfile::alarm_raiser(priority::CHASE, 9.0, 12.0)
                        },
                    ))
                    .with_task(AnchoredRetreatTask::new(anchor))
                    .with_task(ShootProjectileTask::homing(
                        self.player,
                        self.tuning.tracking_arrow.clone(),
                        &self.tuning.archer_shooting,
                    )),
            ),
        )
    }

    /// Summoned minion.
    #[must_use]
    pub fn minion_factory(&self) -> ActorFactory {
        let tuning = self.tuning.minion.clone();
        Box::new(move |target: ActorId, _rng: &mut fastrand::Rng| {
            body(ActorKind::Minion, &tuning)
                .with_touch(touch_player(&tuning))
                .with_brain(
                    AiTaskScheduler::new()
                        .with_task(ChaseTask::new(
                            target,
                            ChaseProfile::melee(priority::CHASE, 30.0, 40.0),
                        ))
                        .with_task(PauseTask::new())
                        .with_task(DeathPauseTask::new(DEATH_ANIMATION_MS).facing_target(target)),
                )
        })
    }

    /// Decoy that looks like the boss and soaks a few hits.
    #[must_use]
    pub fn decoy_factory(&self) -> ActorFactory {
        let tuning = ActorTuning {
            health: self.tuning.boss.health / 20,
            ..self.tuning.boss.clone()
        };
        Box::new(move |target: ActorId, _rng: &mut fastrand::Rng| {
            body(ActorKind::Decoy, &tuning).with_brain(
                AiTaskScheduler::new()
                    .with_task(WanderTask::new(Vec2::splat(4.0), 500))
                    .with_task(PauseTask::new())
                    .with_task(DeathPauseTask::new(DEATH_ANIMATION_MS).facing_target(target)),
            )
        })
    }

    /// Boss: fireballs, defensive teleports, minion waves and decoys.
    #[must_use]
    pub fn boss(&self) -> Actor {
        let tuning = &self.tuning.boss;
        body(ActorKind::Boss, tuning)
            .with_touch(touch_player(tuning))
            .with_brain(
                self.finish(
                    AiTaskScheduler::new()
                        .with_task(ChaseTask::new(
                            self.player,
                            ChaseProfile::melee(priority::CHASE, 16.0, 24.0),
                        ))
                        .with_task(ShootProjectileTask::fireball(
                            self.player,
                            self.tuning.fireball.clone(),
                            &self.tuning.boss_shooting,
                        ))
                        .with_task(TeleportationTask::new(self.player, 2_000))
                        .with_task(SummonTask::minions(self.player, self.minion_factory(), 3))
                        .with_task(SummonTask::decoys(self.player, self.decoy_factory(), 2)),
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(CombatTuning::default(), ActorId::new(0, 0))
    }

    #[test]
    fn test_archetypes_carry_brains() {
        let roster = roster();
        for actor in [roster.melee(), roster.humanoid(), roster.archer(), roster.assassin(), roster.boss()] {
            let brain = actor.brain.as_ref().expect("brain");
            assert!(brain.len() >= 4, "{:?} has {} tasks", actor.kind, brain.len());
            assert!(actor.stats.is_some());
        }
    }

    #[test]
    fn test_melee_archetypes_touch_the_player() {
        let roster = roster();
        let grunt = roster.melee();
        let touch = grunt.touch.as_ref().expect("touch");
        assert_eq!(touch.target_layer(), PhysicsLayer::PLAYER);
        assert!((touch.knockback_force() - roster.tuning().melee.knockback).abs() < f32::EPSILON);
        assert!(roster.archer().touch.is_none());
    }

    #[test]
    fn test_factories_build_summons() {
        let roster = roster();
        let mut rng = fastrand::Rng::with_seed(1);
        let target = ActorId::new(3, 1);

        let minion = (roster.minion_factory())(target, &mut rng);
        assert_eq!(minion.kind, ActorKind::Minion);
        assert!(minion.touch.is_some());

        let decoy = (roster.decoy_factory())(target, &mut rng);
        assert_eq!(decoy.kind, ActorKind::Decoy);
        assert_eq!(decoy.stats.map(|s| s.health()), Some(50));
    }

    #[test]
    fn test_player_layer() {
        let player = Roster::player(&CombatTuning::default());
        assert_eq!(player.hitbox_layer, PhysicsLayer::PLAYER);
        assert_eq!(
            player.touch.as_ref().map(TouchAttack::target_layer),
            Some(PhysicsLayer::NPC)
        );
    }
}
