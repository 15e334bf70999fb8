//! Anchors tie an actor's behavior to a region around another actor, plus
//! the retreat task that drags a straying actor back.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use saga_common::{unit_from_deg, ActorId};

use crate::actor::ActorArena;
use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;

/// Distance from the anchor centre at which a retreat counts as finished.
pub const RETURN_TOLERANCE: f32 = 0.5;

/// Shape of an anchor region, centred on the anchor actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnchorRegion {
    /// Axis-aligned rectangle
    Rect {
        /// Half width and half height
        half_extents: Vec2,
    },
    /// Disc
    Circle {
        /// Radius
        radius: f32,
    },
}

impl AnchorRegion {
    /// True if `point` lies inside the region centred at `center`.
    #[must_use]
    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let offset = point - center;
        match *self {
            Self::Rect { half_extents } => offset.abs().cmple(half_extents).all(),
            Self::Circle { radius } => offset.length() <= radius,
        }
    }

    /// Closest point of the region to `point`.
    #[must_use]
    pub fn clamp(&self, center: Vec2, point: Vec2) -> Vec2 {
        let offset = point - center;
        match *self {
            Self::Rect { half_extents } => center + offset.clamp(-half_extents, half_extents),
            Self::Circle { radius } => center + offset.clamp_length_max(radius),
        }
    }

    /// Uniformly random point inside the region.
    pub fn random_point(&self, center: Vec2, rng: &mut fastrand::Rng) -> Vec2 {
        match *self {
            Self::Rect { half_extents } => {
                center
                    + Vec2::new(
                        (rng.f32() * 2.0 - 1.0) * half_extents.x,
                        (rng.f32() * 2.0 - 1.0) * half_extents.y,
                    )
            }
            Self::Circle { radius } => {
                center + unit_from_deg(rng.f32() * 360.0) * radius * rng.f32().sqrt()
            }
        }
    }
}

/// A region around a live anchor actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor actor
    pub actor: ActorId,
    /// Region around its centre
    pub region: AnchorRegion,
}

impl Anchor {
    /// Rectangular anchor with the given full size.
    #[must_use]
    pub fn rect(actor: ActorId, size: Vec2) -> Self {
        Self {
            actor,
            region: AnchorRegion::Rect {
                half_extents: size * 0.5,
            },
        }
    }

    /// Circular anchor.
    #[must_use]
    pub const fn circle(actor: ActorId, radius: f32) -> Self {
        Self {
            actor,
            region: AnchorRegion::Circle { radius },
        }
    }

    /// Centre of the anchor actor, `None` once it is gone.
    #[must_use]
    pub fn center(&self, actors: &ActorArena) -> Option<Vec2> {
        actors.get(self.actor).map(crate::actor::Actor::center)
    }

    /// Whether `point` is inside the region, `None` once the anchor is gone.
    #[must_use]
    pub fn contains(&self, actors: &ActorArena, point: Vec2) -> Option<bool> {
        self.center(actors)
            .map(|center| self.region.contains(center, point))
    }
}

/// Walks an actor back to its anchor once it strays outside the region.
///
/// Eligible while the actor is outside the region, and keeps running until the
/// actor is back near the anchor centre.
#[derive(Debug, Clone)]
pub struct AnchoredRetreatTask {
    anchor: Anchor,
    active: bool,
}

impl AnchoredRetreatTask {
    /// Creates a retreat task.
    #[must_use]
    pub const fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            active: false,
        }
    }
}

impl BehaviorTask for AnchoredRetreatTask {
    fn name(&self) -> &'static str {
        "anchored_retreat"
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        let (Some(center), Some(owner)) = (self.anchor.center(ctx.actors), ctx.owner()) else {
            return priority::INELIGIBLE;
        };
        let position = owner.center();
        let outside = !self.anchor.region.contains(center, position);
        let returning = self.active && position.distance(center) > RETURN_TOLERANCE;
        if outside || returning {
            priority::RETREAT
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        self.active = true;
        trace!("{} retreating to anchor {}", ctx.owner, self.anchor.actor);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(center) = self.anchor.center(ctx.actors) {
            ctx.move_owner_to(center);
        }
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        self.active = false;
        ctx.halt_owner();
    }
}
