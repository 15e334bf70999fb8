//! Behavior task capability.
//!
//! A task reports how much it wants to run right now; the scheduler starts,
//! updates and stops tasks according to those answers.

use std::fmt::Debug;

use crate::context::TickContext;

/// Priority bands used by the built-in tasks.
pub mod priority {
    /// Not eligible this tick.
    pub const INELIGIBLE: i32 = -1;
    /// Idle wandering.
    pub const WANDER: i32 = 1;
    /// Pursuit.
    pub const CHASE: i32 = 10;
    /// Pursuit that weaves sideways.
    pub const ZIGZAG_CHASE: i32 = 11;
    /// Return to an anchor region.
    pub const RETREAT: i32 = 15;
    /// Ranged attack.
    pub const SHOOT: i32 = 20;
    /// Defensive teleport.
    pub const TELEPORT: i32 = 22;
    /// Summoning helpers.
    pub const SUMMON: i32 = 23;
    /// World-wide enemy freeze.
    pub const PAUSE: i32 = 25;
    /// Death animation, never pre-empted.
    pub const DEATH: i32 = 100;
}

/// One schedulable behavior of an actor.
///
/// `start` and `stop` bracket every activation: the scheduler never calls
/// `start` twice without a `stop` in between. `stop` must tolerate an owner
/// that no longer exists.
pub trait BehaviorTask: Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Desired priority this tick. Negative means not eligible.
    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32;

    /// Called once when the task becomes active.
    fn start(&mut self, _ctx: &mut TickContext<'_>) {}

    /// Called every tick while active.
    fn update(&mut self, _ctx: &mut TickContext<'_>) {}

    /// Called once when the task loses arbitration.
    fn stop(&mut self, _ctx: &mut TickContext<'_>) {}
}
