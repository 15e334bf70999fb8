//! # Saga Common
//!
//! Common types and shared abstractions for Project Saga.
//!
//! This crate provides foundational types used across all Saga subsystems:
//! - Generational actor handles
//! - Monotonic clock abstraction (system and manual clocks)
//! - Facing buckets and 2D vector helpers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_actor_id_generations_differ() {
        let a = ActorId::new(3, 0);
        let b = ActorId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn test_prelude_exports() {
        let clock = ManualClock::new(100);
        clock.advance(50);
        assert_eq!(clock.now_ms(), 150);
        assert_eq!(Facing::from_direction(Vec2::new(0.0, 2.0)), Facing::Up);
    }
}
