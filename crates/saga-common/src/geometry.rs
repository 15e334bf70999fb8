//! Facing buckets and small 2D helpers on top of [`glam::Vec2`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Squared lengths below this are treated as zero.
pub const DEGENERATE_LENGTH_SQ: f32 = 1e-8;

/// Four-way facing used to pick directional animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward +y
    Up,
    /// Toward -y
    Down,
    /// Toward -x
    Left,
    /// Toward +x
    Right,
}

impl Facing {
    /// Buckets an angle in degrees: 45..135 up, 135..225 left, 225..315 down,
    /// everything else right.
    #[must_use]
    pub fn from_angle_deg(angle: f32) -> Self {
        let angle = normalize_deg(angle);
        if angle > 45.0 && angle < 135.0 {
            Self::Up
        } else if (135.0..225.0).contains(&angle) {
            Self::Left
        } else if (225.0..315.0).contains(&angle) {
            Self::Down
        } else {
            Self::Right
        }
    }

    /// Facing of a direction vector. Zero vectors face down.
    #[must_use]
    pub fn from_direction(direction: Vec2) -> Self {
        if direction.length_squared() < DEGENERATE_LENGTH_SQ {
            return Self::Down;
        }
        Self::from_angle_deg(angle_deg(direction))
    }
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalize_deg(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Angle of a vector in degrees, counter-clockwise from +x, in `[0, 360)`.
#[must_use]
pub fn angle_deg(v: Vec2) -> f32 {
    normalize_deg(v.y.atan2(v.x).to_degrees())
}

/// Rotates a vector counter-clockwise by `degrees`.
#[must_use]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Signed angle in degrees from `from` to `to`, in `(-180, 180]`.
#[must_use]
pub fn signed_angle_deg(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to)).to_degrees()
}

/// Unit vector from `from` toward `to`, or `None` when they coincide.
#[must_use]
pub fn direction_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    if delta.length_squared() < DEGENERATE_LENGTH_SQ {
        None
    } else {
        Some(delta.normalize())
    }
}

/// Unit vector at `degrees` from +x.
#[must_use]
pub fn unit_from_deg(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}
