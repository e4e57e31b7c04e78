//! The single 2-D vector type used throughout the simulation.
//!
//! `glam::DVec2` already provides add, scale, length and normalize; the
//! helpers here cover the angle-based operations the flow field needs.

pub use glam::DVec2 as Vector2;

/// Unit vector pointing at `angle` radians.
pub fn unit(angle: f64) -> Vector2 {
    Vector2::from_angle(angle)
}

/// Angle of `v` in radians, in (-π, π].
pub fn angle_of(v: Vector2) -> f64 {
    v.y.atan2(v.x)
}

/// `v` rotated counter-clockwise by `angle` radians.
pub fn rotated(v: Vector2, angle: f64) -> Vector2 {
    Vector2::from_angle(angle).rotate(v)
}

/// Clamps the magnitude of `v` to `max`, keeping its direction.
///
/// A capped vector has magnitude exactly `max`.
pub fn clamp_magnitude(v: Vector2, max: f64) -> Vector2 {
    if v.length() > max {
        unit(angle_of(v)) * max
    } else {
        v
    }
}
