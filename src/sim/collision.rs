//! Collision detection and response for the digging circle
//!
//! The tricky part of deepdig: continuous circle-vs-axis-aligned-block
//! contacts with penetration correction, restitution and wall friction.
//! Screen convention throughout: y grows downward.

use glam::Vec2;

/// Axis-aligned block rectangle in world pixels
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_block(x: i32, y: i32, size: f32) -> Self {
        let min = Vec2::new(x as f32, y as f32);
        Self {
            min,
            max: min + Vec2::splat(size),
        }
    }
}

/// A resolved circle-vs-rectangle contact
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the rectangle toward the circle center
    pub normal: Vec2,
    /// Overlap depth along the normal (positional correction distance)
    pub penetration: f32,
    /// Pre-resolution closing speed along the inward normal, floored at 0
    pub impact: f32,
}

/// Squared-distance epsilon below which the closest-point normal degenerates
const DEGENERATE_EPS: f32 = 1e-6;

/// Check a circle against an axis-aligned rectangle.
///
/// Returns `None` when the closest point on the rectangle is farther from the
/// circle center than the radius. In the degenerate case (center on or inside
/// the rectangle) the normal is axis-aligned along the axis of minimum
/// penetration and the correction distance is `radius + distance-to-edge`.
pub fn circle_aabb_contact(center: Vec2, radius: f32, vel: Vec2, rect: &Aabb) -> Option<Contact> {
    let nearest = center.clamp(rect.min, rect.max);
    let delta = center - nearest;
    let dist_sq = delta.length_squared();

    if dist_sq > radius * radius {
        return None;
    }

    let (normal, penetration) = if dist_sq > DEGENERATE_EPS {
        let dist = dist_sq.sqrt();
        (delta / dist, radius - dist)
    } else {
        // Center is on or inside the rectangle: pick the cheapest exit axis
        let left = center.x - rect.min.x;
        let right = rect.max.x - center.x;
        let top = center.y - rect.min.y;
        let bottom = rect.max.y - center.y;

        let pen = left.min(right).min(top).min(bottom);
        let normal = if pen == left {
            Vec2::NEG_X
        } else if pen == right {
            Vec2::X
        } else if pen == top {
            Vec2::NEG_Y
        } else {
            Vec2::Y
        };
        (normal, radius + pen)
    };

    Some(Contact {
        normal,
        penetration,
        impact: (-vel.dot(normal)).max(0.0),
    })
}

/// Apply restitution and tangential wall friction to a velocity.
///
/// Only acts when the velocity is closing (negative along the normal); a
/// separating velocity passes through unchanged.
pub fn apply_bounce(vel: Vec2, normal: Vec2, restitution: f32, wall_friction: f32) -> Vec2 {
    let vn = vel.dot(normal);
    if vn >= 0.0 {
        return vel;
    }

    let mut out = vel - (1.0 + restitution) * vn * normal;

    let tangent = Vec2::new(-normal.y, normal.x);
    let vt = out.dot(tangent);
    out -= vt * (1.0 - wall_friction) * tangent;
    out
}
