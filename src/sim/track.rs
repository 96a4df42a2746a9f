//! Square loop track geometry
//!
//! The loop is four straight segments joined at four corners:
//! - segment 0: (-8, -8) → ( 8, -8)
//! - segment 1: ( 8, -8) → ( 8,  8)
//! - segment 2: ( 8,  8) → (-8,  8)
//! - segment 3: (-8,  8) → (-8, -8)
//!
//! Segment `k` ends at corner `k` (corner 1 in page numbering is index 0).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::door::Corner;
use crate::consts::*;

/// Number of segments on the loop
pub const SEGMENT_COUNT: u8 = 4;

/// Presentation pose of an item on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    /// Heading around the vertical axis (radians)
    pub yaw: f32,
}

/// Wrap any segment index onto the loop
#[inline]
pub fn wrap_segment(segment: u8) -> u8 {
    segment % SEGMENT_COUNT
}

/// Segment that follows `segment` around the loop
#[inline]
pub fn next_segment(segment: u8) -> u8 {
    wrap_segment(wrap_segment(segment) + 1)
}

/// Start and end points of a segment (at item height)
pub fn segment_endpoints(segment: u8) -> (Vec3, Vec3) {
    let h = TRACK_HALF_EXTENT;
    let (start, end) = match wrap_segment(segment) {
        0 => ((-h, -h), (h, -h)),
        1 => ((h, -h), (h, h)),
        2 => ((h, h), (-h, h)),
        _ => ((-h, h), (-h, -h)),
    };
    (
        Vec3::new(start.0, ITEM_HEIGHT, start.1),
        Vec3::new(end.0, ITEM_HEIGHT, end.1),
    )
}

/// Heading of items travelling along a segment; turns 90° per corner
#[inline]
pub fn segment_yaw(segment: u8) -> f32 {
    wrap_segment(segment) as f32 * std::f32::consts::FRAC_PI_2
}

/// Map (segment, progress) to a pose. Progress is clamped to [0, 1].
pub fn pose(segment: u8, t: f32) -> Pose {
    let (start, end) = segment_endpoints(segment);
    let yaw = segment_yaw(segment);
    Pose {
        position: start.lerp(end, t.clamp(0.0, 1.0)),
        rotation: Quat::from_rotation_y(yaw),
        yaw,
    }
}

/// World position of a corner compartment (floor level)
pub fn corner_position(corner: Corner) -> Vec3 {
    let (_, end) = segment_endpoints(corner.index() as u8);
    Vec3::new(end.x, 0.0, end.z)
}
