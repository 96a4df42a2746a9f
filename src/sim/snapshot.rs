//! Per-frame output for the presentation layer

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::door::{BarrierKind, Corner, DoorPhase, Side};
use super::policy::PolicyStats;
use super::registry::{ItemId, ItemKind};
use super::state::ConveyorState;
use super::track::{corner_position, pose};

/// Floats per item in `FrameSnapshot::pose_buffer` (x, y, z, yaw)
pub const POSE_STRIDE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub segment: u8,
    pub t: f32,
    pub parked: bool,
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorView {
    pub corner: Corner,
    pub side: Side,
    pub barrier: BarrierKind,
    /// Compartment position on the floor
    pub position: Vec3,
    /// Commanded flag
    pub open: bool,
    pub state: DoorPhase,
    /// 0 = closed, 1 = open
    pub openness: f32,
    /// Panel height offset
    pub offset: f32,
}

/// Everything the page needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub time_ms: f64,
    pub belt_offset: f32,
    /// Any door transition still in flight
    pub doors_moving: bool,
    pub bottle_arrivals_corner1: u32,
    pub bottle_arrivals_corner4: u32,
    pub stats: PolicyStats,
    pub items: Vec<ItemView>,
    pub doors: Vec<DoorView>,
}

impl FrameSnapshot {
    pub fn capture(state: &ConveyorState) -> Self {
        let now = state.now_ms();
        let items = state
            .items
            .iter()
            .map(|item| {
                let p = pose(item.segment, item.t);
                ItemView {
                    id: item.id,
                    kind: item.kind,
                    segment: item.segment,
                    t: item.t,
                    parked: item.parked,
                    position: p.position,
                    yaw: p.yaw,
                }
            })
            .collect();

        let doors = Corner::ALL
            .iter()
            .flat_map(|&corner| Side::ALL.iter().map(move |&side| (corner, side)))
            .map(|(corner, side)| {
                let door = state.doors.state(corner, side);
                DoorView {
                    corner,
                    side,
                    barrier: corner.barrier(),
                    position: corner_position(corner),
                    open: door.is_open(),
                    state: door.phase(),
                    openness: door.openness(now),
                    offset: state.doors.panel_offset(corner, side, now),
                }
            })
            .collect();

        Self {
            tick: state.time_ticks,
            time_ms: now,
            belt_offset: state.belt_offset,
            doors_moving: state.doors.any_in_flight(),
            bottle_arrivals_corner1: state.policy.bottle_arrivals_corner1,
            bottle_arrivals_corner4: state.policy.bottle_arrivals_corner4,
            stats: state.policy.stats,
            items,
            doors,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Flat (x, y, z, yaw) per item, in item order
    pub fn pose_buffer(&self) -> Vec<f32> {
        let mut buf = Vec::with_capacity(self.items.len() * POSE_STRIDE);
        for item in &self.items {
            buf.extend_from_slice(&[item.position.x, item.position.y, item.position.z, item.yaw]);
        }
        buf
    }

    pub fn door(&self, corner: Corner, side: Side) -> Option<&DoorView> {
        self.doors.iter().find(|d| d.corner == corner && d.side == side)
    }
}
