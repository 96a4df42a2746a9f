//! Deterministic simulation module
//!
//! All transport logic lives here. This module must be pure and deterministic:
//! - Clock advanced only by `tick`
//! - Stable iteration order (by item ID)
//! - No rendering or platform dependencies

pub mod door;
pub mod policy;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;

pub use door::{BarrierKind, Corner, DoorAnimation, DoorController, DoorPhase, DoorState, Side, ease_out_cubic};
pub use policy::{ArrivalOutcome, CornerPolicy, OCCUPANCY_WINDOWS, OccupancyWindow, PolicyStats};
pub use registry::{Item, ItemId, ItemKind, ItemRegistry};
pub use snapshot::{DoorView, FrameSnapshot, ItemView, POSE_STRIDE};
pub use state::ConveyorState;
pub use tick::tick;
pub use track::{Pose, SEGMENT_COUNT, corner_position, pose, segment_endpoints};
