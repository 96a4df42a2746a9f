//! Conveyor Loop - transport simulation behind the showcase page
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track, items, doors, corner policy)
//! - `frame`: Fixed-timestep frame driver
//! - `settings`: Tunable speed, caps and timings
//! - `web`: wasm-bindgen surface consumed by the page (wasm32 only)

pub mod frame;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use frame::FrameDriver;
pub use settings::Settings;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the page was tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the driver will account for (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Progress per tick is `speed / SEGMENT_NORMALIZER`, independent of segment length
    pub const SEGMENT_NORMALIZER: f32 = 14.0;
    /// Arrival tolerance absorbing f32 accumulation error (well below one tick of progress)
    pub const ARRIVAL_EPSILON: f32 = 1e-4;

    /// Track corners sit at (±TRACK_HALF_EXTENT, ±TRACK_HALF_EXTENT)
    pub const TRACK_HALF_EXTENT: f32 = 8.0;
    /// Height items ride at above the floor
    pub const ITEM_HEIGHT: f32 = 1.4;

    /// Sliding panel rest height (closed)
    pub const DOOR_Y: f32 = 2.05;
    /// Sliding panel travel when raised
    pub const DOOR_HEIGHT: f32 = 1.9;

    /// Bottle arrivals at corner 1 that produce one box
    pub const BOTTLES_PER_BOX: u32 = 2;

    /// Belt texture scroll per tick
    pub const BELT_SCROLL_PER_TICK: f32 = 0.01;
}
