//! Browser bindings
//!
//! The page owns rendering and the animation frame callback; it hands each
//! frame timestamp to `ConveyorSim::frame` and reads poses and door offsets
//! back out.

use wasm_bindgen::prelude::*;

use crate::frame::FrameDriver;
use crate::settings::Settings;
use crate::sim::{ConveyorState, Corner, FrameSnapshot, Side};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Conveyor Loop (web) starting...");
}

/// Simulation handle exposed to JavaScript
#[wasm_bindgen]
pub struct ConveyorSim {
    state: ConveyorState,
    driver: FrameDriver,
}

#[wasm_bindgen]
impl ConveyorSim {
    /// Build from a JSON settings string; empty or invalid input uses defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> ConveyorSim {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json_or_default(settings_json)
        };
        ConveyorSim {
            state: ConveyorState::new(&settings),
            driver: FrameDriver::new(),
        }
    }

    /// Advance to the given `requestAnimationFrame` timestamp (milliseconds)
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        self.driver.frame(&mut self.state, now_ms / 1000.0)
    }

    /// Development speed control
    pub fn set_speed(&mut self, speed: f32) {
        self.state.set_speed(speed);
    }

    /// Drop timing history after the tab was hidden
    pub fn resume(&mut self) {
        self.driver.reset();
    }

    pub fn item_count(&self) -> usize {
        self.state.items.len()
    }

    /// Flat (x, y, z, yaw) per item
    pub fn poses(&self) -> js_sys::Float32Array {
        let buf = FrameSnapshot::capture(&self.state).pose_buffer();
        js_sys::Float32Array::from(buf.as_slice())
    }

    /// Whether the corner's side is commanded open. `side` 0 = entry, 1 = exit.
    pub fn door_open(&self, corner: usize, side: usize) -> bool {
        door_key(corner, side)
            .map(|(c, s)| self.state.doors.is_open(c, s))
            .unwrap_or(false)
    }

    /// Current panel offset for a door side
    pub fn door_offset(&self, corner: usize, side: usize) -> f32 {
        door_key(corner, side)
            .map(|(c, s)| self.state.doors.panel_offset(c, s, self.state.now_ms()))
            .unwrap_or(crate::consts::DOOR_Y)
    }

    pub fn belt_offset(&self) -> f32 {
        self.state.belt_offset
    }

    /// Fraction of a tick left over, for interpolating between poses
    pub fn alpha(&self) -> f32 {
        self.driver.alpha()
    }

    /// Whether any door is mid-transition (the page can skip door updates otherwise)
    pub fn doors_moving(&self) -> bool {
        self.state.doors.any_in_flight()
    }

    /// Full frame state as JSON
    pub fn snapshot_json(&self) -> String {
        match FrameSnapshot::capture(&self.state).to_json() {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Snapshot serialization failed: {}", err);
                String::from("{}")
            }
        }
    }
}

fn door_key(corner: usize, side: usize) -> Option<(Corner, Side)> {
    let corner = Corner::from_index(corner)?;
    let side = Side::ALL.get(side).copied()?;
    Some((corner, side))
}
