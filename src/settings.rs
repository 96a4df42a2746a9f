//! Simulation settings
//!
//! Stored as JSON. Unknown or missing fields fall back to defaults; values
//! outside their useful range are clamped by `sanitized`.

use serde::{Deserialize, Serialize};

/// Range exposed by the development speed slider
pub const MIN_ITEM_SPEED: f32 = 0.01;
pub const MAX_ITEM_SPEED: f32 = 0.1;

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Belt speed constant; each tick advances progress by `item_speed / 14`
    pub item_speed: f32,

    // === Population ===
    /// Bottle population cap
    pub max_bottles: usize,
    /// Box population cap
    pub max_boxes: usize,
    /// Bottles seeded on segment 0 at startup (evenly staggered)
    pub initial_bottles: usize,
    /// Boxes seeded on segment 1 at startup (evenly staggered)
    pub initial_boxes: usize,

    // === Doors ===
    /// Occupancy window width, as a fraction of a segment
    pub occupancy_window: f32,
    /// Door transition duration (milliseconds)
    pub door_duration_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            item_speed: 0.02,

            max_bottles: 3,
            max_boxes: 3,
            initial_bottles: 3,
            initial_boxes: 3,

            // 0.2 world units of a 16 unit segment
            occupancy_window: 0.0125,
            door_duration_ms: 800.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse settings, falling back to defaults on bad input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("Ignoring invalid settings ({}), using defaults", err);
                Self::default()
            }
        }
    }

    /// Copy with every value clamped into its working range
    pub fn sanitized(&self) -> Self {
        let default = Self::default();
        let item_speed = if self.item_speed.is_finite() {
            self.item_speed.clamp(MIN_ITEM_SPEED, MAX_ITEM_SPEED)
        } else {
            default.item_speed
        };
        let occupancy_window = if self.occupancy_window.is_finite() && self.occupancy_window > 0.0 {
            self.occupancy_window.min(0.5)
        } else {
            default.occupancy_window
        };
        let door_duration_ms = if self.door_duration_ms.is_finite() {
            self.door_duration_ms.max(1.0)
        } else {
            default.door_duration_ms
        };

        Self {
            item_speed,
            max_bottles: self.max_bottles,
            max_boxes: self.max_boxes,
            initial_bottles: self.initial_bottles.min(self.max_bottles),
            initial_boxes: self.initial_boxes.min(self.max_boxes),
            occupancy_window,
            door_duration_ms,
        }
    }

    /// Per-tick progress increment
    pub fn progress_per_tick(&self) -> f32 {
        self.item_speed / crate::consts::SEGMENT_NORMALIZER
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json_or_default(&json)
            }
            Err(err) => {
                log::warn!("Could not read {} ({}), using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
