//! Conveyor state
//!
//! Everything the simulation mutates lives here, advanced by `tick`.

use serde::{Deserialize, Serialize};

use super::door::DoorController;
use super::policy::CornerPolicy;
use super::registry::{Item, ItemId, ItemKind, ItemRegistry};
use super::track::{Pose, pose};
use crate::settings::Settings;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConveyorState {
    /// Sanitized settings in effect
    pub settings: Settings,
    /// Live bottles and boxes
    pub items: ItemRegistry,
    /// Corner doors
    pub doors: DoorController,
    /// Corner counters and rules
    pub policy: CornerPolicy,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock (milliseconds), drives door animations
    pub time_ms: f64,
    /// Belt texture scroll, wraps in [0, 1)
    pub belt_offset: f32,
}

impl ConveyorState {
    /// Create a state with the startup population: bottles staggered along
    /// segment 0, boxes staggered along segment 1.
    pub fn new(settings: &Settings) -> Self {
        let mut state = Self::empty(settings);
        let settings = &state.settings;
        let (bottles, boxes) = (settings.initial_bottles, settings.initial_boxes);

        for i in 0..bottles {
            state.items.spawn(ItemKind::Bottle, 0, i as f32 / bottles as f32);
        }
        for i in 0..boxes {
            state.items.spawn(ItemKind::Box, 1, i as f32 / boxes as f32);
        }

        log::info!(
            "Conveyor started: {} bottles, {} boxes, speed {}",
            bottles,
            boxes,
            state.settings.item_speed
        );
        state
    }

    /// Create a state with no items
    pub fn empty(settings: &Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            doors: DoorController::new(settings.door_duration_ms),
            settings,
            items: ItemRegistry::new(),
            policy: CornerPolicy::new(),
            time_ticks: 0,
            time_ms: 0.0,
            belt_offset: 0.0,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.time_ms
    }

    /// Change belt speed (clamped to the slider range)
    pub fn set_speed(&mut self, speed: f32) {
        self.settings = Settings {
            item_speed: speed,
            ..self.settings.clone()
        }
        .sanitized();
        log::debug!("item speed set to {}", self.settings.item_speed);
    }

    /// Place an item directly on the track
    pub fn spawn(&mut self, kind: ItemKind, segment: u8, t: f32) -> Item {
        self.items.spawn(kind, segment, t)
    }

    /// Presentation pose of a live item
    pub fn pose(&self, id: ItemId) -> Option<Pose> {
        self.items.get(id).map(|item| pose(item.segment, item.t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_staggered_population() {
        let state = ConveyorState::new(&Settings::default());
        let bottles: Vec<f32> = state.items.all(ItemKind::Bottle).map(|b| b.t).collect();
        assert_eq!(bottles.len(), 3);
        assert!((bottles[1] - 1.0 / 3.0).abs() < 1e-6);
        assert!((bottles[2] - 2.0 / 3.0).abs() < 1e-6);
        assert!(state.items.all(ItemKind::Bottle).all(|b| b.segment == 0));
        assert!(state.items.all(ItemKind::Box).all(|b| b.segment == 1));
    }

    #[test]
    fn test_set_speed_clamps() {
        let mut state = ConveyorState::empty(&Settings::default());
        state.set_speed(1.0);
        assert_eq!(state.settings.item_speed, crate::settings::MAX_ITEM_SPEED);
    }

    #[test]
    fn test_pose_of_missing_item_is_none() {
        let mut state = ConveyorState::empty(&Settings::default());
        let item = state.spawn(ItemKind::Box, 1, 0.0);
        assert!(state.pose(item.id).is_some());
        state.items.despawn(item.id);
        assert!(state.pose(item.id).is_none());
    }
}
