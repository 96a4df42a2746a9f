//! Corner event policy
//!
//! Decides what happens when an item reaches a corner: recycling, despawning,
//! spawning boxes from bottle pairs, parking, and which doors to command.
//! Population caps are checked here, never in the registry.
//!
//! Cap rules: recycling keeps an item only while the live count including it
//! is within the cap, spawning requires the count to be strictly below it.
//! Together they keep each population at or under its cap.

use serde::{Deserialize, Serialize};

use super::door::{Corner, DoorController, DoorState, Side};
use super::registry::{Item, ItemId, ItemKind, ItemRegistry};
use super::track::next_segment;
use crate::consts::BOTTLES_PER_BOX;
use crate::settings::Settings;

/// Which part of a segment a window watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    /// The first `width` of the segment
    Start,
    /// The last `width` of the segment
    End,
    /// Items parked at the segment's end
    Parked,
}

/// Narrow band near a corner that keeps one door side open while occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyWindow {
    pub corner: Corner,
    pub side: Side,
    pub kind: ItemKind,
    pub segment: u8,
    pub edge: WindowEdge,
}

impl OccupancyWindow {
    const fn new(corner: Corner, side: Side, kind: ItemKind, segment: u8, edge: WindowEdge) -> Self {
        Self {
            corner,
            side,
            kind,
            segment,
            edge,
        }
    }

    pub fn contains(&self, item: &Item, width: f32) -> bool {
        if item.kind != self.kind || item.segment != self.segment {
            return false;
        }
        match self.edge {
            WindowEdge::Start => !item.parked && item.t <= width,
            WindowEdge::End => !item.parked && item.t >= 1.0 - width,
            WindowEdge::Parked => item.parked,
        }
    }
}

/// Boxes reaching this band leave the loop
pub const CORNER3_DROP_WINDOW: OccupancyWindow =
    OccupancyWindow::new(Corner::Three, Side::Entry, ItemKind::Box, 2, WindowEdge::End);

/// Door windows, one per gated side
pub const OCCUPANCY_WINDOWS: [OccupancyWindow; 7] = [
    OccupancyWindow::new(Corner::One, Side::Entry, ItemKind::Bottle, 0, WindowEdge::End),
    OccupancyWindow::new(Corner::One, Side::Exit, ItemKind::Box, 1, WindowEdge::Start),
    OccupancyWindow::new(Corner::Two, Side::Entry, ItemKind::Box, 1, WindowEdge::End),
    OccupancyWindow::new(Corner::Two, Side::Exit, ItemKind::Box, 2, WindowEdge::Start),
    CORNER3_DROP_WINDOW,
    OccupancyWindow::new(Corner::Four, Side::Entry, ItemKind::Bottle, 3, WindowEdge::End),
    OccupancyWindow::new(Corner::Four, Side::Exit, ItemKind::Box, 3, WindowEdge::Parked),
];

/// What an arrival did to the arriving item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// Sent back to the start of its loop
    Recycled,
    /// Removed from the registry
    Despawned,
    /// Moved on to the next segment
    Advanced,
    /// Holding at the end of its segment
    Parked,
}

/// Running totals for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStats {
    pub boxes_spawned: u64,
    pub boxes_recycled: u64,
    pub items_despawned: u64,
}

/// Per-corner counters and rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CornerPolicy {
    /// Bottles that reached corner 1 since the last box spawn
    pub bottle_arrivals_corner1: u32,
    /// Bottles that reached corner 4
    pub bottle_arrivals_corner4: u32,
    pub stats: PolicyStats,
}

impl CornerPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before an item moves. Returns true if the item was consumed.
    pub fn before_advance(
        &mut self,
        id: ItemId,
        registry: &mut ItemRegistry,
        doors: &mut DoorController,
        settings: &Settings,
        now_ms: f64,
    ) -> bool {
        let Some(item) = registry.get(id).copied() else {
            return false;
        };

        if CORNER3_DROP_WINDOW.contains(&item, settings.occupancy_window) {
            registry.despawn(id);
            self.stats.items_despawned += 1;
            doors.request(Corner::Three, Side::Entry, true, now_ms);
            log::debug!("box {} consumed at corner 3", id);
            return true;
        }
        false
    }

    /// Handle an item finishing its segment
    pub fn on_arrive(
        &mut self,
        id: ItemId,
        registry: &mut ItemRegistry,
        doors: &mut DoorController,
        settings: &Settings,
        now_ms: f64,
    ) -> ArrivalOutcome {
        let Some(item) = registry.get(id).copied() else {
            return ArrivalOutcome::Despawned;
        };

        match (item.kind, item.segment) {
            (ItemKind::Bottle, 0) => self.bottle_at_corner1(id, registry, doors, settings, now_ms),
            (ItemKind::Bottle, 3) => self.bottle_at_corner4(id, registry, doors, settings, now_ms),
            (ItemKind::Box, 3) => {
                if let Some(item) = registry.get_mut(id) {
                    item.parked = true;
                }
                log::debug!("box {} parked at corner 4", id);
                ArrivalOutcome::Parked
            }
            (_, segment) => {
                if let Some(item) = registry.get_mut(id) {
                    item.place(next_segment(segment));
                }
                ArrivalOutcome::Advanced
            }
        }
    }

    fn bottle_at_corner1(
        &mut self,
        id: ItemId,
        registry: &mut ItemRegistry,
        doors: &mut DoorController,
        settings: &Settings,
        now_ms: f64,
    ) -> ArrivalOutcome {
        self.bottle_arrivals_corner1 += 1;

        let outcome = if registry.count(ItemKind::Bottle) <= settings.max_bottles {
            if let Some(bottle) = registry.get_mut(id) {
                bottle.place(0);
            }
            ArrivalOutcome::Recycled
        } else {
            registry.despawn(id);
            self.stats.items_despawned += 1;
            log::debug!("bottle {} dropped, over cap", id);
            ArrivalOutcome::Despawned
        };

        if self.bottle_arrivals_corner1 >= BOTTLES_PER_BOX
            && registry.count(ItemKind::Box) < settings.max_boxes
        {
            let new_box = registry.spawn(ItemKind::Box, 1, 0.0);
            self.bottle_arrivals_corner1 = 0;
            self.stats.boxes_spawned += 1;
            doors.request(Corner::One, Side::Exit, true, now_ms);
            doors.request(Corner::Two, Side::Entry, true, now_ms);
            log::debug!("box {} packed at corner 1", new_box.id);
        }

        outcome
    }

    fn bottle_at_corner4(
        &mut self,
        id: ItemId,
        registry: &mut ItemRegistry,
        doors: &mut DoorController,
        settings: &Settings,
        now_ms: f64,
    ) -> ArrivalOutcome {
        self.bottle_arrivals_corner4 += 1;

        let parked = registry
            .all(ItemKind::Box)
            .find(|b| b.segment == 3 && b.parked)
            .map(|b| b.id);
        if let Some(box_id) = parked {
            if registry.count(ItemKind::Box) <= settings.max_boxes {
                if let Some(parked_box) = registry.get_mut(box_id) {
                    parked_box.place(1);
                }
                self.stats.boxes_recycled += 1;
                doors.request(Corner::Four, Side::Exit, true, now_ms);
                log::debug!("box {} recycled to corner 1", box_id);
            } else {
                registry.despawn(box_id);
                self.stats.items_despawned += 1;
                log::debug!("box {} dropped, over cap", box_id);
            }
        }

        if let Some(bottle) = registry.get_mut(id) {
            bottle.place(0);
        }
        ArrivalOutcome::Recycled
    }

    /// Corner 1 entry stays open while arrivals wait on the box cap
    fn holds_open(&self, window: &OccupancyWindow) -> bool {
        window.corner == Corner::One
            && window.side == Side::Entry
            && self.bottle_arrivals_corner1 >= BOTTLES_PER_BOX
    }

    /// Open doors whose window is occupied; close settled-open doors whose
    /// window is empty. Doors still opening are left to finish.
    pub fn update_doors(
        &self,
        registry: &ItemRegistry,
        doors: &mut DoorController,
        settings: &Settings,
        now_ms: f64,
    ) {
        for window in &OCCUPANCY_WINDOWS {
            let occupied = self.holds_open(window)
                || registry
                    .all(window.kind)
                    .any(|item| window.contains(item, settings.occupancy_window));

            if occupied {
                doors.request(window.corner, window.side, true, now_ms);
            } else if doors.state(window.corner, window.side) == DoorState::Open {
                doors.request(window.corner, window.side, false, now_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CornerPolicy, ItemRegistry, DoorController, Settings) {
        (
            CornerPolicy::new(),
            ItemRegistry::new(),
            DoorController::new(800.0),
            Settings::default(),
        )
    }

    #[test]
    fn test_two_bottle_arrivals_spawn_one_box() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let a = reg.spawn(ItemKind::Bottle, 0, 0.99);
        let b = reg.spawn(ItemKind::Bottle, 0, 0.99);

        policy.on_arrive(a.id, &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(policy.bottle_arrivals_corner1, 1);
        assert_eq!(reg.count(ItemKind::Box), 0);

        let outcome = policy.on_arrive(b.id, &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(outcome, ArrivalOutcome::Recycled);
        assert_eq!(policy.bottle_arrivals_corner1, 0);
        assert_eq!(reg.count(ItemKind::Box), 1);
        assert_eq!(policy.stats.boxes_spawned, 1);

        let new_box = reg.all(ItemKind::Box).next().copied().unwrap();
        assert_eq!((new_box.segment, new_box.t), (1, 0.0));
        assert!(doors.is_open(Corner::One, Side::Exit));
        assert!(doors.is_open(Corner::Two, Side::Entry));

        // Arriving bottles went back to the start of segment 0
        assert_eq!(reg.get(a.id).map(|i| (i.segment, i.t)), Some((0, 0.0)));
    }

    #[test]
    fn test_box_cap_blocks_spawn_and_keeps_counting() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        for _ in 0..settings.max_boxes {
            reg.spawn(ItemKind::Box, 1, 0.5);
        }
        let bottle = reg.spawn(ItemKind::Bottle, 0, 0.99);

        for _ in 0..3 {
            policy.on_arrive(bottle.id, &mut reg, &mut doors, &settings, 0.0);
        }
        assert_eq!(reg.count(ItemKind::Box), settings.max_boxes);
        assert_eq!(policy.bottle_arrivals_corner1, 3);
        assert!(!doors.is_open(Corner::One, Side::Exit));
    }

    #[test]
    fn test_bottle_over_cap_is_despawned() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let ids: Vec<_> = (0..settings.max_bottles + 1)
            .map(|_| reg.spawn(ItemKind::Bottle, 0, 0.5).id)
            .collect();

        let outcome = policy.on_arrive(ids[0], &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(outcome, ArrivalOutcome::Despawned);
        assert_eq!(reg.count(ItemKind::Bottle), settings.max_bottles);

        // Back at the cap: the next arrival recycles
        let outcome = policy.on_arrive(ids[1], &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(outcome, ArrivalOutcome::Recycled);
    }

    #[test]
    fn test_box_turns_corner() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let b = reg.spawn(ItemKind::Box, 1, 0.99);
        let outcome = policy.on_arrive(b.id, &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(outcome, ArrivalOutcome::Advanced);
        assert_eq!(reg.get(b.id).map(|i| (i.segment, i.t)), Some((2, 0.0)));
    }

    #[test]
    fn test_box_in_corner3_window_is_consumed() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let inside = reg.spawn(ItemKind::Box, 2, 0.995);
        let outside = reg.spawn(ItemKind::Box, 2, 0.5);

        assert!(!policy.before_advance(outside.id, &mut reg, &mut doors, &settings, 0.0));
        assert!(policy.before_advance(inside.id, &mut reg, &mut doors, &settings, 0.0));
        assert!(reg.get(inside.id).is_none());
        assert!(doors.is_open(Corner::Three, Side::Entry));
    }

    #[test]
    fn test_parked_box_recycled_by_bottle_at_corner4() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let parked = reg.spawn(ItemKind::Box, 3, 0.99);
        let bottle = reg.spawn(ItemKind::Bottle, 3, 0.99);

        assert_eq!(
            policy.on_arrive(parked.id, &mut reg, &mut doors, &settings, 0.0),
            ArrivalOutcome::Parked
        );
        assert!(reg.get(parked.id).is_some_and(|b| b.parked));

        policy.on_arrive(bottle.id, &mut reg, &mut doors, &settings, 0.0);
        let recycled = reg.get(parked.id).copied().unwrap();
        assert_eq!(recycled.kind, ItemKind::Box);
        assert_eq!((recycled.segment, recycled.t, recycled.parked), (1, 0.0, false));
        assert_eq!(reg.get(bottle.id).map(|i| (i.segment, i.t)), Some((0, 0.0)));
        assert_eq!(policy.bottle_arrivals_corner4, 1);
        assert!(doors.is_open(Corner::Four, Side::Exit));
    }

    #[test]
    fn test_bottle_at_corner4_without_parked_box() {
        let (mut policy, mut reg, mut doors, settings) = setup();
        let bottle = reg.spawn(ItemKind::Bottle, 3, 0.99);
        policy.on_arrive(bottle.id, &mut reg, &mut doors, &settings, 0.0);
        assert_eq!(reg.get(bottle.id).map(|i| i.segment), Some(0));
        assert!(!doors.is_open(Corner::Four, Side::Exit));
    }

    #[test]
    fn test_proximity_opens_then_closes_after_settling() {
        let (policy, mut reg, mut doors, settings) = setup();
        let b = reg.spawn(ItemKind::Box, 1, 0.995);

        policy.update_doors(&reg, &mut doors, &settings, 0.0);
        assert!(doors.is_open(Corner::Two, Side::Entry));

        // Window empties while the door is still opening: it stays open
        reg.despawn(b.id);
        policy.update_doors(&reg, &mut doors, &settings, 100.0);
        assert!(doors.is_open(Corner::Two, Side::Entry));

        doors.update(800.0);
        policy.update_doors(&reg, &mut doors, &settings, 800.0);
        assert!(!doors.is_open(Corner::Two, Side::Entry));
    }

    #[test]
    fn test_corner1_entry_held_while_spawn_pending() {
        let (mut policy, reg, mut doors, settings) = setup();
        policy.bottle_arrivals_corner1 = BOTTLES_PER_BOX;
        policy.update_doors(&reg, &mut doors, &settings, 0.0);
        doors.update(800.0);
        policy.update_doors(&reg, &mut doors, &settings, 800.0);
        assert_eq!(doors.state(Corner::One, Side::Entry), DoorState::Open);
    }
}
