//! Live item collection
//!
//! The registry owns item lifetime and nothing else: population caps are
//! the corner policy's business.

use serde::{Deserialize, Serialize};

use super::track::wrap_segment;

/// Stable item identifier
pub type ItemId = u32;

/// Kinds of items riding the belt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Bottle,
    Box,
}

/// An item on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Segment index (0..4)
    pub segment: u8,
    /// Progress along the segment, [0, 1)
    pub t: f32,
    /// Held at the end of its segment waiting to be recycled
    #[serde(default)]
    pub parked: bool,
    /// Placed by a corner event during the current tick; holds still until the next
    #[serde(skip)]
    pub placed_this_tick: bool,
}

impl Item {
    /// Put the item at the start of `segment`
    pub fn place(&mut self, segment: u8) {
        self.segment = wrap_segment(segment);
        self.t = 0.0;
        self.parked = false;
        self.placed_this_tick = true;
    }
}

/// Owner of all live items, kept in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemRegistry {
    items: Vec<Item>,
    next_id: ItemId,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Create an item. Segment wraps onto the loop, progress is clamped into [0, 1).
    pub fn spawn(&mut self, kind: ItemKind, segment: u8, t: f32) -> Item {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let t = if t.is_finite() { t.clamp(0.0, 1.0 - f32::EPSILON) } else { 0.0 };
        let item = Item {
            id,
            kind,
            segment: wrap_segment(segment),
            t,
            parked: false,
            placed_this_tick: false,
        };
        // Ids only grow, so pushing keeps id order
        self.items.push(item);
        item
    }

    /// Remove an item. Removing an absent item is a silent no-op.
    pub fn despawn(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    /// Clear every item's placement marker at the start of a tick
    pub fn begin_tick(&mut self) {
        for item in &mut self.items {
            item.placed_this_tick = false;
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// All live items of one kind, in id order
    pub fn all(&self, kind: ItemKind) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(move |i| i.kind == kind)
    }

    pub fn count(&self, kind: ItemKind) -> usize {
        self.all(kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    /// Snapshot of live ids (stable while the registry mutates)
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut reg = ItemRegistry::new();
        let a = reg.spawn(ItemKind::Bottle, 0, 0.0);
        let b = reg.spawn(ItemKind::Box, 1, 0.5);
        assert!(b.id > a.id);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.count(ItemKind::Bottle), 1);
        assert_eq!(reg.count(ItemKind::Box), 1);
    }

    #[test]
    fn test_despawn_is_idempotent() {
        let mut reg = ItemRegistry::new();
        let a = reg.spawn(ItemKind::Bottle, 0, 0.0);
        assert!(reg.despawn(a.id).is_some());
        assert!(reg.despawn(a.id).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_spawn_normalizes_position() {
        let mut reg = ItemRegistry::new();
        let item = reg.spawn(ItemKind::Box, 6, 1.5);
        assert_eq!(item.segment, 2);
        assert!(item.t < 1.0);

        let nan = reg.spawn(ItemKind::Box, 0, f32::NAN);
        assert_eq!(nan.t, 0.0);
    }

    #[test]
    fn test_all_filters_by_kind_in_id_order() {
        let mut reg = ItemRegistry::new();
        reg.spawn(ItemKind::Box, 1, 0.0);
        reg.spawn(ItemKind::Bottle, 0, 0.0);
        reg.spawn(ItemKind::Box, 2, 0.0);

        let ids: Vec<_> = reg.all(ItemKind::Box).map(|i| i.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
    }

    #[test]
    fn test_place_marks_item_until_next_tick() {
        let mut reg = ItemRegistry::new();
        let item = reg.spawn(ItemKind::Box, 3, 0.5);
        assert!(!item.placed_this_tick);

        if let Some(item) = reg.get_mut(item.id) {
            item.place(1);
        }
        assert!(reg.get(item.id).is_some_and(|i| i.placed_this_tick && i.segment == 1));

        reg.begin_tick();
        assert!(reg.iter().all(|i| !i.placed_this_tick));
    }

    #[test]
    fn test_default_registry_still_starts_ids_at_one() {
        let mut reg = ItemRegistry::default();
        assert_eq!(reg.spawn(ItemKind::Bottle, 0, 0.0).id, 1);
        assert_eq!(reg.spawn(ItemKind::Bottle, 0, 0.0).id, 2);
    }
}
