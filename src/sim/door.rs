//! Corner doors and their timed transitions
//!
//! Each corner has an entry and an exit side. A side is in one of four
//! states; the two transitional states own their animation, so a new
//! request replaces the running animation instead of racing it.
//!
//! Animation progress is sampled from the simulation clock by the tick,
//! never scheduled on its own.

use serde::{Deserialize, Serialize};

use crate::consts::{DOOR_HEIGHT, DOOR_Y};

/// Corner compartments, in loop order. `One` sits where segment 0 ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    One,
    Two,
    Three,
    Four,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::One, Corner::Two, Corner::Three, Corner::Four];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// What physically gates this corner
    pub fn barrier(self) -> BarrierKind {
        match self {
            Corner::One | Corner::Two => BarrierKind::SlidingPanel,
            Corner::Three | Corner::Four => BarrierKind::Curtain,
        }
    }
}

/// Door side of a corner compartment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Entry,
    Exit,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Entry, Side::Exit];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Entry => "entry",
            Side::Exit => "exit",
        }
    }
}

/// Physical barrier type. Both animate through the same openness scalar;
/// the page maps it to a panel lift or a curtain draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierKind {
    SlidingPanel,
    Curtain,
}

/// Cubic ease-out: fast start, gentle landing
#[inline]
pub fn ease_out_cubic(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// An in-flight door transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorAnimation {
    /// Openness when the transition began (0 = closed, 1 = open)
    pub start_value: f32,
    pub target_value: f32,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl DoorAnimation {
    pub fn new(start_value: f32, target_value: f32, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            start_value,
            target_value,
            start_ms,
            duration_ms: duration_ms.max(1.0),
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Openness at `now_ms`
    pub fn sample(&self, now_ms: f64) -> f32 {
        let eased = ease_out_cubic(self.progress(now_ms));
        self.start_value + (self.target_value - self.start_value) * eased
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Door state without its animation payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// State of one door side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    Closed,
    Opening(DoorAnimation),
    Open,
    Closing(DoorAnimation),
}

impl DoorState {
    /// Commanded flag: true once an open has been requested
    pub fn is_open(&self) -> bool {
        matches!(self, DoorState::Opening(_) | DoorState::Open)
    }

    /// No transition in flight
    pub fn is_settled(&self) -> bool {
        matches!(self, DoorState::Closed | DoorState::Open)
    }

    /// Openness in [0, 1] at `now_ms`
    pub fn openness(&self, now_ms: f64) -> f32 {
        match self {
            DoorState::Closed => 0.0,
            DoorState::Open => 1.0,
            DoorState::Opening(anim) | DoorState::Closing(anim) => anim.sample(now_ms),
        }
    }

    pub fn phase(&self) -> DoorPhase {
        match self {
            DoorState::Closed => DoorPhase::Closed,
            DoorState::Opening(_) => DoorPhase::Opening,
            DoorState::Open => DoorPhase::Open,
            DoorState::Closing(_) => DoorPhase::Closing,
        }
    }
}

/// Owns every corner's door state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorController {
    doors: [[DoorState; 2]; 4],
    duration_ms: f64,
}

impl Default for DoorController {
    fn default() -> Self {
        Self::new(800.0)
    }
}

impl DoorController {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            doors: [[DoorState::Closed; 2]; 4],
            duration_ms: duration_ms.max(1.0),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn state(&self, corner: Corner, side: Side) -> DoorState {
        self.doors[corner.index()][side.index()]
    }

    pub fn is_open(&self, corner: Corner, side: Side) -> bool {
        self.state(corner, side).is_open()
    }

    pub fn openness(&self, corner: Corner, side: Side, now_ms: f64) -> f32 {
        self.state(corner, side).openness(now_ms)
    }

    /// Vertical offset of the door panel (raised when open)
    pub fn panel_offset(&self, corner: Corner, side: Side, now_ms: f64) -> f32 {
        DOOR_Y + DOOR_HEIGHT * self.openness(corner, side, now_ms)
    }

    /// Flip the commanded state. A transition in flight is replaced, starting
    /// from wherever the door currently is.
    pub fn toggle(&mut self, corner: Corner, side: Side, now_ms: f64) {
        let open = !self.is_open(corner, side);
        self.transition(corner, side, open, now_ms);
    }

    /// Command the door open or closed. Returns false (and does nothing) if
    /// the door is already commanded that way.
    pub fn request(&mut self, corner: Corner, side: Side, open: bool, now_ms: f64) -> bool {
        if self.is_open(corner, side) == open {
            return false;
        }
        self.transition(corner, side, open, now_ms);
        true
    }

    fn transition(&mut self, corner: Corner, side: Side, open: bool, now_ms: f64) {
        let door = &mut self.doors[corner.index()][side.index()];
        let from = door.openness(now_ms);
        let target = if open { 1.0 } else { 0.0 };
        let anim = DoorAnimation::new(from, target, now_ms, self.duration_ms);
        *door = if open {
            DoorState::Opening(anim)
        } else {
            DoorState::Closing(anim)
        };
        log::debug!(
            "door {:?} {} {:?} at {:.0}ms",
            corner,
            side.as_str(),
            door.phase(),
            now_ms
        );
    }

    /// Retire finished transitions
    pub fn update(&mut self, now_ms: f64) {
        for door in self.doors.iter_mut().flatten() {
            match *door {
                DoorState::Opening(anim) if anim.is_finished(now_ms) => *door = DoorState::Open,
                DoorState::Closing(anim) if anim.is_finished(now_ms) => *door = DoorState::Closed,
                _ => {}
            }
        }
    }

    /// True while any door is moving
    pub fn any_in_flight(&self) -> bool {
        self.doors.iter().flatten().any(|d| !d.is_settled())
    }
}
