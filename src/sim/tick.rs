//! Fixed timestep simulation tick
//!
//! Advances every item along the belt, hands corner arrivals to the policy,
//! then settles doors against the occupancy windows.

use super::state::ConveyorState;
use crate::consts::*;

/// Advance the conveyor by `dt` seconds.
///
/// Progress per step is `item_speed / SEGMENT_NORMALIZER` at the nominal
/// `SIM_DT`, scaled by elapsed time so transport and doors share one clock.
/// `dt` is clamped to `MAX_FRAME_DT` and split into steps no longer than
/// `SIM_DT`, so no item can jump across an occupancy window.
pub fn tick(state: &mut ConveyorState, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    let steps = (dt / SIM_DT).ceil().max(1.0) as u32;
    let sub_dt = dt / steps as f32;
    for _ in 0..steps {
        step(state, sub_dt);
    }
}

/// One simulation step. Items spawned or placed by a corner event during the
/// step do not move until the next one.
fn step(state: &mut ConveyorState, dt: f32) {
    state.time_ticks += 1;
    state.time_ms += dt as f64 * 1000.0;

    let now = state.time_ms;
    let frame_scale = dt / SIM_DT;
    let progress = state.settings.progress_per_tick() * frame_scale;

    let ConveyorState {
        settings,
        items,
        doors,
        policy,
        ..
    } = state;

    items.begin_tick();
    for id in items.ids() {
        // Gone already: despawned by an earlier item's event this tick
        let Some(item) = items.get(id).copied() else {
            continue;
        };
        if item.parked || item.placed_this_tick {
            continue;
        }
        if policy.before_advance(id, items, doors, settings, now) {
            continue;
        }

        let t = item.t + progress;
        if t >= 1.0 - ARRIVAL_EPSILON {
            policy.on_arrive(id, items, doors, settings, now);
        } else if let Some(item) = items.get_mut(id) {
            item.t = t;
        }
    }

    doors.update(now);
    policy.update_doors(items, doors, settings, now);

    state.belt_offset = wrap_unit(state.belt_offset - BELT_SCROLL_PER_TICK * frame_scale);
}

/// Wrap into [0, 1); rem_euclid can round tiny negatives up to exactly 1.0
#[inline]
fn wrap_unit(x: f32) -> f32 {
    let wrapped = x.rem_euclid(1.0);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
