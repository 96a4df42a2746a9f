//! Conveyor Loop entry point
//!
//! The browser build is driven by the page through `conveyor_loop::web`.
//! Natively this runs the simulation headless and prints the final frame.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use conveyor_loop::consts::SIM_DT;
    use conveyor_loop::sim::{ConveyorState, FrameSnapshot};
    use conveyor_loop::{FrameDriver, Settings};

    /// Simulated wall time (seconds)
    const RUN_SECONDS: u32 = 60;
    const FRAME_RATE: u32 = 60;

    env_logger::init();
    log::info!("Conveyor Loop (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(std::path::Path::new(&path)),
        None => Settings::default(),
    };

    let mut state = ConveyorState::new(&settings);
    let mut driver = FrameDriver::new();
    let mut ticks = 0u64;
    for frame in 0..=RUN_SECONDS * FRAME_RATE {
        ticks += driver.frame(&mut state, frame as f64 / FRAME_RATE as f64) as u64;
    }

    let stats = state.policy.stats;
    log::info!(
        "Ran {} ticks ({:.1}s sim time): {} boxes packed, {} recycled, {} removed",
        ticks,
        ticks as f32 * SIM_DT,
        stats.boxes_spawned,
        stats.boxes_recycled,
        stats.items_despawned
    );

    match FrameSnapshot::capture(&state).to_json() {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("Failed to serialize snapshot: {}", err),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
