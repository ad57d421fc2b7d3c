//! Line Instrument entry point
//!
//! Native builds run a headless session: scatter a seeded set of lines, drop
//! balls for a while, log what happened and print the final shareable scene.
//! The browser build starts from `web::wasm_start` instead.
//!
//! Usage: `line-instrument [ticks] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use line_instrument::Snapshot;
    use line_instrument::settings::Settings;
    use line_instrument::sim::{Scene, TickStats, Tone, demo, tick};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let ticks: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1200);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    log::info!("Line Instrument (native) starting: {} ticks, seed {}", ticks, seed);

    let mut scene = Scene::new(1024.0, 768.0);
    let mut settings = Settings::load();
    settings.sound_on = true;
    settings.apply_to(&mut scene);
    demo::scatter_lines(&mut scene, seed, 24);
    scene.spawn_particle(None);

    // 60 Hz frames; tones are collected instead of played
    const FRAME_MS: f64 = 1000.0 / 60.0;
    let mut tones: Vec<Tone> = Vec::new();
    let mut totals = TickStats::default();
    let mut peak = 0;

    for _ in 0..ticks {
        let stats = tick(&mut scene, FRAME_MS, &mut tones);
        totals.spawned += stats.spawned;
        totals.burned += stats.burned;
        totals.split += stats.split;
        totals.culled += stats.culled;
        totals.tones += stats.tones;
        peak = peak.max(scene.particles.len());
    }

    log::info!(
        "Done after {:.1}s: {} spawned, {} split, {} burned, {} culled, {} live (peak {})",
        scene.clock_ms / 1000.0,
        totals.spawned,
        totals.split,
        totals.burned,
        totals.culled,
        scene.particles.len(),
        peak
    );
    if let (Some(low), Some(high)) = (
        tones.iter().map(|t| t.frequency_hz).reduce(f32::min),
        tones.iter().map(|t| t.frequency_hz).reduce(f32::max),
    ) {
        log::info!("{} tones between {:.1} Hz and {:.1} Hz", tones.len(), low, high);
    }

    match Snapshot::capture(&scene).to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode scene: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
