mod color;
mod error;
mod grid;
mod interactive;
mod propagation;
mod render;


use clap::Parser;
use log::{error, info, warn};

// Re-export public API
pub use error::PropagationError;
pub use grid::{NoiseLayer, SoundGrid, Tile, TileMap};
pub use interactive::{InteractiveViewer, ViewerConfig};
pub use propagation::{AngleTables, CastSummary, NoiseCaster, NoiseEvent, RayEnd, SoundPropagation};
pub use render::{noise_to_string, save_noise_ppm};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Sound propagation over a tile grid", long_about = None)]
struct Args {
    /// What to run
    #[arg(short, long, value_enum, default_value = "info")]
    mode: Mode,

    /// Grid width in tiles (interactive, render)
    #[arg(long, default_value_t = 40)]
    width: usize,

    /// Grid height in tiles (interactive, render)
    #[arg(long, default_value_t = 30)]
    height: usize,

    /// Sound intensity, also the distance it carries in tiles
    #[arg(short, long, default_value_t = 12.0)]
    intensity: f64,

    /// Output file for render mode
    #[arg(short, long, default_value = "noise.ppm")]
    output: String,

    /// Pixels per tile in rendered output
    #[arg(long, default_value_t = 8)]
    scale: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Info,
    Interactive,
    Benchmark,
    Render,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    match args.mode {
        Mode::Info => {
            println!("Noise Test");
            println!("Run with --mode interactive for minifb viewer");
            println!("Run with --mode benchmark to test performance");
            println!("Run with --mode render to write a PPM of a demo room");
            Ok(())
        }
        Mode::Interactive => run_interactive(&args),
        Mode::Benchmark => run_benchmark(args.intensity),
        Mode::Render => run_render(&args),
    }
}

/// A walled map with an inner room whose doorway faces the source
fn demo_map(width: usize, height: usize) -> TileMap<u32> {
    let mut map = TileMap::new(width, height);
    for x in 0..width {
        map.set_blocks_sound(x, 0, true);
        map.set_blocks_sound(x, height - 1, true);
    }
    for y in 0..height {
        map.set_blocks_sound(0, y, true);
        map.set_blocks_sound(width - 1, y, true);
    }

    // Room in the right third, door in the middle of its left wall
    let (left, right) = (width * 2 / 3, width - 2);
    let (top, bottom) = (height / 4, height * 3 / 4);
    for x in left..=right {
        map.set_blocks_sound(x, top, true);
        map.set_blocks_sound(x, bottom, true);
    }
    for y in top..=bottom {
        if y != height / 2 {
            map.set_blocks_sound(left, y, true);
        }
    }
    map
}

fn run_render(args: &Args) -> Result<(), String> {
    if args.width < 8 || args.height < 8 {
        return Err(format!("Render needs at least an 8x8 grid, got {}x{}", args.width, args.height));
    }

    let mut map = demo_map(args.width, args.height);
    let origin = (args.width / 3, args.height / 2);
    let summary = NoiseCaster::default()
        .cast(0, origin, args.intensity, &mut map)
        .map_err(|e| e.to_string())?;

    info!(
        "Cast from {:?}: {} tiles hear it, {} of {} rays blocked",
        origin,
        map.heard_count(0),
        summary.occluded,
        summary.rays()
    );

    if args.width <= 40 {
        println!("{}", noise_to_string(&map, 0));
    }

    save_noise_ppm(&map, 0, args.intensity, &args.output, args.scale.max(1))
        .map_err(|e| format!("Failed to write {}: {}", args.output, e))?;
    info!("Wrote {}", args.output);
    Ok(())
}

fn run_benchmark(intensity: f64) -> Result<(), String> {
    use std::time::Instant;

    let sizes = [(50, 50), (100, 100), (200, 200)];
    let iterations = 20;
    let caster = NoiseCaster::default();

    // Fail before timing anything rather than measuring rejected casts
    caster
        .validate(sizes[0], (sizes[0].0 / 2, sizes[0].1 / 2), intensity)
        .map_err(|e| e.to_string())?;

    println!("=== Noise Cast Benchmark ===\n");

    for (width, height) in sizes {
        println!("Grid size: {}x{}, intensity {}", width, height, intensity);
        println!("-----------------------");

        let mut map: TileMap<u32> = TileMap::new(width, height);
        let origin = (width / 2, height / 2);

        // HashMap-backed tiles
        let start = Instant::now();
        for _ in 0..iterations {
            map.clear_noises();
            caster.cast(0, origin, intensity, &mut map).map_err(|e| e.to_string())?;
        }
        let avg_map_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        // Flat single-source layer
        let occlusion = map.occlusion_mask();
        let mut heard = 0;
        let start = Instant::now();
        for _ in 0..iterations {
            let mut layer = NoiseLayer::new(width, height, &occlusion);
            caster.cast(0u32, origin, intensity, &mut layer).map_err(|e| e.to_string())?;
            heard = layer.heard_count();
        }
        let avg_layer_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        if heard != map.heard_count(0) {
            warn!("Layer heard {} tiles, tile map {}", heard, map.heard_count(0));
        }

        println!("  Tile map:   {:.3} ms/iter", avg_map_ms);
        println!("  Flat layer: {:.3} ms/iter", avg_layer_ms);
        println!("  Speedup: {:.2}x", avg_map_ms / avg_layer_ms);
        println!();
    }

    println!("=== Many Sources ===");
    println!("(Simulates a turn where every creature makes a sound)\n");

    let (width, height) = (100, 100);
    let events: Vec<NoiseEvent<u32>> = (0..16u32)
        .map(|i| {
            let x = 10 + (i as usize % 4) * 25;
            let y = 10 + (i as usize / 4) * 25;
            NoiseEvent::new(i, (x, y), intensity)
        })
        .collect();

    let mut map: TileMap<u32> = TileMap::new(width, height);
    let start = Instant::now();
    for _ in 0..iterations {
        map.clear_noises();
        caster.cast_all(&events, &mut map).map_err(|e| e.to_string())?;
    }
    let avg_sequential_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

    let start = Instant::now();
    for _ in 0..iterations {
        map.clear_noises();
        caster.cast_parallel(&events, &mut map).map_err(|e| e.to_string())?;
    }
    let avg_parallel_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

    println!("Grid size: {}x{}, {} sources", width, height, events.len());
    println!("-----------------------");
    println!("  Sequential:        {:.3} ms/iter", avg_sequential_ms);
    println!("  Parallel (rayon):  {:.3} ms/iter", avg_parallel_ms);
    println!("  Speedup: {:.2}x", avg_sequential_ms / avg_parallel_ms);
    Ok(())
}

fn run_interactive(args: &Args) -> Result<(), String> {
    let config = ViewerConfig {
        grid_size: (args.width, args.height),
        intensity: args.intensity,
        ..ViewerConfig::default()
    };
    info!("Starting viewer at {}x{}", config.grid_size.0, config.grid_size.1);

    let mut viewer = InteractiveViewer::new(config).map_err(|e| format!("Failed to create viewer: {}", e))?;
    viewer.run()
}
