use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use hexmap_generator::export::{self, AsciiMode};
use hexmap_generator::{BiomeRules, WorldGenError, WorldGenerator};

#[derive(Parser, Debug)]
#[command(name = "hexmap_generator")]
#[command(about = "Generate procedural hex-tile worlds: climate, biomes and terrain features")]
struct Args {
    /// Width of the map in cells
    #[arg(short = 'W', long, default_value = "100")]
    width: usize,

    /// Height of the map in cells
    #[arg(short = 'H', long, default_value = "80")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load biome/terrain rule tables from a JSON file
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Write the active rule tables to a JSON file
    #[arg(long)]
    dump_rules: Option<PathBuf>,

    /// Export PNG layers as <prefix>_biomes.png, <prefix>_terrain.png, ...
    #[arg(long)]
    png_prefix: Option<String>,

    /// Export the whole world as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print the map as ASCII
    #[arg(long)]
    ascii: bool,

    /// Which layer the ASCII view shows
    #[arg(long, value_enum, default_value = "terrain")]
    mode: AsciiMode,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), WorldGenError> {
    let rules = match &args.rules {
        Some(path) => BiomeRules::from_json_file(path)?,
        None => BiomeRules::standard(),
    };

    if let Some(path) = &args.dump_rules {
        rules.to_json_file(path)?;
        println!("Rule tables written to {}", path.display());
    }

    let generator = WorldGenerator::new(args.width, args.height, args.seed)?.with_rules(rules);
    println!("Generating world with seed: {}", generator.seeds().master);
    println!("Map size: {}x{}", args.width, args.height);

    let world = generator.generate();

    let cells = (world.width * world.height) as f64;
    println!("Biomes:");
    for (biome, count) in world.biome_counts() {
        println!("  {:<10} {:>6} ({:.1}%)", biome, count, 100.0 * count as f64 / cells);
    }
    println!("Terrain:");
    for (terrain, count) in world.terrain_counts() {
        println!("  {:<10} {:>6} ({:.1}%)", terrain, count, 100.0 * count as f64 / cells);
    }

    if let Some(prefix) = &args.png_prefix {
        for path in export::export_world_pngs(&world, prefix)? {
            println!("Exported {}", path.display());
        }
    }

    if let Some(path) = &args.json {
        export::export_json(&world, path)?;
        println!("Exported {}", path.display());
    }

    if args.ascii {
        println!();
        print!("{}", export::render_ascii_map(&world, args.mode));
        println!("{}", export::ascii_legend(args.mode));
    }

    Ok(())
}
