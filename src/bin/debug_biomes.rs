//! Debug script to dump biomes and terrain as ASCII, with statistics

use std::fs::File;
use std::io::{BufWriter, Write};

use hexmap_generator::export::{ascii_legend, render_ascii_map, AsciiMode};
use hexmap_generator::{Biome, WorldGenError, WorldGenerator};

fn main() -> Result<(), WorldGenError> {
    let width = 128;
    let height = 64;
    let seed = 12345u64;

    let world = WorldGenerator::new(width, height, Some(seed))?.generate();

    let mut file = BufWriter::new(File::create("biome_debug.txt")?);

    writeln!(file, "=== BIOME DEBUG MAP ({}x{}) seed={} ===", width, height, seed)?;
    writeln!(file)?;

    for (title, mode) in [("BIOME MAP", AsciiMode::Biome), ("TERRAIN MAP", AsciiMode::Terrain)] {
        writeln!(file, "{}:", title)?;
        writeln!(file, "  {}", ascii_legend(mode))?;
        write!(file, "{}", render_ascii_map(&world, mode))?;
        writeln!(file)?;
    }

    let total = (width * height) as f32;

    writeln!(file, "=== BIOME STATISTICS ===")?;
    let mut biome_counts: Vec<_> = world.biome_counts().into_iter().collect();
    biome_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (biome, count) in biome_counts {
        writeln!(file, "  {:12} {:5} ({:5.1}%)", biome, count, count as f32 / total * 100.0)?;
    }

    writeln!(file)?;
    writeln!(file, "=== TERRAIN STATISTICS ===")?;
    for (terrain, count) in world.terrain_counts() {
        writeln!(file, "  {:12} {:5} ({:5.1}%)", terrain, count, count as f32 / total * 100.0)?;
    }

    // Land only
    let land: Vec<(usize, usize)> = world
        .biomes
        .iter()
        .filter(|(_, _, &b)| b != Biome::Ocean)
        .map(|(x, y, _)| (x, y))
        .collect();

    for (title, map) in [("MOISTURE", &world.moisture), ("TEMPERATURE", &world.temperature)] {
        writeln!(file)?;
        writeln!(file, "=== {} STATISTICS (land only) ===", title)?;
        let mut values: Vec<f32> = land.iter().map(|&(x, y)| *map.get(x, y)).collect();
        if values.is_empty() {
            writeln!(file, "  (no land)")?;
            continue;
        }
        values.sort_by(f32::total_cmp);
        let mean: f32 = values.iter().sum::<f32>() / values.len() as f32;

        writeln!(file, "  Min:    {:.3}", values[0])?;
        writeln!(file, "  Q1:     {:.3}", values[values.len() / 4])?;
        writeln!(file, "  Median: {:.3}", values[values.len() / 2])?;
        writeln!(file, "  Mean:   {:.3}", mean)?;
        writeln!(file, "  Q3:     {:.3}", values[3 * values.len() / 4])?;
        writeln!(file, "  Max:    {:.3}", values[values.len() - 1])?;
    }

    writeln!(file)?;
    writeln!(file, "=== SAMPLE CELLS ===")?;
    let samples = [(16, 32), (32, 64), (48, 96), (8, 64), (56, 64), (30, 20), (40, 100)];
    for (row, col) in samples {
        if let Some(info) = world.tile_info(row, col) {
            writeln!(
                file,
                "  ({:3},{:3}): e={:.3}, t={}, m={} => {} / {}",
                row,
                col,
                info.elevation,
                info.temperature_str(),
                info.moisture_str(),
                info.biome,
                info.terrain
            )?;
        }
    }

    file.flush()?;
    println!("Wrote biome_debug.txt");
    Ok(())
}
