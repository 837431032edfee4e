//! Rendering and export of generated worlds
//!
//! PNG rendering of the label and scalar maps, ASCII views for the terminal
//! and a JSON dump. None of this feeds back into generation.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::WorldGenError;
use crate::rules::{Biome, Terrain};
use crate::tilemap::Tilemap;
use crate::world::WorldMapResult;

// =============================================================================
// COLORS
// =============================================================================

pub fn biome_color(biome: Biome) -> [u8; 3] {
    match biome {
        Biome::Ocean => [40, 90, 170],
        Biome::Desert => [222, 196, 132],
        Biome::Tundra => [196, 210, 214],
        Biome::Scorched => [92, 46, 34],
        Biome::Grassland => [112, 168, 74],
        Biome::Wasteland => [140, 128, 104],
    }
}

/// Color for a terrain feature; `None` for plain ground, which shows its biome.
pub fn terrain_color(terrain: Terrain) -> Option<[u8; 3]> {
    match terrain {
        Terrain::Ground => None,
        Terrain::Hills => Some([150, 130, 84]),
        Terrain::Lakes => Some([70, 140, 210]),
        Terrain::Forest => Some([34, 100, 40]),
        Terrain::Ruins => Some([180, 60, 160]),
        Terrain::Mountain => Some([110, 104, 100]),
        Terrain::Ocean => Some([30, 70, 150]),
    }
}

/// Ramp stops for scalar layers, evenly spaced over `[0, 1]`: deep blue at
/// the low end through teal, pale yellow and orange to dark red.
const SCALAR_RAMP: [[u8; 3]; 6] = [
    [48, 54, 140],
    [42, 140, 160],
    [120, 196, 120],
    [240, 232, 150],
    [236, 140, 64],
    [150, 28, 40],
];

fn scalar_color(t: f32) -> [u8; 3] {
    let segments = (SCALAR_RAMP.len() - 1) as f32;
    let pos = t.clamp(0.0, 1.0) * segments;
    let i = (pos as usize).min(SCALAR_RAMP.len() - 2);
    let frac = pos - i as f32;

    let (lo, hi) = (SCALAR_RAMP[i], SCALAR_RAMP[i + 1]);
    std::array::from_fn(|c| (lo[c] as f32 + (hi[c] as f32 - lo[c] as f32) * frac).round() as u8)
}

// =============================================================================
// IMAGES
// =============================================================================

fn render_with<T>(map: &Tilemap<T>, mut color: impl FnMut(usize, usize, &T) -> [u8; 3]) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(map.width as u32, map.height as u32);
    for (x, y, value) in map.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(color(x, y, value)));
    }
    img
}

pub fn render_biome_map(biomes: &Tilemap<Biome>) -> RgbImage {
    render_with(biomes, |_, _, &biome| biome_color(biome))
}

/// Terrain features drawn over their biome colors.
pub fn render_terrain_map(terrain: &Tilemap<Terrain>, biomes: &Tilemap<Biome>) -> RgbImage {
    render_with(terrain, |x, y, &feature| {
        terrain_color(feature).unwrap_or_else(|| biome_color(*biomes.get(x, y)))
    })
}

/// A `[0, 1]` scalar map through the scalar color ramp.
pub fn render_scalar_map(values: &Tilemap<f32>) -> RgbImage {
    render_with(values, |_, _, &v| scalar_color(v))
}

pub fn export_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<(), WorldGenError> {
    img.save(path)?;
    Ok(())
}

/// Write `<prefix>_biomes.png`, `_terrain`, `_elevation`, `_temperature` and
/// `_moisture`. Returns the paths written.
pub fn export_world_pngs(world: &WorldMapResult, prefix: &str) -> Result<Vec<PathBuf>, WorldGenError> {
    let layers = [
        ("biomes", render_biome_map(&world.biomes)),
        ("terrain", render_terrain_map(&world.terrain, &world.biomes)),
        ("elevation", render_scalar_map(&world.elevation)),
        ("temperature", render_scalar_map(&world.temperature)),
        ("moisture", render_scalar_map(&world.moisture)),
    ];

    let mut written = Vec::with_capacity(layers.len());
    for (name, img) in layers {
        let path = PathBuf::from(format!("{prefix}_{name}.png"));
        export_png(&img, &path)?;
        written.push(path);
    }
    Ok(written)
}

// =============================================================================
// ASCII
// =============================================================================

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AsciiMode {
    Biome,
    Terrain,
}

pub fn biome_char(biome: Biome) -> char {
    match biome {
        Biome::Ocean => '~',
        Biome::Desert => 'd',
        Biome::Tundra => 't',
        Biome::Scorched => 's',
        Biome::Grassland => '.',
        Biome::Wasteland => 'w',
    }
}

pub fn terrain_char(terrain: Terrain) -> char {
    match terrain {
        Terrain::Ground => '.',
        Terrain::Hills => 'n',
        Terrain::Lakes => 'o',
        Terrain::Forest => 'T',
        Terrain::Ruins => 'R',
        Terrain::Mountain => '^',
        Terrain::Ocean => '~',
    }
}

/// One character per cell, one line per row.
pub fn render_ascii_map(world: &WorldMapResult, mode: AsciiMode) -> String {
    let mut result = String::with_capacity((world.width + 1) * world.height);

    for y in 0..world.height {
        for x in 0..world.width {
            let ch = match mode {
                AsciiMode::Biome => biome_char(*world.biomes.get(x, y)),
                AsciiMode::Terrain => terrain_char(*world.terrain.get(x, y)),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

pub fn ascii_legend(mode: AsciiMode) -> String {
    let entries: Vec<String> = match mode {
        AsciiMode::Biome => Biome::ALL.iter().map(|&b| format!("{} {}", biome_char(b), b)).collect(),
        AsciiMode::Terrain => Terrain::ALL.iter().map(|&t| format!("{} {}", terrain_char(t), t)).collect(),
    };
    entries.join("  ")
}

// =============================================================================
// JSON
// =============================================================================

/// Dump the whole result (seeds and all five grids) as JSON.
pub fn export_json(world: &WorldMapResult, path: impl AsRef<Path>) -> Result<(), WorldGenError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, world)?;
    Ok(())
}
