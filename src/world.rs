//! World generation entry point and result container
//!
//! `WorldGenerator` runs the pipeline (climate, biomes, terrain) and hands back
//! a `WorldMapResult` that the caller owns outright.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::biomes;
use crate::climate;
use crate::error::WorldGenError;
use crate::noise_field::{FieldSource, FractalNoise};
use crate::rules::{Biome, BiomeRules, Terrain};
use crate::seeds::WorldSeeds;
use crate::terrain;
use crate::tilemap::Tilemap;

/// Configured world generator. Generation itself is total; only construction can fail.
pub struct WorldGenerator {
    width: usize,
    height: usize,
    seeds: WorldSeeds,
    rules: BiomeRules,
    source: Arc<dyn FieldSource>,
}

impl WorldGenerator {
    /// Generator for a `width` x `height` world. Without a seed a random master
    /// seed is picked.
    pub fn new(width: usize, height: usize, seed: Option<u64>) -> Result<Self, WorldGenError> {
        if width == 0 || height == 0 {
            return Err(WorldGenError::InvalidDimensions { width, height });
        }

        let seeds = match seed {
            Some(master) => WorldSeeds::from_master(master),
            None => WorldSeeds::random(),
        };

        Ok(Self {
            width,
            height,
            seeds,
            rules: BiomeRules::standard(),
            source: Arc::new(FractalNoise),
        })
    }

    pub fn with_rules(mut self, rules: BiomeRules) -> Self {
        rules.warn_missing_entries();
        self.rules = rules;
        self
    }

    pub fn with_seeds(mut self, seeds: WorldSeeds) -> Self {
        self.seeds = seeds;
        self
    }

    /// Replace the noise source (tests use flat or hand-built fields).
    pub fn with_field_source(mut self, source: impl FieldSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }

    pub fn rules(&self) -> &BiomeRules {
        &self.rules
    }

    /// Build a complete world. Same seeds and rules give the same world.
    pub fn generate(&self) -> WorldMapResult {
        let start = Instant::now();
        let (width, height) = (self.width, self.height);
        info!(width, height, seed = self.seeds.master, "generating world");

        let climate = climate::synthesize_climate(width, height, &self.seeds, self.source.as_ref());
        info!("climate synthesized");

        let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.biomes);
        let classification = biomes::classify_biomes(&climate, &mut rng);
        info!(ruin_sites = classification.ruin_sites.len(), "biomes classified");

        let mut biome_map = classification.biomes;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.terrain);
        let placement = terrain::place_terrain_features(&mut biome_map, &climate, &self.rules, &mut rng);
        info!(ruin_sites = placement.ruin_sites.len(), "terrain features placed");

        let world = WorldMapResult {
            width,
            height,
            seeds: self.seeds.clone(),
            elevation: climate.elevation,
            temperature: climate.temperature,
            moisture: climate.moisture,
            biomes: biome_map,
            terrain: placement.terrain,
        };

        let land = world.biomes.iter().filter(|(_, _, &b)| b != Biome::Ocean).count();
        info!(
            land_fraction = land as f64 / (width * height) as f64,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "world generated"
        );

        world
    }
}

/// All generated world data. Coordinates are `(row, col)` at this surface.
#[derive(Clone, Debug, Serialize)]
pub struct WorldMapResult {
    pub width: usize,
    pub height: usize,
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub elevation: Tilemap<f32>,
    pub temperature: Tilemap<f32>,
    pub moisture: Tilemap<f32>,
    pub biomes: Tilemap<Biome>,
    pub terrain: Tilemap<Terrain>,
}

/// What a renderer needs for one cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellView {
    pub biome: Biome,
    pub terrain: Terrain,
    pub elevation: f32,
}

/// Everything known about a single cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileInfo {
    pub row: usize,
    pub col: usize,
    pub elevation: f32,
    pub temperature: f32,
    pub moisture: f32,
    pub biome: Biome,
    pub terrain: Terrain,
}

impl TileInfo {
    pub fn moisture_str(&self) -> String {
        let desc = if self.moisture < 0.2 {
            "arid"
        } else if self.moisture < 0.4 {
            "dry"
        } else if self.moisture < 0.6 {
            "moderate"
        } else if self.moisture < 0.8 {
            "wet"
        } else {
            "saturated"
        };
        format!("{:.2} ({})", self.moisture, desc)
    }

    pub fn temperature_str(&self) -> String {
        let desc = if self.temperature < 0.25 {
            "cold"
        } else if self.temperature > 0.7 {
            "hot"
        } else {
            "temperate"
        };
        format!("{:.2} ({})", self.temperature, desc)
    }
}

impl WorldMapResult {
    /// Convenience accessor for master seed
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    /// Read-only renderer accessor; `None` outside the grid.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellView> {
        Some(CellView {
            biome: *self.biomes.try_get(col, row)?,
            terrain: *self.terrain.get(col, row),
            elevation: *self.elevation.get(col, row),
        })
    }

    pub fn tile_info(&self, row: usize, col: usize) -> Option<TileInfo> {
        let elevation = *self.elevation.try_get(col, row)?;
        Some(TileInfo {
            row,
            col,
            elevation,
            temperature: *self.temperature.get(col, row),
            moisture: *self.moisture.get(col, row),
            biome: *self.biomes.get(col, row),
            terrain: *self.terrain.get(col, row),
        })
    }

    /// Cell count per biome present on the map.
    pub fn biome_counts(&self) -> BTreeMap<Biome, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, &biome) in self.biomes.iter() {
            *counts.entry(biome).or_insert(0) += 1;
        }
        counts
    }

    /// Cell count per terrain feature present on the map.
    pub fn terrain_counts(&self) -> BTreeMap<Terrain, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, &terrain) in self.terrain.iter() {
            *counts.entry(terrain).or_insert(0) += 1;
        }
        counts
    }
}

// =============================================================================
// PUBLISHING
// =============================================================================

/// Shared slot holding the world a renderer currently draws.
///
/// New worlds are built privately and swapped in whole, so readers only ever
/// see a complete result.
#[derive(Debug, Default)]
pub struct WorldSlot {
    current: RwLock<Option<Arc<WorldMapResult>>>,
}

impl WorldSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<WorldMapResult>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Swap in a finished world, returning the one it replaced.
    pub fn publish(&self, world: WorldMapResult) -> Option<Arc<WorldMapResult>> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(Arc::new(world))
    }

    /// Generate a new world outside the lock and publish it.
    pub fn regenerate(&self, generator: &WorldGenerator) -> Arc<WorldMapResult> {
        let world = Arc::new(generator.generate());
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&world));
        world
    }
}
