//! Hex-map world generation library
//!
//! Climate synthesis, biome classification and terrain feature placement for
//! a rectangular grid, plus export helpers used by the binaries.

pub mod biomes;
pub mod climate;
pub mod error;
pub mod export;
pub mod noise_field;
pub mod rules;
pub mod ruins;
pub mod seeds;
pub mod terrain;
pub mod tilemap;
pub mod world;

pub use error::WorldGenError;
pub use rules::{Biome, BiomeRules, Terrain};
pub use world::{CellView, WorldGenerator, WorldMapResult, WorldSlot};
