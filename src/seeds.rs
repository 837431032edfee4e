//! Seed management for world generation
//!
//! Each generation stage draws from its own seed, derived from a master seed,
//! so the noise streams never correlate and every random decision downstream
//! of the master seed is reproducible.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for all world generation stages.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Elevation noise field
    pub elevation: u64,
    /// Temperature noise field
    pub temperature: u64,
    /// Moisture noise field
    pub moisture: u64,
    /// Biome classification and its ruin corruption pass
    pub biomes: u64,
    /// Terrain feature placement and its ruin pass
    pub terrain: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            elevation: derive_seed(master, "elevation"),
            temperature: derive_seed(master, "temperature"),
            moisture: derive_seed(master, "moisture"),
            biomes: derive_seed(master, "biomes"),
            terrain: derive_seed(master, "terrain"),
        }
    }

    /// Master seed picked at random.
    pub fn random() -> Self {
        Self::from_master(rand::random())
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }
}

/// Builder for overriding individual seeds while deriving the rest from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    pub fn elevation(mut self, seed: u64) -> Self {
        self.seeds.elevation = seed;
        self
    }

    pub fn temperature(mut self, seed: u64) -> Self {
        self.seeds.temperature = seed;
        self
    }

    pub fn moisture(mut self, seed: u64) -> Self {
        self.seeds.moisture = seed;
        self
    }

    pub fn biomes(mut self, seed: u64) -> Self {
        self.seeds.biomes = seed;
        self
    }

    pub fn terrain(mut self, seed: u64) -> Self {
        self.seeds.terrain = seed;
        self
    }

    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, elevation: {}, temperature: {}, moisture: {}, biomes: {}, terrain: {} }}",
            self.master, self.elevation, self.temperature, self.moisture, self.biomes, self.terrain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = WorldSeeds::from_master(12345);
        let seeds2 = WorldSeeds::from_master(12345);
        assert_eq!(seeds1, seeds2);
    }

    #[test]
    fn test_noise_streams_are_independent() {
        let seeds = WorldSeeds::from_master(42);
        assert_ne!(seeds.elevation, seeds.temperature);
        assert_ne!(seeds.temperature, seeds.moisture);
        assert_ne!(seeds.elevation, seeds.moisture);
        assert_ne!(seeds.biomes, seeds.terrain);
    }

    #[test]
    fn test_builder_override() {
        let seeds = WorldSeeds::builder(12345).terrain(99999).build();
        assert_eq!(seeds.terrain, 99999);

        let default_seeds = WorldSeeds::from_master(12345);
        assert_eq!(seeds.elevation, default_seeds.elevation);
        assert_eq!(seeds.biomes, default_seeds.biomes);
    }
}
