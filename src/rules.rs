//! Biome and terrain rule tables
//!
//! Static, versionable configuration read by both the biome classifier and
//! the terrain feature placer. Tables are indexed by enum; an absent entry is
//! a lookup miss that callers treat as "rule absent", never as an error.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::WorldGenError;

/// Elevation below which `get_possible_biomes` only offers Ocean.
pub const OCEAN_BIOME_THRESHOLD: f32 = 0.2;

/// Weight returned for pairs a table does not list.
const DEFAULT_WEIGHT: f32 = 0.1;

// =============================================================================
// LABELS
// =============================================================================

/// Macro-climate classification of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    Desert,
    Tundra,
    Scorched,
    Grassland,
    Wasteland,
}

impl Biome {
    pub const COUNT: usize = 6;

    pub const ALL: [Biome; Biome::COUNT] = [
        Biome::Ocean,
        Biome::Desert,
        Biome::Tundra,
        Biome::Scorched,
        Biome::Grassland,
        Biome::Wasteland,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Biome::Ocean => "Ocean",
            Biome::Desert => "Desert",
            Biome::Tundra => "Tundra",
            Biome::Scorched => "Scorched",
            Biome::Grassland => "Grassland",
            Biome::Wasteland => "Wasteland",
        }
    }
}

/// Micro-feature classification layered on top of a biome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    Ground,
    Hills,
    Lakes,
    Forest,
    Ruins,
    Mountain,
    Ocean,
}

impl Terrain {
    pub const COUNT: usize = 7;

    pub const ALL: [Terrain; Terrain::COUNT] = [
        Terrain::Ground,
        Terrain::Hills,
        Terrain::Lakes,
        Terrain::Forest,
        Terrain::Ruins,
        Terrain::Mountain,
        Terrain::Ocean,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Ground => "Ground",
            Terrain::Hills => "Hills",
            Terrain::Lakes => "Lakes",
            Terrain::Forest => "Forest",
            Terrain::Ruins => "Ruins",
            Terrain::Mountain => "Mountain",
            Terrain::Ocean => "Ocean",
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Unknown biome or terrain label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseLabelError {
    #[error("unknown biome '{0}'")]
    Biome(String),
    #[error("unknown terrain '{0}'")]
    Terrain(String),
}

impl FromStr for Biome {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Biome::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError::Biome(s.to_string()))
    }
}

impl FromStr for Terrain {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError::Terrain(s.to_string()))
    }
}

// =============================================================================
// RULE ENTRIES
// =============================================================================

/// Climate envelope and weights for one biome. Ranges are inclusive `(min, max)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeRuleEntry {
    pub temperature_range: (f32, f32),
    pub moisture_range: (f32, f32),
    pub elevation_range: (f32, f32),
    /// Terrain features this biome may carry
    pub valid_terrains: Vec<Terrain>,
    #[serde(default)]
    pub terrain_weights: BTreeMap<Terrain, f32>,
    #[serde(default)]
    pub neighbor_weights: BTreeMap<Biome, f32>,
}

impl BiomeRuleEntry {
    pub fn admits(&self, temperature: f32, moisture: f32, elevation: f32) -> bool {
        within(self.temperature_range, temperature)
            && within(self.moisture_range, moisture)
            && within(self.elevation_range, elevation)
    }
}

/// Placement rule for one terrain feature
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRuleEntry {
    /// Chance of the feature firing on an eligible cell
    pub base_chance: f64,
    #[serde(default)]
    pub elevation_min: Option<f32>,
    #[serde(default)]
    pub elevation_max: Option<f32>,
    #[serde(default)]
    pub moisture_min: Option<f32>,
    /// Descriptive minimum spacing; clustering takes precedence during placement
    #[serde(default)]
    pub min_spacing: u32,
    /// Raised chance when a Moore neighbour already holds the feature
    #[serde(default)]
    pub cluster_chance: Option<f64>,
    /// Biomes the feature is restricted to (unrestricted when absent)
    #[serde(default)]
    pub valid_biomes: Option<Vec<Biome>>,
    /// Maximum number of cells the feature may claim per world
    #[serde(default)]
    pub max_count: Option<usize>,
}

impl TerrainRuleEntry {
    /// Whether a cell passes this rule's biome and threshold requirements.
    pub fn admits(&self, biome: Biome, elevation: f32, moisture: f32) -> bool {
        if let Some(valid) = &self.valid_biomes {
            if !valid.contains(&biome) {
                return false;
            }
        }
        if self.elevation_min.is_some_and(|min| elevation < min) {
            return false;
        }
        if self.elevation_max.is_some_and(|max| elevation > max) {
            return false;
        }
        if self.moisture_min.is_some_and(|min| moisture < min) {
            return false;
        }
        true
    }

    /// Chance to roll for a cell, given whether a neighbour already holds the feature.
    pub fn chance(&self, neighbor_has_feature: bool) -> f64 {
        match self.cluster_chance {
            Some(cluster) if neighbor_has_feature => self.base_chance.max(cluster),
            _ => self.base_chance,
        }
    }
}

fn within((min, max): (f32, f32), value: f32) -> bool {
    value >= min && value <= max
}

// =============================================================================
// RULE TABLES
// =============================================================================

/// Serialized layout: two maps keyed by label. Missing keys are allowed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RuleTables {
    #[serde(default)]
    biomes: BTreeMap<Biome, BiomeRuleEntry>,
    #[serde(default)]
    terrains: BTreeMap<Terrain, TerrainRuleEntry>,
}

/// Rule tables indexed by enum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleTables", into = "RuleTables")]
pub struct BiomeRules {
    biomes: [Option<BiomeRuleEntry>; Biome::COUNT],
    terrains: [Option<TerrainRuleEntry>; Terrain::COUNT],
}

impl From<RuleTables> for BiomeRules {
    fn from(tables: RuleTables) -> Self {
        let mut rules = BiomeRules::empty();
        for (biome, entry) in tables.biomes {
            rules.set_biome_rule(biome, entry);
        }
        for (terrain, entry) in tables.terrains {
            rules.set_terrain_rule(terrain, entry);
        }
        rules
    }
}

impl From<BiomeRules> for RuleTables {
    fn from(rules: BiomeRules) -> Self {
        let biomes = Biome::ALL
            .into_iter()
            .zip(rules.biomes)
            .filter_map(|(b, e)| e.map(|e| (b, e)))
            .collect();
        let terrains = Terrain::ALL
            .into_iter()
            .zip(rules.terrains)
            .filter_map(|(t, e)| e.map(|e| (t, e)))
            .collect();
        RuleTables { biomes, terrains }
    }
}

impl Default for BiomeRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl BiomeRules {
    /// Tables with no entries at all; every lookup misses.
    pub fn empty() -> Self {
        Self {
            biomes: Default::default(),
            terrains: Default::default(),
        }
    }

    /// The stock tables (6 biomes, 7 terrains).
    pub fn standard() -> Self {
        Self {
            biomes: Biome::ALL.map(|b| Some(standard_biome_rule(b))),
            terrains: Terrain::ALL.map(|t| Some(standard_terrain_rule(t))),
        }
    }

    /// Load tables from a JSON file. Partial tables are accepted.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WorldGenError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), WorldGenError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn biome_rule(&self, biome: Biome) -> Option<&BiomeRuleEntry> {
        self.biomes[biome.index()].as_ref()
    }

    pub fn terrain_rule(&self, terrain: Terrain) -> Option<&TerrainRuleEntry> {
        self.terrains[terrain.index()].as_ref()
    }

    pub fn set_biome_rule(&mut self, biome: Biome, entry: BiomeRuleEntry) {
        self.biomes[biome.index()] = Some(entry);
    }

    pub fn set_terrain_rule(&mut self, terrain: Terrain, entry: TerrainRuleEntry) {
        self.terrains[terrain.index()] = Some(entry);
    }

    pub fn remove_biome_rule(&mut self, biome: Biome) -> Option<BiomeRuleEntry> {
        self.biomes[biome.index()].take()
    }

    pub fn remove_terrain_rule(&mut self, terrain: Terrain) -> Option<TerrainRuleEntry> {
        self.terrains[terrain.index()].take()
    }

    /// Labels with no table entry.
    pub fn missing_entries(&self) -> (Vec<Biome>, Vec<Terrain>) {
        let biomes = Biome::ALL.into_iter().filter(|b| self.biome_rule(*b).is_none()).collect();
        let terrains = Terrain::ALL.into_iter().filter(|t| self.terrain_rule(*t).is_none()).collect();
        (biomes, terrains)
    }

    /// Log every gap in the tables. Gaps degrade generation, they do not stop it.
    pub fn warn_missing_entries(&self) {
        let (biomes, terrains) = self.missing_entries();
        for biome in biomes {
            warn!(%biome, "no biome rule entry; its cells will carry plain ground");
        }
        for terrain in terrains {
            warn!(%terrain, "no terrain rule entry; the feature will never be placed");
        }
    }

    /// Biomes whose envelope contains the sample; Ocean alone below the ocean threshold.
    pub fn get_possible_biomes(&self, temperature: f32, moisture: f32, elevation: f32) -> Vec<Biome> {
        if elevation < OCEAN_BIOME_THRESHOLD {
            return vec![Biome::Ocean];
        }

        let possible: Vec<Biome> = Biome::ALL
            .into_iter()
            .filter(|&b| b != Biome::Ocean)
            .filter(|&b| {
                self.biome_rule(b)
                    .is_some_and(|rule| rule.admits(temperature, moisture, elevation))
            })
            .collect();

        if possible.is_empty() {
            vec![Biome::Wasteland]
        } else {
            possible
        }
    }

    /// Terrain features a biome may carry; plain ground when the biome has no entry.
    pub fn get_valid_terrain_types(&self, biome: Biome) -> &[Terrain] {
        match self.biome_rule(biome) {
            Some(rule) => &rule.valid_terrains,
            None => &[Terrain::Ground],
        }
    }

    pub fn is_valid_terrain_for_biome(&self, terrain: Terrain, biome: Biome) -> bool {
        self.biome_rule(biome)
            .is_some_and(|rule| rule.valid_terrains.contains(&terrain))
    }

    pub fn get_terrain_weight(&self, biome: Biome, terrain: Terrain) -> f32 {
        if !self.is_valid_terrain_for_biome(terrain, biome) {
            return 0.0;
        }
        self.biome_rule(biome)
            .and_then(|rule| rule.terrain_weights.get(&terrain).copied())
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn get_neighbor_weight(&self, current: Biome, neighbor: Biome) -> f32 {
        self.biome_rule(current)
            .and_then(|rule| rule.neighbor_weights.get(&neighbor).copied())
            .unwrap_or(DEFAULT_WEIGHT)
    }
}

// =============================================================================
// STANDARD TABLE DATA
// =============================================================================

fn standard_biome_rule(biome: Biome) -> BiomeRuleEntry {
    use Terrain as T;

    let (temperature_range, moisture_range, elevation_range, valid_terrains, terrain_weights, neighbor_weights) =
        match biome {
            Biome::Ocean => (
                (0.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.2),
                vec![T::Ocean],
                vec![(T::Ocean, 1.0)],
                vec![(Biome::Ocean, 1.5), (Biome::Grassland, 0.4), (Biome::Desert, 0.3)],
            ),
            Biome::Desert => (
                (0.6, 1.0),
                (0.0, 0.3),
                (0.2, 0.5),
                vec![T::Ground, T::Hills, T::Forest, T::Ruins],
                vec![(T::Ground, 0.8), (T::Hills, 0.2)],
                vec![(Biome::Desert, 1.5), (Biome::Grassland, 0.5), (Biome::Wasteland, 0.3)],
            ),
            Biome::Tundra => (
                (0.0, 0.25),
                (0.4, 0.7),
                (0.4, 0.8),
                vec![T::Ground, T::Hills, T::Forest, T::Lakes, T::Ruins],
                vec![(T::Ground, 0.6), (T::Hills, 0.2), (T::Forest, 0.1), (T::Lakes, 0.1)],
                vec![(Biome::Tundra, 1.5), (Biome::Grassland, 0.5)],
            ),
            Biome::Scorched => (
                (0.8, 1.0),
                (0.0, 0.2),
                (0.4, 0.6),
                vec![T::Ground, T::Mountain, T::Ruins, T::Forest, T::Lakes, T::Hills],
                vec![(T::Ground, 0.7), (T::Mountain, 0.2), (T::Ruins, 0.1)],
                vec![(Biome::Scorched, 1.0), (Biome::Wasteland, 0.6), (Biome::Desert, 0.4)],
            ),
            Biome::Grassland => (
                (0.3, 0.7),
                (0.4, 0.8),
                (0.2, 0.6),
                vec![T::Ground, T::Hills, T::Forest, T::Lakes, T::Ruins, T::Mountain],
                vec![(T::Ground, 0.6), (T::Forest, 0.3), (T::Hills, 0.1)],
                vec![(Biome::Grassland, 1.5), (Biome::Desert, 0.6), (Biome::Wasteland, 0.2)],
            ),
            Biome::Wasteland => (
                (0.5, 0.8),
                (0.1, 0.3),
                (0.3, 0.5),
                vec![T::Ground, T::Hills, T::Ruins, T::Forest, T::Lakes, T::Mountain],
                vec![(T::Ground, 0.7), (T::Hills, 0.2), (T::Ruins, 0.1)],
                vec![(Biome::Wasteland, 1.0), (Biome::Desert, 0.7), (Biome::Grassland, 0.5)],
            ),
        };

    BiomeRuleEntry {
        temperature_range,
        moisture_range,
        elevation_range,
        valid_terrains,
        terrain_weights: terrain_weights.into_iter().collect(),
        neighbor_weights: neighbor_weights.into_iter().collect(),
    }
}

fn standard_terrain_rule(terrain: Terrain) -> TerrainRuleEntry {
    use Biome as B;

    let base = TerrainRuleEntry {
        base_chance: 0.0,
        elevation_min: None,
        elevation_max: None,
        moisture_min: None,
        min_spacing: 0,
        cluster_chance: None,
        valid_biomes: None,
        max_count: None,
    };

    match terrain {
        Terrain::Ground => TerrainRuleEntry {
            base_chance: 0.6,
            valid_biomes: Some(vec![B::Desert, B::Tundra, B::Scorched, B::Grassland, B::Wasteland]),
            ..base
        },
        Terrain::Hills => TerrainRuleEntry {
            base_chance: 0.3,
            elevation_min: Some(0.4),
            min_spacing: 2,
            cluster_chance: Some(0.6),
            valid_biomes: Some(vec![B::Desert, B::Tundra, B::Grassland, B::Wasteland]),
            ..base
        },
        Terrain::Lakes => TerrainRuleEntry {
            base_chance: 0.15,
            moisture_min: Some(0.5),
            min_spacing: 3,
            valid_biomes: Some(vec![B::Tundra, B::Grassland]),
            ..base
        },
        Terrain::Forest => TerrainRuleEntry {
            base_chance: 0.25,
            moisture_min: Some(0.4),
            min_spacing: 1,
            cluster_chance: Some(0.5),
            valid_biomes: Some(vec![B::Tundra, B::Grassland]),
            ..base
        },
        Terrain::Ruins => TerrainRuleEntry {
            base_chance: 0.03,
            min_spacing: 15,
            max_count: Some(3),
            valid_biomes: Some(vec![B::Desert, B::Scorched, B::Grassland, B::Wasteland]),
            ..base
        },
        Terrain::Mountain => TerrainRuleEntry {
            base_chance: 0.2,
            elevation_min: Some(0.7),
            min_spacing: 2,
            cluster_chance: Some(0.7),
            valid_biomes: Some(vec![B::Tundra, B::Scorched]),
            ..base
        },
        Terrain::Ocean => TerrainRuleEntry {
            base_chance: 1.0,
            elevation_max: Some(0.2),
            valid_biomes: Some(vec![B::Ocean]),
            ..base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_are_complete() {
        let rules = BiomeRules::standard();
        let (biomes, terrains) = rules.missing_entries();
        assert!(biomes.is_empty());
        assert!(terrains.is_empty());
    }

    #[test]
    fn test_possible_biomes() {
        let rules = BiomeRules::standard();

        assert_eq!(rules.get_possible_biomes(0.9, 0.1, 0.1), vec![Biome::Ocean]);

        // Hot and dry mid-elevation: desert and scorched envelopes both match
        let hot = rules.get_possible_biomes(0.9, 0.1, 0.45);
        assert!(hot.contains(&Biome::Desert));
        assert!(hot.contains(&Biome::Scorched));
        assert!(!hot.contains(&Biome::Ocean));

        // Nothing matches: fall back to wasteland
        assert_eq!(rules.get_possible_biomes(0.1, 0.1, 0.95), vec![Biome::Wasteland]);
        assert_eq!(BiomeRules::empty().get_possible_biomes(0.5, 0.5, 0.5), vec![Biome::Wasteland]);
    }

    #[test]
    fn test_valid_terrain_lookup_misses_fall_back_to_ground() {
        let mut rules = BiomeRules::standard();
        assert!(rules.get_valid_terrain_types(Biome::Grassland).contains(&Terrain::Forest));

        rules.remove_biome_rule(Biome::Grassland);
        assert_eq!(rules.get_valid_terrain_types(Biome::Grassland), &[Terrain::Ground]);
        assert!(!rules.is_valid_terrain_for_biome(Terrain::Ground, Biome::Grassland));
    }

    #[test]
    fn test_weights() {
        let rules = BiomeRules::standard();

        assert_eq!(rules.get_terrain_weight(Biome::Desert, Terrain::Ground), 0.8);
        // Valid but unweighted
        assert_eq!(rules.get_terrain_weight(Biome::Desert, Terrain::Ruins), 0.1);
        // Not valid for the biome
        assert_eq!(rules.get_terrain_weight(Biome::Desert, Terrain::Lakes), 0.0);

        assert_eq!(rules.get_neighbor_weight(Biome::Ocean, Biome::Ocean), 1.5);
        assert_eq!(rules.get_neighbor_weight(Biome::Ocean, Biome::Tundra), 0.1);
        assert_eq!(BiomeRules::empty().get_neighbor_weight(Biome::Desert, Biome::Desert), 0.1);
    }

    #[test]
    fn test_terrain_rule_admits_and_cluster_chance() {
        let rules = BiomeRules::standard();
        let hills = rules.terrain_rule(Terrain::Hills).unwrap();

        assert!(hills.admits(Biome::Grassland, 0.5, 0.0));
        assert!(!hills.admits(Biome::Grassland, 0.3, 0.0));
        assert!(!hills.admits(Biome::Scorched, 0.9, 0.9));

        assert_eq!(hills.chance(false), 0.3);
        assert_eq!(hills.chance(true), 0.6);

        let lakes = rules.terrain_rule(Terrain::Lakes).unwrap();
        assert_eq!(lakes.chance(true), 0.15);
    }

    #[test]
    fn test_labels_parse_and_display() {
        for biome in Biome::ALL {
            assert_eq!(biome.to_string().parse::<Biome>(), Ok(biome));
        }
        for terrain in Terrain::ALL {
            assert_eq!(terrain.name().parse::<Terrain>(), Ok(terrain));
        }
        assert_eq!("grassland".parse::<Biome>(), Ok(Biome::Grassland));
        assert!("Swamp".parse::<Biome>().is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_gaps() {
        let mut rules = BiomeRules::standard();
        rules.remove_terrain_rule(Terrain::Lakes);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        rules.to_json_file(&path).unwrap();

        let loaded = BiomeRules::from_json_file(&path).unwrap();
        assert_eq!(loaded, rules);
        assert_eq!(loaded.missing_entries().1, vec![Terrain::Lakes]);
    }

    #[test]
    fn test_partial_json_table() {
        let json = r#"{
            "biomes": {
                "Desert": {
                    "temperature_range": [0.6, 1.0],
                    "moisture_range": [0.0, 0.3],
                    "elevation_range": [0.2, 0.5],
                    "valid_terrains": ["Ground"]
                }
            }
        }"#;
        let rules: BiomeRules = serde_json::from_str(json).unwrap();

        assert!(rules.biome_rule(Biome::Desert).is_some());
        assert!(rules.biome_rule(Biome::Tundra).is_none());
        assert!(rules.terrain_rule(Terrain::Hills).is_none());
        assert_eq!(rules.missing_entries().0.len(), 5);
    }
}
