//! Terrain feature placement
//!
//! Layers a terrain feature over the finished biome map:
//! - ocean terrain wherever elevation is below the (stricter) terrain threshold
//! - an independent ruin pass that stamps ruins and repaints nearby biomes
//! - weighted feature rolls per cell, boosted next to matching features

use rand::Rng;
use tracing::debug;

use crate::climate::ClimateMaps;
use crate::rules::{Biome, BiomeRules, Terrain};
use crate::ruins::{self, Ring, RuinSite, PLACEMENT_ATTEMPTS};
use crate::tilemap::Tilemap;

/// Cells below this elevation carry ocean terrain (and ocean biome).
pub const OCEAN_TERRAIN_ELEVATION: f32 = 0.15;

/// Manhattan spacing that ruin sites in this pass must exceed.
pub const TERRAIN_RUIN_SPACING: usize = 10;

const SCORCHED_REPAINT_CHANCE: f64 = 0.8;
const WASTELAND_REPAINT_CHANCE: f64 = 0.7;
/// Chance a repainted cell also gets ruins
const SCORCHED_RUIN_STAMP_CHANCE: f64 = 0.2;
const WASTELAND_RUIN_STAMP_CHANCE: f64 = 0.1;

/// Candidate features, tested in this order; the first successful roll wins.
pub const FEATURE_PRIORITY: [Terrain; 4] = [Terrain::Mountain, Terrain::Forest, Terrain::Hills, Terrain::Lakes];

/// Output of the placer: the terrain map and the ruin sites it stamped.
#[derive(Clone, Debug)]
pub struct TerrainPlacement {
    pub terrain: Tilemap<Terrain>,
    pub ruin_sites: Vec<RuinSite>,
}

/// Build the terrain map. `biomes` is refined in place (ocean override and
/// ruin corruption); every random draw comes from `rng`.
pub fn place_terrain_features(
    biomes: &mut Tilemap<Biome>,
    climate: &ClimateMaps,
    rules: &BiomeRules,
    rng: &mut impl Rng,
) -> TerrainPlacement {
    let mut terrain = Tilemap::new_with(biomes.width, biomes.height, Terrain::Ground);

    apply_ocean_override(&mut terrain, biomes, &climate.elevation);
    let ruin_sites = place_ruins(&mut terrain, biomes, rng);
    assign_features(&mut terrain, biomes, climate, rules, rng);

    TerrainPlacement { terrain, ruin_sites }
}

fn apply_ocean_override(terrain: &mut Tilemap<Terrain>, biomes: &mut Tilemap<Biome>, elevation: &Tilemap<f32>) {
    for (x, y, &e) in elevation.iter() {
        if e < OCEAN_TERRAIN_ELEVATION {
            terrain.set(x, y, Terrain::Ocean);
            biomes.set(x, y, Biome::Ocean);
        }
    }
}

/// Rejection-sample ruin sites from one shared attempt budget. Each accepted
/// site gets ruins at its centre, and the surrounding land is repainted to
/// Scorched/Wasteland with an occasional extra ruin stamp.
fn place_ruins(terrain: &mut Tilemap<Terrain>, biomes: &mut Tilemap<Biome>, rng: &mut impl Rng) -> Vec<RuinSite> {
    let (width, height) = (terrain.width, terrain.height);
    let cap = ruins::ruin_site_cap(width, height);
    let mut sites: Vec<RuinSite> = Vec::with_capacity(cap);

    let mut attempts = 0;
    while sites.len() < cap && attempts < PLACEMENT_ATTEMPTS {
        attempts += 1;
        let Some((x, y)) = ruins::random_interior_cell(width, height, rng) else {
            break;
        };

        if *terrain.get(x, y) == Terrain::Ocean || !ruins::is_spaced((x, y), &sites, TERRAIN_RUIN_SPACING) {
            continue;
        }

        terrain.set(x, y, Terrain::Ruins);
        let site = RuinSite::with_random_radii(x, y, rng);
        debug!(x, y, wasteland = site.wasteland_radius, scorched = site.scorched_radius, attempts, "terrain ruin site");

        for (cx, cy, _, ring) in site.disc(width, height) {
            if *terrain.get(cx, cy) == Terrain::Ocean || *biomes.get(cx, cy) == Biome::Ocean {
                continue;
            }

            let (biome, repaint_chance, stamp_chance) = match ring {
                Ring::Scorched => (Biome::Scorched, SCORCHED_REPAINT_CHANCE, SCORCHED_RUIN_STAMP_CHANCE),
                Ring::Wasteland => (Biome::Wasteland, WASTELAND_REPAINT_CHANCE, WASTELAND_RUIN_STAMP_CHANCE),
            };

            if rng.gen::<f64>() < repaint_chance {
                biomes.set(cx, cy, biome);
                if rng.gen::<f64>() < stamp_chance {
                    terrain.set(cx, cy, Terrain::Ruins);
                }
            }
        }

        sites.push(site);
    }

    sites
}

/// Roll candidate features for every cell that is not ocean or ruins.
/// Cells scan row-major, so the cluster check sees features placed earlier
/// in the same pass. Rule lookup misses leave the cell as it is.
fn assign_features(
    terrain: &mut Tilemap<Terrain>,
    biomes: &Tilemap<Biome>,
    climate: &ClimateMaps,
    rules: &BiomeRules,
    rng: &mut impl Rng,
) {
    let mut placed = [0usize; Terrain::COUNT];

    for y in 0..terrain.height {
        for x in 0..terrain.width {
            if matches!(*terrain.get(x, y), Terrain::Ocean | Terrain::Ruins) {
                continue;
            }

            let biome = *biomes.get(x, y);
            let elevation = *climate.elevation.get(x, y);
            let moisture = *climate.moisture.get(x, y);
            let valid = rules.get_valid_terrain_types(biome);

            for feature in FEATURE_PRIORITY {
                if !valid.contains(&feature) {
                    continue;
                }
                let Some(rule) = rules.terrain_rule(feature) else {
                    continue;
                };
                if !rule.admits(biome, elevation, moisture) {
                    continue;
                }
                if rule.max_count.is_some_and(|max| placed[feature as usize] >= max) {
                    continue;
                }

                let clustered = rule.cluster_chance.is_some()
                    && terrain.neighbors_8(x, y).into_iter().any(|(nx, ny)| *terrain.get(nx, ny) == feature);

                if rng.gen::<f64>() < rule.chance(clustered) {
                    terrain.set(x, y, feature);
                    placed[feature as usize] += 1;
                    break;
                }
            }
        }
    }
}
