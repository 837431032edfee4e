//! Biome classification
//!
//! Four ordered whole-grid passes turn the climate maps into a biome map:
//! 1. Ocean below the ocean threshold
//! 2. Core regions (Desert, Tundra, Grassland) with tight climate envelopes
//! 3. Fallback by temperature for everything still unassigned
//! 4. Ruin corruption: Scorched/Wasteland zones stamped around ruin sites
//!
//! Passes 1-3 work on `Option<Biome>`; the map is finalized before the
//! corruption pass, so no unassigned cell survives classification.

use rand::Rng;
use tracing::debug;

use crate::climate::ClimateMaps;
use crate::rules::Biome;
use crate::ruins::{self, Ring, RuinSite, PLACEMENT_ATTEMPTS};
use crate::tilemap::Tilemap;

/// Cells below this elevation are ocean.
pub const OCEAN_ELEVATION: f32 = 0.2;

/// Fallback: hotter than this is desert.
const FALLBACK_DESERT_TEMPERATURE: f32 = 0.7;
/// Fallback: colder than this (in the northern quarter) is tundra.
const FALLBACK_TUNDRA_TEMPERATURE: f32 = 0.25;

/// Manhattan spacing that ruin sites in this pass must exceed.
pub const BIOME_RUIN_SPACING: usize = 15;

/// Biomes the corruption pass seeds ruins in, cycled in this order.
const RUIN_TARGET_BIOMES: [Biome; 3] = [Biome::Desert, Biome::Grassland, Biome::Tundra];

/// Repaint chance at the centre of each ring, and how much it falls off by the ring's edge.
const SCORCHED_BASE_CHANCE: f64 = 0.8;
const WASTELAND_BASE_CHANCE: f64 = 0.6;
const RING_FALLOFF: f64 = 0.3;

// =============================================================================
// CORE REGIONS
// =============================================================================

/// Climate envelope that claims a cell for a biome in the core-region pass.
/// All bounds are inclusive.
#[derive(Clone, Copy, Debug)]
pub struct CoreRegion {
    pub biome: Biome,
    pub temperature: (f32, f32),
    pub moisture: (f32, f32),
    pub elevation: (f32, f32),
    /// Only rows in the top quarter of the map qualify
    pub northern_quarter_only: bool,
}

impl CoreRegion {
    pub fn matches(&self, temperature: f32, moisture: f32, elevation: f32, y: usize, height: usize) -> bool {
        if self.northern_quarter_only && !in_northern_quarter(y, height) {
            return false;
        }
        within(self.temperature, temperature) && within(self.moisture, moisture) && within(self.elevation, elevation)
    }
}

/// Core regions in priority order; the first match wins the cell.
pub const CORE_REGIONS: [CoreRegion; 3] = [
    CoreRegion {
        biome: Biome::Desert,
        temperature: (0.7, 1.0),
        moisture: (0.0, 0.3),
        elevation: (0.2, 0.5),
        northern_quarter_only: false,
    },
    CoreRegion {
        biome: Biome::Tundra,
        temperature: (0.0, 0.25),
        moisture: (0.4, 0.7),
        elevation: (0.4, 0.8),
        northern_quarter_only: true,
    },
    CoreRegion {
        biome: Biome::Grassland,
        temperature: (0.4, 0.6),
        moisture: (0.4, 0.7),
        elevation: (0.3, 0.5),
        northern_quarter_only: false,
    },
];

fn within((min, max): (f32, f32), value: f32) -> bool {
    value >= min && value <= max
}

/// Rows `0..=height/4`.
fn in_northern_quarter(y: usize, height: usize) -> bool {
    y <= height / 4
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Output of the classifier: the final biome map and the ruin sites that corrupted it.
#[derive(Clone, Debug)]
pub struct BiomeClassification {
    pub biomes: Tilemap<Biome>,
    pub ruin_sites: Vec<RuinSite>,
}

/// Run all four passes. Every random draw comes from `rng`.
pub fn classify_biomes(climate: &ClimateMaps, rng: &mut impl Rng) -> BiomeClassification {
    let elevation = &climate.elevation;
    let mut draft: Tilemap<Option<Biome>> = Tilemap::new(elevation.width, elevation.height);

    ocean_pass(&mut draft, elevation);
    core_region_pass(&mut draft, climate);
    let mut biomes = fallback_pass(&draft, &climate.temperature);

    let mut ruin_sites = Vec::new();
    for (x, y) in place_ruin_sites(&biomes, rng) {
        let site = RuinSite::with_random_radii(x, y, rng);
        debug!(x, y, wasteland = site.wasteland_radius, scorched = site.scorched_radius, "biome ruin site");
        corrupt_around(&mut biomes, &site, rng);
        ruin_sites.push(site);
    }

    BiomeClassification { biomes, ruin_sites }
}

fn ocean_pass(draft: &mut Tilemap<Option<Biome>>, elevation: &Tilemap<f32>) {
    for (x, y, cell) in draft.iter_mut() {
        if *elevation.get(x, y) < OCEAN_ELEVATION {
            *cell = Some(Biome::Ocean);
        }
    }
}

fn core_region_pass(draft: &mut Tilemap<Option<Biome>>, climate: &ClimateMaps) {
    let height = draft.height;
    for (x, y, cell) in draft.iter_mut() {
        if cell.is_some() {
            continue;
        }

        let t = *climate.temperature.get(x, y);
        let m = *climate.moisture.get(x, y);
        let e = *climate.elevation.get(x, y);

        *cell = CORE_REGIONS
            .iter()
            .find(|region| region.matches(t, m, e, y, height))
            .map(|region| region.biome);
    }
}

/// Resolve every unassigned cell and drop the placeholder.
fn fallback_pass(draft: &Tilemap<Option<Biome>>, temperature: &Tilemap<f32>) -> Tilemap<Biome> {
    let height = draft.height;
    let mut biomes = Tilemap::new_with(draft.width, height, Biome::Grassland);

    for (x, y, cell) in draft.iter() {
        let biome = match cell {
            Some(biome) => *biome,
            None => {
                let t = *temperature.get(x, y);
                if t > FALLBACK_DESERT_TEMPERATURE {
                    Biome::Desert
                } else if t < FALLBACK_TUNDRA_TEMPERATURE && in_northern_quarter(y, height) {
                    Biome::Tundra
                } else {
                    Biome::Grassland
                }
            }
        };
        biomes.set(x, y, biome);
    }

    biomes
}

/// Pick up to the site cap, one slot per target biome cycling Desert, Grassland,
/// Tundra. Each slot gets its own attempt budget; a slot that runs out is skipped.
/// Returns positions only; radii are drawn per site right before its corruption.
fn place_ruin_sites(biomes: &Tilemap<Biome>, rng: &mut impl Rng) -> Vec<(usize, usize)> {
    let (width, height) = (biomes.width, biomes.height);
    let cap = ruins::ruin_site_cap(width, height);
    let mut positions: Vec<RuinSite> = Vec::with_capacity(cap);

    for target in RUIN_TARGET_BIOMES.iter().cycle().take(cap) {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let Some((x, y)) = ruins::random_interior_cell(width, height, rng) else {
                return Vec::new();
            };

            if *biomes.get(x, y) == *target && ruins::is_spaced((x, y), &positions, BIOME_RUIN_SPACING) {
                positions.push(RuinSite {
                    x,
                    y,
                    wasteland_radius: 0,
                    scorched_radius: 0,
                });
                break;
            }
        }
    }

    positions.into_iter().map(|site| (site.x, site.y)).collect()
}

/// Repaint non-ocean cells around a site, with chances fading toward each ring's edge.
fn corrupt_around(biomes: &mut Tilemap<Biome>, site: &RuinSite, rng: &mut impl Rng) {
    let (width, height) = (biomes.width, biomes.height);

    for (x, y, distance, ring) in site.disc(width, height) {
        if *biomes.get(x, y) == Biome::Ocean {
            continue;
        }

        let distance = distance as f64;
        let (biome, chance) = match ring {
            Ring::Scorched => (
                Biome::Scorched,
                SCORCHED_BASE_CHANCE - (distance / site.scorched_radius as f64) * RING_FALLOFF,
            ),
            Ring::Wasteland => (
                Biome::Wasteland,
                WASTELAND_BASE_CHANCE - (distance / site.wasteland_radius as f64) * RING_FALLOFF,
            ),
        };

        if rng.gen::<f64>() < chance {
            biomes.set(x, y, biome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn uniform_climate(width: usize, height: usize, t: f32, m: f32, e: f32) -> ClimateMaps {
        ClimateMaps {
            elevation: Tilemap::new_with(width, height, e),
            temperature: Tilemap::new_with(width, height, t),
            moisture: Tilemap::new_with(width, height, m),
        }
    }

    #[test]
    fn test_low_elevation_is_ocean() {
        let climate = uniform_climate(30, 30, 0.9, 0.1, 0.19);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = classify_biomes(&climate, &mut rng);

        assert!(result.biomes.iter().all(|(_, _, &b)| b == Biome::Ocean));
    }

    #[test]
    fn test_core_regions() {
        let mut draft = Tilemap::new(1, 8);
        let mut climate = uniform_climate(1, 8, 0.5, 0.5, 0.4);
        // Row 0: desert core; row 1: tundra core (northern quarter); row 6: too far south for tundra
        climate.temperature.set(0, 0, 0.8);
        climate.moisture.set(0, 0, 0.2);
        climate.temperature.set(0, 1, 0.1);
        climate.elevation.set(0, 1, 0.6);
        climate.temperature.set(0, 6, 0.1);
        climate.elevation.set(0, 6, 0.6);

        core_region_pass(&mut draft, &climate);

        assert_eq!(*draft.get(0, 0), Some(Biome::Desert));
        assert_eq!(*draft.get(0, 1), Some(Biome::Tundra));
        assert_eq!(*draft.get(0, 3), Some(Biome::Grassland));
        assert_eq!(*draft.get(0, 6), None);
    }

    #[test]
    fn test_fallback_rules() {
        let draft: Tilemap<Option<Biome>> = Tilemap::new(1, 8);
        let mut temperature = Tilemap::new_with(1, 8, 0.5f32);
        temperature.set(0, 0, 0.75);
        temperature.set(0, 1, 0.1);
        temperature.set(0, 7, 0.1);

        let biomes = fallback_pass(&draft, &temperature);
        assert_eq!(*biomes.get(0, 0), Biome::Desert);
        assert_eq!(*biomes.get(0, 1), Biome::Tundra);
        assert_eq!(*biomes.get(0, 4), Biome::Grassland);
        // Cold but not in the northern quarter
        assert_eq!(*biomes.get(0, 7), Biome::Grassland);
    }

    #[test]
    fn test_ruin_sites_respect_cap_and_spacing() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let climate = uniform_climate(60, 60, 0.5, 0.5, 0.4);
            let result = classify_biomes(&climate, &mut rng);

            assert!(result.ruin_sites.len() <= ruins::ruin_site_cap(60, 60));
            for (i, a) in result.ruin_sites.iter().enumerate() {
                for b in &result.ruin_sites[i + 1..] {
                    assert!(ruins::manhattan_distance((a.x, a.y), (b.x, b.y)) > BIOME_RUIN_SPACING);
                }
            }
        }
    }

    #[test]
    fn test_ruin_sites_only_in_target_biomes() {
        // An all-grassland map only ever accepts the grassland slots
        let climate = uniform_climate(60, 60, 0.5, 0.5, 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut draft = Tilemap::new(60, 60);
        core_region_pass(&mut draft, &climate);
        let biomes = fallback_pass(&draft, &climate.temperature);
        assert!(biomes.iter().all(|(_, _, &b)| b == Biome::Grassland));

        let sites = place_ruin_sites(&biomes, &mut rng);
        assert!(sites.len() <= 2);
        assert!(!sites.is_empty());
    }

    #[test]
    fn test_corruption_spares_ocean() {
        let mut biomes = Tilemap::new_with(21, 21, Biome::Ocean);
        for y in 0..21 {
            for x in 0..10 {
                biomes.set(x, y, Biome::Grassland);
            }
        }
        let site = RuinSite { x: 10, y: 10, wasteland_radius: 6, scorched_radius: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        corrupt_around(&mut biomes, &site, &mut rng);

        for y in 0..21 {
            for x in 10..21 {
                assert_eq!(*biomes.get(x, y), Biome::Ocean);
            }
        }
        let corrupted = biomes
            .iter()
            .filter(|(_, _, &b)| matches!(b, Biome::Scorched | Biome::Wasteland))
            .count();
        assert!(corrupted > 0);
    }

    fn distance_to(site: &RuinSite, x: usize, y: usize) -> f32 {
        let dx = x.abs_diff(site.x) as f32;
        let dy = y.abs_diff(site.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn test_corruption_stays_in_its_rings() {
        let site = RuinSite { x: 10, y: 10, wasteland_radius: 5, scorched_radius: 2 };

        for seed in 0..10 {
            let mut biomes = Tilemap::new_with(21, 21, Biome::Grassland);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            corrupt_around(&mut biomes, &site, &mut rng);

            for (x, y, &biome) in biomes.iter() {
                let d = distance_to(&site, x, y);
                match biome {
                    Biome::Scorched => assert!(d <= 2.0),
                    Biome::Wasteland => assert!(d > 2.0 && d <= 5.0),
                    Biome::Grassland => {}
                    other => panic!("unexpected biome {other}"),
                }
            }
        }
    }

    #[test]
    fn test_corruption_fades_toward_ring_edge() {
        // Centre repaints with 0.8, the scorched edge (d = 3) with 0.5,
        // the wasteland edge (d = 6) with 0.3
        let site = RuinSite { x: 10, y: 10, wasteland_radius: 6, scorched_radius: 3 };
        let (mut centre, mut scorched_edge, mut wasteland_edge) = (0, 0, 0);

        for seed in 0..400 {
            let mut biomes = Tilemap::new_with(21, 21, Biome::Grassland);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            corrupt_around(&mut biomes, &site, &mut rng);

            centre += (*biomes.get(10, 10) == Biome::Scorched) as usize;
            scorched_edge += (*biomes.get(13, 10) == Biome::Scorched) as usize;
            wasteland_edge += (*biomes.get(16, 10) == Biome::Wasteland) as usize;
        }

        assert!(centre > scorched_edge);
        assert!(scorched_edge > wasteland_edge);
        assert!(wasteland_edge > 0);
    }

    #[test]
    fn test_small_map_has_no_ruins() {
        let climate = uniform_climate(10, 10, 0.5, 0.5, 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = classify_biomes(&climate, &mut rng);
        assert!(result.ruin_sites.is_empty());
        assert!(result.biomes.iter().all(|(_, _, &b)| b == Biome::Grassland));
    }
}
