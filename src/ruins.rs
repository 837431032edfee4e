//! Ruin sites: rejection-sampled seed points with corruption radii.
//!
//! Both the biome classifier and the terrain placer run their own ruin pass
//! with different spacing and acceptance rules; the geometry they share
//! lives here.

use std::ops::RangeInclusive;

use rand::Rng;

/// Cells kept clear of every map edge when picking a site.
pub const RUIN_MARGIN: usize = 5;
/// Hard cap on sites per pass, regardless of map size.
pub const MAX_RUIN_SITES: usize = 5;
/// One site is allowed per this many cells.
pub const CELLS_PER_RUIN: usize = 300;
/// Random-position attempts allowed per pass (or per slot, depending on the pass).
pub const PLACEMENT_ATTEMPTS: usize = 100;

pub const WASTELAND_RADIUS: RangeInclusive<u32> = 4..=6;
pub const SCORCHED_RADIUS: RangeInclusive<u32> = 2..=3;

/// A placed ruin and its corruption radii. Lives only for one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuinSite {
    pub x: usize,
    pub y: usize,
    pub wasteland_radius: u32,
    pub scorched_radius: u32,
}

/// Which ring of the corruption disc a cell falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ring {
    /// Within the scorched radius
    Scorched,
    /// Beyond the scorched radius, within the wasteland radius
    Wasteland,
}

impl RuinSite {
    /// Site at `(x, y)` with both radii drawn from `rng` (wasteland first).
    pub fn with_random_radii(x: usize, y: usize, rng: &mut impl Rng) -> Self {
        let wasteland_radius = rng.gen_range(WASTELAND_RADIUS);
        let scorched_radius = rng.gen_range(SCORCHED_RADIUS);
        Self {
            x,
            y,
            wasteland_radius,
            scorched_radius,
        }
    }

    /// Cells of the corruption disc, clipped to the map, in row-major order of
    /// the bounding square: `(x, y, euclidean distance, ring)`.
    pub fn disc(&self, width: usize, height: usize) -> impl Iterator<Item = (usize, usize, f32, Ring)> + '_ {
        let r = self.wasteland_radius as i64;
        let (cx, cy) = (self.x as i64, self.y as i64);

        (-r..=r)
            .flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter_map(move |(dx, dy)| {
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                    return None;
                }

                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                let ring = if distance <= self.scorched_radius as f32 {
                    Ring::Scorched
                } else if distance <= self.wasteland_radius as f32 {
                    Ring::Wasteland
                } else {
                    return None;
                };
                Some((x as usize, y as usize, distance, ring))
            })
    }
}

/// Number of sites a pass may place on a `width` x `height` map.
pub fn ruin_site_cap(width: usize, height: usize) -> usize {
    MAX_RUIN_SITES.min(width * height / CELLS_PER_RUIN)
}

/// Uniform random cell inside the edge margin, or `None` if the map has no interior.
pub fn random_interior_cell(width: usize, height: usize, rng: &mut impl Rng) -> Option<(usize, usize)> {
    if width <= 2 * RUIN_MARGIN || height <= 2 * RUIN_MARGIN {
        return None;
    }
    let x = rng.gen_range(RUIN_MARGIN..width - RUIN_MARGIN);
    let y = rng.gen_range(RUIN_MARGIN..height - RUIN_MARGIN);
    Some((x, y))
}

pub fn manhattan_distance(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// True when `candidate` is strictly farther than `min_spacing` from every site.
pub fn is_spaced(candidate: (usize, usize), sites: &[RuinSite], min_spacing: usize) -> bool {
    sites
        .iter()
        .all(|site| manhattan_distance(candidate, (site.x, site.y)) > min_spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_site_cap() {
        assert_eq!(ruin_site_cap(10, 10), 0);
        assert_eq!(ruin_site_cap(20, 20), 1);
        assert_eq!(ruin_site_cap(30, 30), 3);
        assert_eq!(ruin_site_cap(100, 80), 5);
    }

    #[test]
    fn test_interior_cells_respect_margin() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(random_interior_cell(10, 40, &mut rng), None);

        for _ in 0..200 {
            let (x, y) = random_interior_cell(11, 14, &mut rng).unwrap();
            assert_eq!(x, 5);
            assert!((5..9).contains(&y));
        }
    }

    #[test]
    fn test_spacing_is_strict() {
        let site = RuinSite { x: 10, y: 10, wasteland_radius: 4, scorched_radius: 2 };
        assert!(!is_spaced((20, 15), &[site], 15));
        assert!(is_spaced((20, 16), &[site], 15));
        assert!(is_spaced((0, 0), &[], 15));
    }

    #[test]
    fn test_disc_rings_and_clipping() {
        let site = RuinSite { x: 1, y: 1, wasteland_radius: 4, scorched_radius: 2 };
        let cells: Vec<_> = site.disc(20, 20).collect();

        assert!(cells.iter().all(|&(x, y, _, _)| x < 20 && y < 20));
        assert!(cells.iter().all(|&(_, _, d, _)| d <= 4.0));
        assert!(cells.iter().any(|&(x, y, d, ring)| (x, y) == (1, 1) && d == 0.0 && ring == Ring::Scorched));
        assert!(cells.iter().any(|&(x, y, _, ring)| (x, y) == (5, 1) && ring == Ring::Wasteland));
        // Corner of the bounding square lies outside the disc
        assert!(!cells.iter().any(|&(x, y, _, _)| (x, y) == (5, 5)));
    }

    #[test]
    fn test_random_radii_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let site = RuinSite::with_random_radii(0, 0, &mut rng);
            assert!(WASTELAND_RADIUS.contains(&site.wasteland_radius));
            assert!(SCORCHED_RADIUS.contains(&site.scorched_radius));
        }
    }
}
