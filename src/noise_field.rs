//! Fractal coherent-noise fields.
//!
//! A field is the octave sum of a 2D coherent noise function sampled once per
//! cell, divided by the total amplitude and then min-max rescaled to `[0, 1]`.

use noise::{NoiseFn, OpenSimplex};
use rayon::prelude::*;

use crate::tilemap::Tilemap;

/// Value every cell takes when the raw field has no spread.
pub const DEGENERATE_FIELD_VALUE: f32 = 0.5;

/// Parameters for one fractal noise field
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NoiseParams {
    /// Cell distance covered by one unit of noise space (higher = larger features)
    pub scale: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub frequency_multiplier: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 100.0,
            octaves: 6,
            persistence: 0.5,
            frequency_multiplier: 2.0,
        }
    }
}

impl NoiseParams {
    pub fn with_scale(scale: f64, octaves: u32) -> Self {
        Self {
            scale,
            octaves,
            ..Default::default()
        }
    }

    pub fn elevation() -> Self {
        Self::with_scale(75.0, 5)
    }

    pub fn temperature() -> Self {
        Self::with_scale(100.0, 4)
    }

    pub fn moisture() -> Self {
        Self::with_scale(85.0, 4)
    }
}

/// Anything that can produce a normalized `[0, 1]` scalar field.
///
/// The climate stage only talks to this trait, so tests can swap in a
/// flat or hand-built field.
pub trait FieldSource: Send + Sync {
    fn field(&self, width: usize, height: usize, params: &NoiseParams, seed: u64) -> Tilemap<f32>;
}

/// Production field source: octave-summed OpenSimplex noise.
#[derive(Clone, Copy, Debug, Default)]
pub struct FractalNoise;

impl FieldSource for FractalNoise {
    fn field(&self, width: usize, height: usize, params: &NoiseParams, seed: u64) -> Tilemap<f32> {
        let noise = OpenSimplex::new(fold_seed(seed));
        fractal_field(&noise, width, height, params)
    }
}

/// Sample `noise` over the grid, octave by octave, then normalize.
pub fn fractal_field<N>(noise: &N, width: usize, height: usize, params: &NoiseParams) -> Tilemap<f32>
where
    N: NoiseFn<f64, 2> + Sync,
{
    let mut raw = Tilemap::new_with(width, height, 0.0f64);

    let mut total_amplitude = 0.0;
    let mut amplitude = 1.0;
    for _ in 0..params.octaves {
        total_amplitude += amplitude;
        amplitude *= params.persistence;
    }

    // Rows share nothing, and every cell accumulates its octaves in the
    // same order, so the parallel fill is bit-identical to a serial one.
    raw.as_mut_slice().par_chunks_mut(width.max(1)).enumerate().for_each(|(y, row)| {
        for (x, cell) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut amplitude = 1.0;
            for octave in 0..params.octaves {
                let frequency = params.frequency_multiplier.powi(octave as i32);
                let nx = x as f64 * frequency / params.scale;
                let ny = y as f64 * frequency / params.scale;
                sum += noise.get([nx, ny]) * amplitude;
                amplitude *= params.persistence;
            }
            *cell = sum;
        }
    });

    normalize_field(&raw, total_amplitude)
}

/// Divide by the total octave amplitude, then rescale to exactly `[0, 1]`.
///
/// A field without spread (including one made of non-finite values) becomes
/// a constant [`DEGENERATE_FIELD_VALUE`] field.
pub fn normalize_field(raw: &Tilemap<f64>, total_amplitude: f64) -> Tilemap<f32> {
    let divisor = if total_amplitude > 0.0 { total_amplitude } else { 1.0 };

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, _, &v) in raw.iter() {
        let v = v / divisor;
        min = min.min(v);
        max = max.max(v);
    }

    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return raw.map(|_| DEGENERATE_FIELD_VALUE);
    }

    raw.map(|&v| (((v / divisor) - min) / range) as f32)
}

/// Fold a 64-bit seed into the 32 bits the noise crate accepts.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    #[test]
    fn test_field_spans_unit_interval() {
        let field = FractalNoise.field(40, 30, &NoiseParams::elevation(), 7);
        let (min, max) = field.min_max().unwrap();
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
        assert_eq!((field.width, field.height), (40, 30));
    }

    #[test]
    fn test_field_is_seed_deterministic() {
        let params = NoiseParams::moisture();
        let a = FractalNoise.field(32, 24, &params, 99);
        let b = FractalNoise.field(32, 24, &params, 99);
        assert_eq!(a, b);

        let c = FractalNoise.field(32, 24, &params, 100);
        assert_ne!(a, c);
    }

    #[test]
    fn test_constant_noise_degrades_to_constant_field() {
        let field = fractal_field(&Constant::new(0.3), 8, 8, &NoiseParams::default());
        assert!(field.iter().all(|(_, _, &v)| v == DEGENERATE_FIELD_VALUE));
    }

    #[test]
    fn test_normalizing_constant_raw_field_does_not_fault() {
        let raw = Tilemap::new_with(5, 5, 1.25f64);
        let field = normalize_field(&raw, 1.875);
        assert!(field.iter().all(|(_, _, &v)| v == DEGENERATE_FIELD_VALUE));

        // Renormalizing the result is stable too
        let again = normalize_field(&field.map(|&v| v as f64), 1.0);
        assert_eq!(field, again);
    }

    #[test]
    fn test_zero_octaves_is_degenerate_not_nan() {
        let params = NoiseParams { octaves: 0, ..Default::default() };
        let field = FractalNoise.field(6, 6, &params, 1);
        assert!(field.iter().all(|(_, _, &v)| v == DEGENERATE_FIELD_VALUE));
    }

    #[test]
    fn test_single_cell_field_is_constant() {
        let field = FractalNoise.field(1, 1, &NoiseParams::temperature(), 3);
        assert_eq!(*field.get(0, 0), DEGENERATE_FIELD_VALUE);
    }
}
