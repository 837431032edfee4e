//! Climate synthesis: elevation, temperature and moisture maps.
//!
//! Three independent noise fields (one sub-seed each) are reshaped into the
//! climate grids. Temperature additionally follows a latitude gradient that
//! runs from cold in the north (row 0) to hot in the south.

use tracing::debug;

use crate::noise_field::{FieldSource, NoiseParams};
use crate::seeds::WorldSeeds;
use crate::tilemap::Tilemap;

// =============================================================================
// CLIMATE PARAMETERS
// =============================================================================

/// Elevation contrast boost applied before clipping
const ELEVATION_GAIN: f32 = 1.2;

/// Share of temperature driven by latitude (the rest is noise)
const LATITUDE_WEIGHT: f32 = 0.7;
const TEMPERATURE_NOISE_WEIGHT: f32 = 0.3;
const TEMPERATURE_GAIN: f32 = 1.2;
const TEMPERATURE_OFFSET: f32 = -0.1;

const MOISTURE_GAIN: f32 = 1.3;
const MOISTURE_OFFSET: f32 = -0.15;

/// The three climate grids, every value in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ClimateMaps {
    pub elevation: Tilemap<f32>,
    pub temperature: Tilemap<f32>,
    pub moisture: Tilemap<f32>,
}

/// Latitude gradient for a row: 0.0 at the northern edge, approaching 1.0 in the south.
pub fn latitude_gradient(row: usize, height: usize) -> f32 {
    row as f32 / height as f32
}

/// Build elevation, temperature and moisture for a `width` x `height` world.
pub fn synthesize_climate(
    width: usize,
    height: usize,
    seeds: &WorldSeeds,
    source: &dyn FieldSource,
) -> ClimateMaps {
    let mut elevation = source.field(width, height, &NoiseParams::elevation(), seeds.elevation);
    elevation.apply(|e| e * ELEVATION_GAIN);
    elevation.clamp_in_place(0.0, 1.0);

    let temperature_noise = source.field(width, height, &NoiseParams::temperature(), seeds.temperature);
    let mut temperature = Tilemap::new_with(width, height, 0.0f32);
    for (x, y, t) in temperature.iter_mut() {
        let blended = latitude_gradient(y, height) * LATITUDE_WEIGHT
            + *temperature_noise.get(x, y) * TEMPERATURE_NOISE_WEIGHT;
        *t = (blended * TEMPERATURE_GAIN + TEMPERATURE_OFFSET).clamp(0.0, 1.0);
    }

    let mut moisture = source.field(width, height, &NoiseParams::moisture(), seeds.moisture);
    moisture.apply(|m| m * MOISTURE_GAIN + MOISTURE_OFFSET);
    moisture.clamp_in_place(0.0, 1.0);

    if let (Some((t_lo, t_hi)), Some((m_lo, m_hi))) = (temperature.min_max(), moisture.min_max()) {
        debug!(t_lo, t_hi, m_lo, m_hi, "climate synthesized");
    }

    ClimateMaps {
        elevation,
        temperature,
        moisture,
    }
}
