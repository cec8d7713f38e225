//! Position-dependent wind strength.
//!
//! Some places on the map are windier than others. The wind field is a
//! coherent Perlin noise sampled at world coordinates; it has no seed or
//! state beyond the coordinates themselves, so the same spot always gets
//! the same wind.

use fastnoise_lite::{FastNoiseLite, NoiseType};

/// World units to noise units
const WIND_FREQUENCY: f64 = 0.01;
/// Peak deviation of the multiplier from 1.0 is half of this
const WIND_SPREAD: f64 = 0.5;

/// A pure, deterministic 2D noise normalised to [0, 1]
pub trait CoherentNoise {
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Perlin noise with a fixed seed
pub struct PerlinWind {
    noise: FastNoiseLite,
}

impl PerlinWind {
    pub fn new() -> Self {
        let mut noise = FastNoiseLite::with_seed(0);
        noise.set_noise_type(Some(NoiseType::Perlin));
        // Callers scale coordinates themselves
        noise.set_frequency(Some(1.0));
        Self { noise }
    }
}

impl Default for PerlinWind {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PerlinWind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerlinWind").finish()
    }
}

impl CoherentNoise for PerlinWind {
    fn sample(&self, x: f64, y: f64) -> f64 {
        let raw = self.noise.get_noise_2d(x as f32, y as f32) as f64;
        // Perlin outputs in [-1, 1]
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Output multiplier for a turbine standing at (x, z), in [0.75, 1.25].
///
/// Exactly 1.0 when position influence is disabled.
pub fn spatial_multiplier(noise: &dyn CoherentNoise, x: f64, z: f64, enabled: bool) -> f64 {
    if !enabled {
        return 1.0;
    }
    let sample = noise.sample(x * WIND_FREQUENCY, z * WIND_FREQUENCY).clamp(0.0, 1.0);
    1.0 + (sample - 0.5) * WIND_SPREAD
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl CoherentNoise for Fixed {
        fn sample(&self, _x: f64, _y: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_noise_range_and_determinism() {
        let wind = PerlinWind::new();
        let other = PerlinWind::new();
        for i in -50..50 {
            let x = i as f64 * 3.7;
            let y = i as f64 * -1.3 + 0.25;
            let a = wind.sample(x, y);
            assert!((0.0..=1.0).contains(&a), "sample {} out of range", a);
            assert_eq!(a, other.sample(x, y));
        }
    }

    #[test]
    fn test_multiplier_bounds() {
        let wind = PerlinWind::new();
        for i in 0..200 {
            let x = i as f64 * 97.3 - 9000.0;
            let z = i as f64 * -41.9 + 1234.5;
            let m = spatial_multiplier(&wind, x, z, true);
            assert!((0.75..=1.25).contains(&m), "multiplier {} out of range", m);
        }
        assert_eq!(spatial_multiplier(&Fixed(0.0), 1.0, 1.0, true), 0.75);
        assert_eq!(spatial_multiplier(&Fixed(1.0), 1.0, 1.0, true), 1.25);
    }

    #[test]
    fn test_disabled_is_identity() {
        let wind = PerlinWind::new();
        for i in 0..20 {
            assert_eq!(spatial_multiplier(&wind, i as f64 * 55.0, -3.0, false), 1.0);
        }
        assert_eq!(spatial_multiplier(&Fixed(0.0), 0.0, 0.0, false), 1.0);
    }

    #[test]
    fn test_wind_varies_across_map() {
        let wind = PerlinWind::new();
        let samples: Vec<f64> = (0..50)
            .map(|i| spatial_multiplier(&wind, i as f64 * 37.0 + 5.0, i as f64 * 23.0 + 11.0, true))
            .collect();
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max > min, "wind field should not be constant");
    }
}
