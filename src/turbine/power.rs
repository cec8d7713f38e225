//! Per-tick power generation.
//!
//! Output grows linearly with the blades' height above the ocean surface,
//! saturating 35 units up, and is scaled by the wind at the turbine's
//! position.

use serde::{Deserialize, Serialize};

use super::sink::PowerSink;
use super::wind::{spatial_multiplier, CoherentNoise};
use crate::config::TurbineConfig;

/// Height above the surface at which efficiency saturates
pub const SATURATION_HEIGHT: f64 = 35.0;
/// Blades closer to the surface than this count as submerged
pub const SUBMERSION_MARGIN: f64 = 1.0;
/// Raw generation per second at full efficiency
const BASE_GENERATION: f64 = 40.0;
const OUTPUT_DIVISOR: f64 = 4.0;
const SPIN_PER_UNIT: f64 = 10.0;
const MIN_VOLUME: f64 = 0.6;
const MAX_VOLUME: f64 = 1.0;

/// Fraction of generation capacity unlocked by altitude, in [0, 1]
pub fn depth_scalar(height: f64, surface: f64) -> f64 {
    ((height - surface) / SATURATION_HEIGHT).clamp(0.0, 1.0)
}

pub fn is_submerged(height: f64, surface: f64) -> bool {
    height < surface + SUBMERSION_MARGIN
}

/// What the turbine sees this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerInputs {
    /// Blade height
    pub height: f64,
    /// Reference surface height
    pub surface: f64,
    pub x: f64,
    pub z: f64,
    /// Game-time elapsed this tick
    pub dt: f64,
}

/// Result of one generation step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerOutput {
    pub depth_scalar: f64,
    pub spatial_multiplier: f64,
    /// Unscaled generation, also drives the visuals
    pub raw_amount: f64,
    /// Power pushed to the sink
    pub power_generated: f64,
    pub spin_speed: f64,
    pub volume: f64,
}

impl PowerOutput {
    /// Nothing generated, blades still
    pub fn idle() -> Self {
        Self::default()
    }

    /// Displayed efficiency: altitude scalar times wind, as a percentage
    pub fn efficiency_percent(&self) -> i64 {
        efficiency_percent(self.depth_scalar, self.spatial_multiplier)
    }
}

pub fn efficiency_percent(depth_scalar: f64, spatial_multiplier: f64) -> i64 {
    (depth_scalar * 100.0 * spatial_multiplier).round() as i64
}

/// How much of the generated power the sink took
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delivery {
    pub accepted: f64,
    pub overflow: f64,
}

/// Compute one tick of generation.
///
/// Submerged blades generate nothing and do not spin.
pub fn simulate(inputs: &PowerInputs, noise: &dyn CoherentNoise, config: &TurbineConfig) -> PowerOutput {
    if is_submerged(inputs.height, inputs.surface) {
        return PowerOutput::idle();
    }

    let depth = depth_scalar(inputs.height, inputs.surface);
    let wind = spatial_multiplier(noise, inputs.x, inputs.z, config.position_influences_power);
    let raw_amount = depth * inputs.dt.max(0.0) * BASE_GENERATION * wind;

    PowerOutput {
        depth_scalar: depth,
        spatial_multiplier: wind,
        raw_amount,
        power_generated: config.power_production_scale * raw_amount / OUTPUT_DIVISOR,
        spin_speed: raw_amount * SPIN_PER_UNIT,
        volume: raw_amount.clamp(MIN_VOLUME, MAX_VOLUME),
    }
}

/// Push generated power into a sink
pub fn deliver(output: &PowerOutput, sink: &mut dyn PowerSink) -> Delivery {
    let accepted = sink.try_accept(output.power_generated);
    Delivery {
        accepted,
        overflow: (output.power_generated - accepted).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turbine::sink::PowerSource;
    use crate::turbine::wind::PerlinWind;

    fn still_air() -> TurbineConfig {
        TurbineConfig {
            power_production_scale: 1.0,
            position_influences_power: false,
            ..TurbineConfig::default()
        }
    }

    fn inputs(height: f64, dt: f64) -> PowerInputs {
        PowerInputs { height, surface: 0.0, x: 120.0, z: -40.0, dt }
    }

    #[test]
    fn test_depth_scalar_bounds() {
        for h in [-100.0, -1.0, 0.0] {
            assert_eq!(depth_scalar(h, 0.0), 0.0);
        }
        for h in [35.0, 36.0, 500.0] {
            assert_eq!(depth_scalar(h, 0.0), 1.0);
        }
        assert_eq!(depth_scalar(27.5, 10.0), 0.5);
    }

    #[test]
    fn test_full_height_generation() {
        let wind = PerlinWind::new();
        let out = simulate(&inputs(35.0, 0.5), &wind, &still_air());
        assert_eq!(out.depth_scalar, 1.0);
        assert_eq!(out.spatial_multiplier, 1.0);
        assert_eq!(out.raw_amount, 20.0);
        assert_eq!(out.power_generated, 5.0);
        assert_eq!(out.spin_speed, 200.0);
        assert_eq!(out.volume, 1.0);
        assert_eq!(out.efficiency_percent(), 100);
    }

    #[test]
    fn test_half_height_generation() {
        let wind = PerlinWind::new();
        let out = simulate(&inputs(17.5, 0.5), &wind, &still_air());
        assert_eq!(out.depth_scalar, 0.5);
        assert_eq!(out.raw_amount, 10.0);
        assert_eq!(out.power_generated, 2.5);
        assert_eq!(out.efficiency_percent(), 50);
    }

    #[test]
    fn test_submerged_generates_nothing() {
        let wind = PerlinWind::new();
        let config = TurbineConfig {
            power_production_scale: 10.0,
            ..TurbineConfig::default()
        };
        let out = simulate(&inputs(0.5, 1.0), &wind, &config);
        assert_eq!(out.power_generated, 0.0);
        assert_eq!(out.spin_speed, 0.0);
        assert!(is_submerged(0.99, 0.0));
        assert!(!is_submerged(1.0, 0.0));
    }

    #[test]
    fn test_output_monotonic_in_height() {
        let wind = PerlinWind::new();
        let config = TurbineConfig::default();
        let mut last = 0.0;
        for step in 0..80 {
            let height = 1.0 + step as f64 * 0.5;
            let out = simulate(&inputs(height, 0.1), &wind, &config);
            assert!(out.power_generated >= last);
            last = out.power_generated;
        }
    }

    #[test]
    fn test_scale_multiplies_output() {
        let wind = PerlinWind::new();
        let doubled = TurbineConfig {
            power_production_scale: 2.0,
            ..still_air()
        };
        let out = simulate(&inputs(35.0, 0.5), &wind, &doubled);
        assert_eq!(out.power_generated, 10.0);
        // Visuals follow the raw amount, not the scaled output
        assert_eq!(out.spin_speed, 200.0);
    }

    #[test]
    fn test_low_output_keeps_minimum_volume() {
        let wind = PerlinWind::new();
        let out = simulate(&inputs(3.5, 0.01), &wind, &still_air());
        assert!(out.raw_amount < 0.6);
        assert_eq!(out.volume, 0.6);
    }

    #[test]
    fn test_deliver_reports_overflow() {
        let mut sink = PowerSource::new(3.0);
        let out = PowerOutput {
            power_generated: 5.0,
            ..PowerOutput::idle()
        };
        let delivery = deliver(&out, &mut sink);
        assert_eq!(delivery.accepted, 3.0);
        assert_eq!(delivery.overflow, 2.0);
    }
}
