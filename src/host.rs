//! The host side of the simulation: time, the ocean and the hooks the host
//! scheduler calls on every entity.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::config::{OceanConfig, SimulationParams};

/// Source of tick timing
pub trait Clock {
    /// Real seconds elapsed this tick
    fn delta_time(&self) -> f64;

    /// Game seconds elapsed this tick (day/night cycle time)
    fn game_delta_time(&self) -> f64 {
        self.delta_time()
    }

    /// Monotonic current time in real seconds
    fn now(&self) -> f64;
}

/// Provider of the reference surface height
pub trait OceanSurface {
    fn level(&self) -> f64;
}

/// Hover readout icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverIcon {
    Info,
    HandDeny,
}

/// Text shown when the player looks at an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayText {
    pub primary: String,
    pub secondary: String,
    pub icon: HoverIcon,
    /// Seconds the icon stays up
    pub display_time: f64,
}

/// Callbacks the host scheduler invokes on an entity
pub trait HostBehaviour {
    type Report;

    /// Advance one frame
    fn on_tick(&mut self, clock: &dyn Clock, ocean: &dyn OceanSurface) -> Self::Report;

    /// Hover readout, if the entity shows one right now
    fn on_hover_query(&self, ocean: &dyn OceanSurface) -> Option<DisplayText>;

    /// Manual interaction (player click)
    fn on_interact(&mut self, clock: &dyn Clock);
}

/// Fixed-step clock driven by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now: f64,
    tick_seconds: f64,
    game_time_scale: f64,
    ticks: u64,
}

impl SimClock {
    pub fn new(tick_seconds: f64, game_time_scale: f64) -> Self {
        Self {
            now: 0.0,
            tick_seconds,
            game_time_scale,
            ticks: 0,
        }
    }

    pub fn from_params(params: &SimulationParams) -> Self {
        Self::new(params.tick_seconds, params.game_time_scale)
    }

    /// Move to the next tick
    pub fn advance(&mut self) {
        self.ticks += 1;
        self.now = self.ticks as f64 * self.tick_seconds;
    }

    /// Jump to a given tick (when resuming from a snapshot)
    pub fn set_ticks(&mut self, ticks: u64) {
        self.ticks = ticks;
        self.now = ticks as f64 * self.tick_seconds;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for SimClock {
    fn delta_time(&self) -> f64 {
        self.tick_seconds
    }

    fn game_delta_time(&self) -> f64 {
        self.tick_seconds * self.game_time_scale
    }

    fn now(&self) -> f64 {
        self.now
    }
}

/// Sea surface with an optional sinusoidal tide
#[derive(Debug, Clone, PartialEq)]
pub struct Ocean {
    config: OceanConfig,
    level: f64,
}

impl Ocean {
    pub fn new(config: OceanConfig) -> Self {
        let level = config.level;
        Self { config, level }
    }

    #[cfg(test)]
    pub fn flat(level: f64) -> Self {
        Self::new(OceanConfig {
            level,
            tide_amplitude: 0.0,
            ..OceanConfig::default()
        })
    }

    /// Recompute the surface height for time `now`
    pub fn update(&mut self, now: f64) {
        self.level = if self.config.tide_amplitude == 0.0 || self.config.tide_period <= 0.0 {
            self.config.level
        } else {
            self.config.level + self.config.tide_amplitude * (TAU * now / self.config.tide_period).sin()
        };
    }
}

impl OceanSurface for Ocean {
    fn level(&self) -> f64 {
        self.level
    }
}
