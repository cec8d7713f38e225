//! Structural wear and maintenance.

use serde::{Deserialize, Serialize};

use crate::config::TurbineConfig;

/// Sink power per point of wear
const WEAR_DIVISOR: f64 = 15.0;

/// Structure health of a turbine.
///
/// Generation wears the structure down; once health falls below the
/// maintenance threshold the turbine stops until it is repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineHealth {
    health: f64,
    max_health: f64,
    threshold: f64,
}

impl TurbineHealth {
    /// Full health for the given configuration
    pub fn new(config: &TurbineConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            threshold: config.maintenance_threshold,
        }
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Below the maintenance threshold (ignores whether damage is enabled)
    pub fn is_worn_out(&self) -> bool {
        self.health < self.threshold
    }

    /// Convert one tick's sink reading into wear.
    ///
    /// Wear is `sink_amount / 15`, applied only while the projected health
    /// stays positive. Returns the wear applied.
    pub fn accrue(&mut self, sink_amount: f64, config: &TurbineConfig) -> f64 {
        if !config.turbine_takes_damage {
            return 0.0;
        }
        let wear = (sink_amount / WEAR_DIVISOR).max(0.0);
        if self.health - wear > 0.0 {
            self.take_damage(wear);
            wear
        } else {
            0.0
        }
    }

    pub fn take_damage(&mut self, amount: f64) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
    }

    /// Raise health (returns actual amount restored)
    pub fn repair(&mut self, amount: f64) -> f64 {
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        self.health - before
    }

    /// Health as a percentage of maximum
    pub fn percent(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health * 100.0
    }
}
