//! Power sinks: where generated energy ends up.

use serde::{Deserialize, Serialize};

/// A capacity-limited accumulator that absorbs generated power
pub trait PowerSink {
    /// Offer `amount` of power, returning how much was actually absorbed
    fn try_accept(&mut self, amount: f64) -> f64;

    /// Currently stored power
    fn power(&self) -> f64;

    /// Storage capacity
    fn max_power(&self) -> f64;
}

/// The turbine's internal battery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSource {
    power: f64,
    max_power: f64,
}

impl PowerSource {
    pub fn new(max_power: f64) -> Self {
        Self {
            power: 0.0,
            max_power: max_power.max(0.0),
        }
    }

    /// Draw power out for consumers (returns actual drawn)
    pub fn draw(&mut self, amount: f64) -> f64 {
        let drawn = amount.clamp(0.0, self.power);
        self.power -= drawn;
        drawn
    }
}

impl PowerSink for PowerSource {
    fn try_accept(&mut self, amount: f64) -> f64 {
        let space = (self.max_power - self.power).max(0.0);
        let accepted = amount.clamp(0.0, space);
        self.power += accepted;
        accepted
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn max_power(&self) -> f64 {
        self.max_power
    }
}
