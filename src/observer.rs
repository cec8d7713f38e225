//! Read-only views of turbine state for display clients.
//!
//! The views are snapshots that decouple displays from the simulation
//! internals.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::turbine::{PowerSink, TurbineStatus, WindTurbine, RELAY_RANGE};

/// View of a single turbine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurbineView {
    pub id: Uuid,
    pub position: (f64, f64),
    pub height: f64,
    pub status: TurbineStatus,

    // Readout
    pub generation_rate: f64,
    pub efficiency_percent: i64,
    pub current_power: f64,
    pub max_power: f64,
    pub needs_maintenance: bool,

    // Structure
    pub health: f64,
    pub max_health: f64,
    pub health_percent: f64,
    pub spin_speed: f64,
    pub relay_range: f64,
}

impl TurbineView {
    pub fn from_turbine(turbine: &WindTurbine, surface: f64) -> Self {
        let state = turbine.state();
        let efficiency_percent = if state.constructed && !state.is_submerged(surface) {
            turbine.efficiency_percent(surface)
        } else {
            0
        };
        Self {
            id: turbine.id,
            position: state.position,
            height: state.height,
            status: state.status,
            generation_rate: state.generation_rate(),
            efficiency_percent,
            current_power: state.battery.power(),
            max_power: state.battery.max_power(),
            needs_maintenance: turbine.needs_maintenance(),
            health: state.health.health(),
            max_health: state.health.max_health(),
            health_percent: state.health.percent(),
            spin_speed: state.spin_speed,
            relay_range: RELAY_RANGE,
        }
    }

    /// One-line summary, e.g. for logs and reports
    pub fn summary(&self) -> String {
        format!(
            "{} at ({:.0}, {:.0}) h={:.1}: {}, {}% efficiency, {:.0}/{:.0} power, {:.2}/s, {:.0}% health",
            short_id(self.id),
            self.position.0,
            self.position.1,
            self.height,
            self.status.describe(),
            self.efficiency_percent,
            self.current_power,
            self.max_power,
            self.generation_rate,
            self.health_percent
        )
    }
}

/// Totals across all turbines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmView {
    pub tick: u64,
    pub time: f64,
    pub ocean_level: f64,
    pub turbines: usize,
    pub active: usize,
    pub needing_maintenance: usize,
    pub total_generation_rate: f64,
    pub total_stored: f64,
}

impl FarmView {
    pub fn from_views(tick: u64, time: f64, ocean_level: f64, views: &[TurbineView]) -> Self {
        Self {
            tick,
            time,
            ocean_level,
            turbines: views.len(),
            active: views.iter().filter(|v| v.status == TurbineStatus::Active).count(),
            needing_maintenance: views.iter().filter(|v| v.needs_maintenance).count(),
            total_generation_rate: views.iter().map(|v| v.generation_rate).sum(),
            total_stored: views.iter().map(|v| v.current_power).sum(),
        }
    }
}

pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
