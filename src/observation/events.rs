use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::turbine::TurbineStatus;

/// A simulation event for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub tick: u64,
    pub time: f64,
    pub event_type: EventType,
    pub turbine: Option<Uuid>,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    Constructed,
    StatusChanged,
    Repaired,
    Interacted,
    Demolished,

    // Meta
    SimulationStart,
    SimulationEnd,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<TurbineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<TurbineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EventData {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Event {
    fn new(tick: u64, time: f64, event_type: EventType, turbine: Option<Uuid>, data: EventData) -> Self {
        Self {
            tick,
            time,
            event_type,
            turbine,
            data,
        }
    }

    pub fn simulation_start(name: &str, turbines: usize) -> Self {
        Self::new(
            0,
            0.0,
            EventType::SimulationStart,
            None,
            EventData {
                description: Some(format!("{} with {} turbines", name, turbines)),
                ..EventData::empty()
            },
        )
    }

    pub fn simulation_end(tick: u64, time: f64) -> Self {
        Self::new(tick, time, EventType::SimulationEnd, None, EventData::empty())
    }

    pub fn constructed(tick: u64, time: f64, turbine: Uuid) -> Self {
        Self::new(tick, time, EventType::Constructed, Some(turbine), EventData::empty())
    }

    pub fn status_changed(
        tick: u64,
        time: f64,
        turbine: Uuid,
        from: TurbineStatus,
        to: TurbineStatus,
        health: f64,
    ) -> Self {
        Self::new(
            tick,
            time,
            EventType::StatusChanged,
            Some(turbine),
            EventData {
                from: Some(from),
                to: Some(to),
                health: Some(health),
                ..EventData::empty()
            },
        )
    }

    pub fn repaired(tick: u64, time: f64, turbine: Uuid, amount: f64, health: f64) -> Self {
        Self::new(
            tick,
            time,
            EventType::Repaired,
            Some(turbine),
            EventData {
                amount: Some(amount),
                health: Some(health),
                ..EventData::empty()
            },
        )
    }

    pub fn interacted(tick: u64, time: f64, turbine: Uuid) -> Self {
        Self::new(tick, time, EventType::Interacted, Some(turbine), EventData::empty())
    }

    pub fn demolished(tick: u64, time: f64, turbine: Uuid) -> Self {
        Self::new(tick, time, EventType::Demolished, Some(turbine), EventData::empty())
    }

    /// Human-readable line for the summary (None for routine events)
    pub fn narrate(&self, name: &str) -> Option<String> {
        match &self.event_type {
            EventType::StatusChanged => {
                let to = self.data.to?;
                let health = self.data.health.unwrap_or(0.0);
                Some(match to {
                    TurbineStatus::NeedsMaintenance => {
                        format!("t={:.1}s **{}** needs maintenance ({:.1} health).", self.time, name, health)
                    }
                    TurbineStatus::Submerged => {
                        format!("t={:.1}s **{}** went under the surface.", self.time, name)
                    }
                    TurbineStatus::Active if self.data.from == Some(TurbineStatus::Submerged) => {
                        format!("t={:.1}s **{}** is back above the water.", self.time, name)
                    }
                    _ => return None,
                })
            }
            EventType::Repaired => {
                let amount = self.data.amount?;
                Some(format!("t={:.1}s **{}** repaired by {:.0}.", self.time, name, amount))
            }
            EventType::Demolished => Some(format!("t={:.1}s **{}** was demolished.", self.time, name)),
            _ => None,
        }
    }
}
