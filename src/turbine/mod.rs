//! Wind turbine entity.
//!
//! A turbine is built from a pole, three blades and a generator. Once
//! constructed it generates power every tick depending on:
//! - **Altitude**: blade height above the ocean surface
//! - **Wind**: a position-dependent multiplier
//! - **Wear**: with damage enabled, a worn-out turbine stops until repaired
//!
//! Clicking a running turbine spins the blades at full speed for a second.
//! Gating order: unbuilt, needs maintenance, submerged, then the click
//! override.

pub mod health;
pub mod power;
pub mod profiler;
pub mod sink;
pub mod wind;

pub use health::TurbineHealth;
pub use power::{Delivery, PowerInputs, PowerOutput};
pub use profiler::ProfilingWindow;
pub use sink::{PowerSink, PowerSource};
pub use wind::{CoherentNoise, PerlinWind};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::{TurbineConfig, WearBasis};
use crate::host::{Clock, DisplayText, HostBehaviour, HoverIcon, OceanSurface};

/// Blade speed while the interaction override runs
pub const INTERACTION_SPIN: f64 = 1000.0;
/// Seconds the interaction override lasts
pub const INTERACTION_COOLDOWN: f64 = 1.0;
/// Reach of the power relay to nearby consumers
pub const RELAY_RANGE: f64 = 50.0;

/// Which units run this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurbineStatus {
    /// Still a construction site
    Unbuilt,
    /// Generating
    Active,
    /// Blades at or below the surface
    Submerged,
    /// Worn out, waiting for repair
    NeedsMaintenance,
    /// Spinning from a click; generation paused
    InteractionCooldown,
}

impl TurbineStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            TurbineStatus::Unbuilt => "unbuilt",
            TurbineStatus::Active => "active",
            TurbineStatus::Submerged => "submerged",
            TurbineStatus::NeedsMaintenance => "needs maintenance",
            TurbineStatus::InteractionCooldown => "spinning",
        }
    }
}

/// Looping turbine sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioLoop {
    pub playing: bool,
    pub volume: f64,
}

impl AudioLoop {
    fn new() -> Self {
        Self { playing: true, volume: 1.0 }
    }
}

/// Everything a turbine owns; the unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineState {
    /// Blade height
    pub height: f64,
    /// Horizontal position (x, z)
    pub position: (f64, f64),
    pub constructed: bool,
    pub battery: PowerSource,
    pub health: TurbineHealth,
    pub profile: ProfilingWindow,
    pub status: TurbineStatus,
    pub spin_speed: f64,
    /// End of the current interaction override
    pub interaction_ends_at: Option<f64>,
    /// None when the turbine is configured silent
    pub audio: Option<AudioLoop>,
}

impl TurbineState {
    fn new(config: &TurbineConfig, x: f64, z: f64, height: f64) -> Self {
        Self {
            height,
            position: (x, z),
            constructed: false,
            battery: PowerSource::new(config.max_power),
            health: TurbineHealth::new(config),
            profile: ProfilingWindow::new(),
            status: TurbineStatus::Unbuilt,
            spin_speed: 0.0,
            interaction_ends_at: None,
            audio: config.turbine_makes_noise.then(AudioLoop::new),
        }
    }

    pub fn is_submerged(&self, surface: f64) -> bool {
        power::is_submerged(self.height, surface)
    }

    pub fn generation_rate(&self) -> f64 {
        self.profile.generation_rate()
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub status: TurbineStatus,
    /// Set when the status differs from the previous tick
    pub previous: Option<TurbineStatus>,
    pub output: PowerOutput,
    pub delivery: Delivery,
    pub wear: f64,
}

/// A placed wind turbine
pub struct WindTurbine {
    pub id: Uuid,
    config: Arc<TurbineConfig>,
    wind: Arc<dyn CoherentNoise + Send + Sync>,
    state: TurbineState,
}

impl WindTurbine {
    /// A turbine construction site at (x, z) with blades at `height`
    pub fn new(
        config: Arc<TurbineConfig>,
        wind: Arc<dyn CoherentNoise + Send + Sync>,
        x: f64,
        z: f64,
        height: f64,
    ) -> Self {
        let state = TurbineState::new(&config, x, z, height);
        Self {
            id: Uuid::new_v4(),
            config,
            wind,
            state,
        }
    }

    /// Rebuild a turbine from saved state
    pub fn restore(
        id: Uuid,
        state: TurbineState,
        config: Arc<TurbineConfig>,
        wind: Arc<dyn CoherentNoise + Send + Sync>,
    ) -> Self {
        Self { id, config, wind, state }
    }

    pub fn state(&self) -> &TurbineState {
        &self.state
    }

    /// Construction finished: the turbine starts at full health
    pub fn complete_construction(&mut self) {
        if self.state.constructed {
            return;
        }
        self.state.constructed = true;
        self.state.health = TurbineHealth::new(&self.config);
        debug!("Turbine {} constructed at {:?}", self.id, self.state.position);
    }

    pub fn needs_maintenance(&self) -> bool {
        self.config.turbine_takes_damage && self.state.health.is_worn_out()
    }

    /// Apply external damage
    pub fn take_damage(&mut self, amount: f64) {
        self.state.health.take_damage(amount);
    }

    /// Repair with a repair tool (returns health restored)
    pub fn repair(&mut self, amount: f64) -> f64 {
        let restored = self.state.health.repair(amount);
        debug!(
            "Turbine {} repaired by {:.1} to {:.1}",
            self.id,
            restored,
            self.state.health.health()
        );
        restored
    }

    /// Hand stored power to connected consumers (returns actual supplied)
    pub fn supply(&mut self, amount: f64) -> f64 {
        self.state.battery.draw(amount)
    }

    /// Which units should run at time `now`
    pub fn status(&self, now: f64, surface: f64) -> TurbineStatus {
        if !self.state.constructed {
            TurbineStatus::Unbuilt
        } else if self.needs_maintenance() {
            TurbineStatus::NeedsMaintenance
        } else if self.state.is_submerged(surface) {
            TurbineStatus::Submerged
        } else if self.state.interaction_ends_at.is_some_and(|end| now <= end) {
            TurbineStatus::InteractionCooldown
        } else {
            TurbineStatus::Active
        }
    }

    /// Current altitude and wind factors
    pub fn efficiency(&self, surface: f64) -> (f64, f64) {
        let (x, z) = self.state.position;
        (
            power::depth_scalar(self.state.height, surface),
            wind::spatial_multiplier(self.wind.as_ref(), x, z, self.config.position_influences_power),
        )
    }

    pub fn efficiency_percent(&self, surface: f64) -> i64 {
        let (depth, wind) = self.efficiency(surface);
        power::efficiency_percent(depth, wind)
    }

    fn set_audio(&mut self, playing: bool, volume: Option<f64>) {
        if let Some(audio) = self.state.audio.as_mut() {
            audio.playing = playing;
            if let Some(volume) = volume {
                audio.volume = volume;
            }
        }
    }

    fn generate(&mut self, clock: &dyn Clock, surface: f64) -> (PowerOutput, Delivery, f64) {
        let (x, z) = self.state.position;
        let inputs = PowerInputs {
            height: self.state.height,
            surface,
            x,
            z,
            dt: clock.game_delta_time(),
        };
        let output = power::simulate(&inputs, self.wind.as_ref(), &self.config);
        let delivery = power::deliver(&output, &mut self.state.battery);

        let wear_source = match self.config.wear_basis {
            WearBasis::Overflow => delivery.overflow,
            WearBasis::Accepted => delivery.accepted,
        };
        let wear = self.state.health.accrue(wear_source, &self.config);

        self.state.spin_speed = output.spin_speed;
        self.set_audio(true, Some(output.volume));
        (output, delivery, wear)
    }

    fn record_transition(&mut self, status: TurbineStatus) -> Option<TurbineStatus> {
        let previous = self.state.status;
        if previous == status {
            return None;
        }
        self.state.status = status;
        match status {
            TurbineStatus::NeedsMaintenance => warn!(
                "Turbine {} needs maintenance (health {:.1})",
                self.id,
                self.state.health.health()
            ),
            _ => debug!(
                "Turbine {}: {} -> {}",
                self.id,
                previous.describe(),
                status.describe()
            ),
        }
        Some(previous)
    }
}

impl HostBehaviour for WindTurbine {
    type Report = TickReport;

    fn on_tick(&mut self, clock: &dyn Clock, ocean: &dyn OceanSurface) -> TickReport {
        let surface = ocean.level();
        let status = self.status(clock.now(), surface);
        let previous = self.record_transition(status);

        let mut output = PowerOutput::idle();
        let mut delivery = Delivery::default();
        let mut wear = 0.0;

        match status {
            TurbineStatus::Unbuilt => {
                self.state.spin_speed = 0.0;
            }
            TurbineStatus::NeedsMaintenance => {
                self.state.spin_speed = 0.0;
                self.set_audio(false, None);
            }
            // The override spin keeps going; nothing else runs
            TurbineStatus::InteractionCooldown => {}
            TurbineStatus::Submerged => {
                self.state.spin_speed = 0.0;
                self.set_audio(false, None);
            }
            TurbineStatus::Active => {
                (output, delivery, wear) = self.generate(clock, surface);
            }
        }

        if self.state.constructed {
            self.state.profile.record(output.power_generated, clock.delta_time());
        }

        trace!(
            "Turbine {} tick: status={:?} generated={:.4} accepted={:.4} wear={:.4}",
            self.id,
            status,
            output.power_generated,
            delivery.accepted,
            wear
        );

        TickReport {
            status,
            previous,
            output,
            delivery,
            wear,
        }
    }

    fn on_hover_query(&self, ocean: &dyn OceanSurface) -> Option<DisplayText> {
        if !self.state.constructed {
            return None;
        }
        let surface = ocean.level();
        if self.state.is_submerged(surface) {
            return Some(DisplayText {
                primary: "Wind Turbine: 0% efficiency".to_string(),
                secondary: "Notice: Blades are submerged, please relocate".to_string(),
                icon: HoverIcon::HandDeny,
                display_time: 1.0,
            });
        }

        let primary = format!(
            "Wind Turbine: {}% efficiency, {}/{} power",
            self.efficiency_percent(surface),
            self.state.battery.power().round() as i64,
            self.state.battery.max_power().round() as i64
        );
        let text = if self.needs_maintenance() {
            DisplayText {
                primary,
                secondary: "Needs maintenance (use repair tool)".to_string(),
                icon: HoverIcon::Info,
                display_time: 1.5,
            }
        } else {
            DisplayText {
                primary,
                secondary: format!("Generation: {:.2}/s", self.state.generation_rate()),
                icon: HoverIcon::Info,
                display_time: 1.0,
            }
        };
        Some(text)
    }

    fn on_interact(&mut self, clock: &dyn Clock) {
        if !self.state.constructed || self.needs_maintenance() {
            debug!("Turbine {} ignored click ({})", self.id, self.state.status.describe());
            return;
        }
        self.state.spin_speed = INTERACTION_SPIN;
        self.state.interaction_ends_at = Some(clock.now() + INTERACTION_COOLDOWN);
        debug!("Turbine {} clicked", self.id);
    }
}
