use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ActionKind, ScheduledAction, SimulationConfig, TurbineConfig};
use crate::host::{Clock, DisplayText, HostBehaviour, Ocean, OceanSurface, SimClock};
use crate::observation::{Event, Logbook, Snapshot, TurbineRecord};
use crate::observer::{FarmView, TurbineView};
use crate::turbine::power::SATURATION_HEIGHT;
use crate::turbine::{PerlinWind, WindTurbine};

/// Scattered turbines get blade heights up to this far above the surface
const SCATTER_HEIGHT_SPAN: f64 = SATURATION_HEIGHT + 5.0;

/// The scheduler: owns the turbines, the clock and the ocean
pub struct Engine {
    config: SimulationConfig,
    turbine_config: Arc<TurbineConfig>,
    wind: Arc<PerlinWind>,
    clock: SimClock,
    ocean: Ocean,
    turbines: Vec<WindTurbine>,
    /// Every turbine ever placed, in placement order
    roster: Vec<Uuid>,
    logbook: Logbook,
}

impl Engine {
    /// Create a new engine writing its output to `output_dir`
    pub fn new(config: SimulationConfig, output_dir: impl AsRef<Path>) -> Result<Self> {
        config.validate()?;

        let turbine_config = Arc::new(config.turbine.clone());
        let wind = Arc::new(PerlinWind::new());
        let clock = SimClock::from_params(&config.simulation);
        let ocean = Ocean::new(config.ocean.clone());
        let logbook = Logbook::new(output_dir)?;

        let mut engine = Self {
            config,
            turbine_config,
            wind,
            clock,
            ocean,
            turbines: Vec::new(),
            roster: Vec::new(),
            logbook,
        };
        engine.place_turbines();
        Ok(engine)
    }

    fn place_turbines(&mut self) {
        if !self.config.placements.is_empty() {
            let placements = self.config.placements.clone();
            for p in placements {
                let id = self.add_turbine(p.x, p.z, p.height);
                if p.constructed {
                    self.construct(id);
                }
            }
            return;
        }

        let params = &self.config.simulation;
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let half = params.area / 2.0;
        let surface = self.ocean.level();
        let spots: Vec<(f64, f64, f64)> = (0..params.count)
            .map(|_| {
                (
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(surface..surface + SCATTER_HEIGHT_SPAN),
                )
            })
            .collect();
        for (x, z, height) in spots {
            let id = self.add_turbine(x, z, height);
            self.construct(id);
        }
    }

    fn add_turbine(&mut self, x: f64, z: f64, height: f64) -> Uuid {
        let turbine = WindTurbine::new(self.turbine_config.clone(), self.wind.clone(), x, z, height);
        let id = turbine.id;
        self.roster.push(id);
        self.logbook.register(id, format!("turbine-{}", self.roster.len()));
        self.turbines.push(turbine);
        id
    }

    fn turbine_mut(&mut self, id: Uuid) -> Option<&mut WindTurbine> {
        self.turbines.iter_mut().find(|t| t.id == id)
    }

    // ==================== Host events ====================

    /// Finish construction of a turbine site
    pub fn construct(&mut self, id: Uuid) -> bool {
        let (tick, time) = (self.clock.ticks(), self.clock.now());
        let Some(turbine) = self.turbine_mut(id) else {
            return false;
        };
        if turbine.state().constructed {
            return false;
        }
        turbine.complete_construction();
        self.track(Event::constructed(tick, time, id));
        true
    }

    /// Player click on a turbine
    pub fn interact(&mut self, id: Uuid) -> bool {
        let (tick, time) = (self.clock.ticks(), self.clock.now());
        let Some(turbine) = self.turbines.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        turbine.on_interact(&self.clock);
        self.track(Event::interacted(tick, time, id));
        true
    }

    /// External damage to a turbine
    pub fn damage(&mut self, id: Uuid, amount: f64) -> bool {
        match self.turbine_mut(id) {
            Some(turbine) => {
                turbine.take_damage(amount);
                true
            }
            None => false,
        }
    }

    /// Repair a turbine; returns the health restored
    pub fn repair(&mut self, id: Uuid, amount: f64) -> Option<f64> {
        let (tick, time) = (self.clock.ticks(), self.clock.now());
        let turbine = self.turbine_mut(id)?;
        let restored = turbine.repair(amount);
        let health = turbine.state().health.health();
        self.track(Event::repaired(tick, time, id, restored, health));
        Some(restored)
    }

    /// Remove a turbine; it stops updating immediately
    pub fn demolish(&mut self, id: Uuid) -> bool {
        let before = self.turbines.len();
        self.turbines.retain(|t| t.id != id);
        if self.turbines.len() == before {
            return false;
        }
        self.track(Event::demolished(self.clock.ticks(), self.clock.now(), id));
        true
    }

    /// Hover readout for a turbine
    pub fn hover(&self, id: Uuid) -> Option<DisplayText> {
        self.turbines
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| t.on_hover_query(&self.ocean))
    }

    // ==================== Observer interface ====================

    pub fn turbine_ids(&self) -> Vec<Uuid> {
        self.turbines.iter().map(|t| t.id).collect()
    }

    pub fn turbine_views(&self) -> Vec<TurbineView> {
        let surface = self.ocean.level();
        self.turbines
            .iter()
            .map(|t| TurbineView::from_turbine(t, surface))
            .collect()
    }

    pub fn turbine_view(&self, id: Uuid) -> Option<TurbineView> {
        self.turbines
            .iter()
            .find(|t| t.id == id)
            .map(|t| TurbineView::from_turbine(t, self.ocean.level()))
    }

    pub fn farm_view(&self) -> FarmView {
        FarmView::from_views(
            self.clock.ticks(),
            self.clock.now(),
            self.ocean.level(),
            &self.turbine_views(),
        )
    }

    pub fn tick(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn is_complete(&self) -> bool {
        self.clock.ticks() >= self.config.simulation.ticks as u64
    }

    // ==================== Simulation ====================

    /// Record an event; I/O failures are logged, never fatal for host events
    fn track(&mut self, event: Event) {
        if let Err(e) = self.logbook.log_event(&event) {
            warn!("Failed to log event: {}", e);
        }
    }

    fn apply(&mut self, action: &ScheduledAction) {
        let Some(&id) = action.turbine.checked_sub(1).and_then(|i| self.roster.get(i)) else {
            warn!("Action for unknown turbine {} ignored", action.turbine);
            return;
        };
        let applied = match action.kind {
            ActionKind::Construct => self.construct(id),
            ActionKind::Interact => self.interact(id),
            ActionKind::Damage => self.damage(id, action.amount),
            ActionKind::Repair => self.repair(id, action.amount).is_some(),
            ActionKind::Demolish => self.demolish(id),
        };
        if applied {
            debug!("Applied {:?} to turbine-{}", action.kind, action.turbine);
        } else {
            debug!("{:?} on turbine-{} had no effect", action.kind, action.turbine);
        }
    }

    /// Advance every turbine by one tick
    pub fn step(&mut self) -> Result<()> {
        self.clock.advance();
        self.ocean.update(self.clock.now());

        let tick = self.clock.ticks();
        let due: Vec<ScheduledAction> = self
            .config
            .actions
            .iter()
            .filter(|a| a.tick == tick)
            .cloned()
            .collect();
        for action in &due {
            self.apply(action);
        }

        let time = self.clock.now();
        let load = self.config.simulation.load * self.clock.delta_time();
        let auto_repair = self.config.simulation.auto_repair;
        let mut events = Vec::new();

        for turbine in &mut self.turbines {
            let report = turbine.on_tick(&self.clock, &self.ocean);
            if let Some(previous) = report.previous {
                events.push(Event::status_changed(
                    tick,
                    time,
                    turbine.id,
                    previous,
                    report.status,
                    turbine.state().health.health(),
                ));
            }

            if load > 0.0 {
                turbine.supply(load);
            }

            if auto_repair && turbine.needs_maintenance() {
                let restored = turbine.repair(turbine.state().health.max_health());
                events.push(Event::repaired(
                    tick,
                    time,
                    turbine.id,
                    restored,
                    turbine.state().health.health(),
                ));
            }
        }

        for event in &events {
            self.logbook.log_event(event)?;
        }

        let interval = self.config.simulation.snapshot_interval as u64;
        if interval > 0 && tick % interval == 0 {
            self.save_snapshot()?;
        }
        Ok(())
    }

    /// Capture the full farm state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            recorded_at: Utc::now(),
            farm: self.farm_view(),
            turbines: self
                .turbines
                .iter()
                .map(|t| TurbineRecord {
                    id: t.id,
                    state: t.state().clone(),
                })
                .collect(),
        }
    }

    fn save_snapshot(&self) -> Result<()> {
        let path = self.logbook.save_snapshot(&self.snapshot())?;
        debug!("Snapshot saved to {}", path.display());
        Ok(())
    }

    /// Replace all turbines with the ones saved in `snapshot`
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.clock.set_ticks(snapshot.farm.tick);
        self.ocean.update(self.clock.now());
        self.roster = snapshot.turbines.iter().map(|r| r.id).collect();
        self.turbines = snapshot
            .turbines
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                self.logbook.register(record.id, format!("turbine-{}", i + 1));
                WindTurbine::restore(record.id, record.state, self.turbine_config.clone(), self.wind.clone())
            })
            .collect();
        info!(
            "Restored {} turbines at tick {}",
            self.turbines.len(),
            self.clock.ticks()
        );
    }

    /// Write the start event and the initial snapshot
    pub fn initialize(&mut self) -> Result<()> {
        let name = self.config.name.clone();
        self.logbook
            .log_event(&Event::simulation_start(&name, self.turbines.len()))?;
        self.save_snapshot()?;
        Ok(())
    }

    /// Write the final snapshot and summary
    pub fn finalize(&mut self) -> Result<()> {
        self.logbook
            .log_event(&Event::simulation_end(self.clock.ticks(), self.clock.now()))?;
        self.save_snapshot()?;
        let views = self.turbine_views();
        let farm = self.farm_view();
        self.logbook.write_summary(&self.config.name, &farm, &views)?;
        Ok(())
    }

    /// Run the simulation to completion
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting simulation: {} turbines, {} ticks of {}s",
            self.turbines.len(),
            self.config.simulation.ticks,
            self.config.simulation.tick_seconds
        );

        self.initialize()?;

        let mut pacer = self
            .config
            .simulation
            .realtime
            .then(|| tokio::time::interval(Duration::from_secs_f64(self.config.simulation.tick_seconds)));

        while !self.is_complete() {
            if let Some(pacer) = pacer.as_mut() {
                pacer.tick().await;
            }
            self.step()?;
        }

        self.finalize()?;

        let farm = self.farm_view();
        info!(
            "Simulation finished at tick {}: {:.2}/s total generation, {} needing maintenance",
            farm.tick, farm.total_generation_rate, farm.needing_maintenance
        );
        info!("Summary written to {}", self.logbook.output_dir().join("summary.md").display());
        Ok(())
    }
}
