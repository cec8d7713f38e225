use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub name: String,
    pub turbine: TurbineConfig,
    pub ocean: OceanConfig,
    pub simulation: SimulationParams,
    /// Explicit turbine placements (if empty, turbines are scattered)
    pub placements: Vec<Placement>,
    /// Host events to replay during the run
    pub actions: Vec<ScheduledAction>,
}

/// How generated power turns into wear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearBasis {
    /// Power the sink could not absorb
    #[default]
    Overflow,
    /// Power the sink actually absorbed
    Accepted,
}

/// Turbine behaviour settings, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineConfig {
    /// Capacity of the turbine's internal battery
    #[serde(alias = "MaxPower")]
    pub max_power: f64,
    /// Multiplier applied to every unit of generated power
    #[serde(alias = "PowerProductionScale")]
    pub power_production_scale: f64,
    /// Whether generation wears the structure down
    #[serde(alias = "TurbineTakesDamage")]
    pub turbine_takes_damage: bool,
    /// Seconds of worst-case wear before health runs out
    #[serde(alias = "SecondsUntilNeedMaintenance")]
    pub seconds_until_need_maintenance: f64,
    /// Whether the turbine plays its looping sound
    #[serde(alias = "TurbineMakesNoise")]
    pub turbine_makes_noise: bool,
    /// Whether position-dependent wind scales output
    #[serde(alias = "PositionInfluencesPower")]
    pub position_influences_power: bool,
    #[serde(alias = "MaxHealth")]
    pub max_health: f64,
    /// Health below which generation halts until repaired
    #[serde(alias = "MaintenanceThreshold")]
    pub maintenance_threshold: f64,
    #[serde(alias = "WearBasis")]
    pub wear_basis: WearBasis,
}

impl Default for TurbineConfig {
    fn default() -> Self {
        Self {
            max_power: 750.0,
            power_production_scale: 1.0,
            turbine_takes_damage: true,
            seconds_until_need_maintenance: 3600.0,
            turbine_makes_noise: true,
            position_influences_power: true,
            max_health: 200.0,
            maintenance_threshold: 10.0,
            wear_basis: WearBasis::Overflow,
        }
    }
}

impl TurbineConfig {
    /// Load turbine settings on their own.
    ///
    /// `.json` and `.txt` files are read as the legacy JSON format, anything
    /// else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") | Some("txt") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("max_power", self.max_power),
            ("power_production_scale", self.power_production_scale),
            ("seconds_until_need_maintenance", self.seconds_until_need_maintenance),
            ("max_health", self.max_health),
            ("maintenance_threshold", self.maintenance_threshold),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not finite")));
            }
        }
        if self.max_power < 0.0 {
            return Err(invalid("max_power", "must not be negative".into()));
        }
        if self.power_production_scale < 0.0 {
            return Err(invalid("power_production_scale", "must not be negative".into()));
        }
        if self.seconds_until_need_maintenance <= 0.0 {
            return Err(invalid("seconds_until_need_maintenance", "must be positive".into()));
        }
        if self.max_health <= 0.0 {
            return Err(invalid("max_health", "must be positive".into()));
        }
        if !(0.0..=self.max_health).contains(&self.maintenance_threshold) {
            return Err(invalid(
                "maintenance_threshold",
                format!("must lie within 0..={}", self.max_health),
            ));
        }
        Ok(())
    }
}

/// Reference surface the turbine altitude is measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Mean surface height
    pub level: f64,
    /// Tide amplitude (0 = flat sea)
    pub tide_amplitude: f64,
    /// Seconds per full tide cycle
    pub tide_period: f64,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            level: 0.0,
            tide_amplitude: 0.0,
            tide_period: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of ticks to run
    pub ticks: usize,
    /// Real seconds per tick
    pub tick_seconds: f64,
    /// Game seconds elapsed per real second
    pub game_time_scale: f64,
    /// Turbines to scatter when no placements are given
    pub count: usize,
    /// Side length of the square area turbines are scattered over
    pub area: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// How many ticks between full snapshots (0 = only first and last)
    pub snapshot_interval: usize,
    /// Power per second consumers draw from each turbine
    pub load: f64,
    /// Repair turbines to full health as soon as they need maintenance
    pub auto_repair: bool,
    /// Pace ticks against the wall clock
    pub realtime: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_seconds: 0.5,
            game_time_scale: 1.0,
            count: 4,
            area: 2000.0,
            seed: None,
            snapshot_interval: 120,
            load: 0.0,
            auto_repair: false,
            realtime: false,
        }
    }
}

/// A fixed turbine location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub z: f64,
    /// Height of the blades
    pub height: f64,
    #[serde(default = "default_true")]
    pub constructed: bool,
}

/// Host events a scripted run can fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Construct,
    Interact,
    Damage,
    Repair,
    Demolish,
}

/// A host event fired just before the given tick is simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub tick: u64,
    /// 1-based turbine number, in placement order
    pub turbine: usize,
    pub kind: ActionKind,
    /// Health for damage and repair
    #[serde(default)]
    pub amount: f64,
}

fn default_true() -> bool {
    true
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = read(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_with(count: usize, ticks: usize, seed: Option<u64>) -> Self {
        Self {
            name: "Untitled Wind Farm".to_string(),
            simulation: SimulationParams {
                count,
                ticks,
                seed,
                ..SimulationParams::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.turbine.validate()?;
        let sim = &self.simulation;
        if !(sim.tick_seconds.is_finite() && sim.tick_seconds > 0.0) {
            return Err(invalid("simulation.tick_seconds", "must be positive".into()));
        }
        if !(sim.game_time_scale.is_finite() && sim.game_time_scale >= 0.0) {
            return Err(invalid("simulation.game_time_scale", "must not be negative".into()));
        }
        if !(sim.area.is_finite() && sim.area > 0.0) {
            return Err(invalid("simulation.area", "must be positive".into()));
        }
        if !(sim.load.is_finite() && sim.load >= 0.0) {
            return Err(invalid("simulation.load", "must not be negative".into()));
        }
        for action in &self.actions {
            if action.turbine == 0 {
                return Err(invalid("actions.turbine", "turbine numbers start at 1".into()));
            }
            if !(action.amount.is_finite() && action.amount >= 0.0) {
                return Err(invalid("actions.amount", "must not be negative".into()));
            }
        }
        if self.ocean.tide_amplitude != 0.0 && self.ocean.tide_period <= 0.0 {
            return Err(invalid("ocean.tide_period", "must be positive when tides are enabled".into()));
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TurbineConfig::default().validate().is_ok());
        assert!(SimulationConfig::default_with(3, 10, Some(7)).validate().is_ok());
    }

    #[test]
    fn test_legacy_json_keys() {
        let json = r#"{
            "MaxPower": 500,
            "PowerProductionScale": 2.0,
            "TurbineTakesDamage": false,
            "SecondsUntilNeedMaintenance": 1200,
            "TurbineMakesNoise": false,
            "PositionInfluencesPower": false
        }"#;
        let config: TurbineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_power, 500.0);
        assert_eq!(config.power_production_scale, 2.0);
        assert!(!config.turbine_takes_damage);
        assert_eq!(config.seconds_until_need_maintenance, 1200.0);
        assert!(!config.turbine_makes_noise);
        assert!(!config.position_influences_power);
        // Fields the legacy file never had keep their defaults
        assert_eq!(config.max_health, 200.0);
        assert_eq!(config.maintenance_threshold, 10.0);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            name = "Cliffs"

            [turbine]
            max_power = 300.0
            wear_basis = "accepted"

            [simulation]
            ticks = 20

            [[placements]]
            x = 10.0
            z = -4.0
            height = 30.0

            [[actions]]
            tick = 5
            turbine = 1
            kind = "repair"
            amount = 50.0
        "#;
        let config: SimulationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.name, "Cliffs");
        assert_eq!(config.turbine.max_power, 300.0);
        assert_eq!(config.turbine.wear_basis, WearBasis::Accepted);
        assert!(config.turbine.turbine_takes_damage);
        assert_eq!(config.simulation.ticks, 20);
        assert_eq!(config.simulation.tick_seconds, 0.5);
        assert_eq!(config.placements.len(), 1);
        assert!(config.placements[0].constructed);
        assert_eq!(config.actions[0].kind, ActionKind::Repair);
        assert_eq!(config.actions[0].amount, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_maintenance_time() {
        let config = TurbineConfig {
            seconds_until_need_maintenance: 0.0,
            ..TurbineConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => {
                assert_eq!(field, "seconds_until_need_maintenance")
            }
            other => panic!("expected invalid field, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_threshold_above_max_health() {
        let config = TurbineConfig {
            maintenance_threshold: 250.0,
            ..TurbineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_selects_format_by_extension() {
        let dir = std::env::temp_dir().join(format!("windmill-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let json_path = dir.join("config.txt");
        std::fs::write(&json_path, r#"{"MaxPower": 120}"#).unwrap();
        assert_eq!(TurbineConfig::from_file(&json_path).unwrap().max_power, 120.0);

        let toml_path = dir.join("turbine.toml");
        std::fs::write(&toml_path, "max_power = 80.0\n").unwrap();
        assert_eq!(TurbineConfig::from_file(&toml_path).unwrap().max_power, 80.0);

        let missing = TurbineConfig::from_file(dir.join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
