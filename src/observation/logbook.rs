use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::events::Event;
use crate::observer::{short_id, FarmView, TurbineView};
use crate::turbine::TurbineState;

/// Writes the event stream, state snapshots and a closing summary
pub struct Logbook {
    output_dir: PathBuf,
    events_file: BufWriter<File>,
    notable: Vec<String>,
    names: HashMap<Uuid, String>,
}

impl Logbook {
    pub fn new(output_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let output_path = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_path)?;

        let events_file = BufWriter::new(File::create(output_path.join("events.jsonl"))?);

        Ok(Self {
            output_dir: output_path,
            events_file,
            notable: Vec::new(),
            names: HashMap::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Register display names for narration
    pub fn register(&mut self, id: Uuid, name: String) {
        self.names.insert(id, name);
    }

    /// Log an event to events.jsonl and keep notable ones for the summary
    pub fn log_event(&mut self, event: &Event) -> anyhow::Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.events_file, "{}", json)?;

        let name = event
            .turbine
            .map(|id| self.names.get(&id).cloned().unwrap_or_else(|| short_id(id)))
            .unwrap_or_default();
        if let Some(line) = event.narrate(&name) {
            self.notable.push(line);
        }
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.events_file.flush()?;
        Ok(())
    }

    /// Save a state snapshot to states/tick_NNNNNN.json
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> anyhow::Result<PathBuf> {
        let states_dir = self.output_dir.join("states");
        fs::create_dir_all(&states_dir)?;

        let path = states_dir.join(format!("tick_{:06}.json", snapshot.farm.tick));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        Ok(path)
    }

    /// Write summary.md
    pub fn write_summary(&mut self, name: &str, farm: &FarmView, views: &[TurbineView]) -> anyhow::Result<()> {
        self.flush()?;
        let mut out = BufWriter::new(File::create(self.output_dir.join("summary.md"))?);

        writeln!(out, "# {}", name)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} turbines after {} ticks ({:.1}s). Ocean level {:.2}.",
            farm.turbines, farm.tick, farm.time, farm.ocean_level
        )?;
        writeln!(out)?;
        writeln!(out, "## Turbines")?;
        writeln!(out)?;
        for view in views {
            let name = self.names.get(&view.id).cloned().unwrap_or_else(|| short_id(view.id));
            writeln!(out, "- **{}**: {}", name, view.summary())?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Total generation {:.2}/s, {:.0} power stored, {} needing maintenance.",
            farm.total_generation_rate, farm.total_stored, farm.needing_maintenance
        )?;

        if !self.notable.is_empty() {
            writeln!(out)?;
            writeln!(out, "## Log")?;
            writeln!(out)?;
            for line in &self.notable {
                writeln!(out, "{}", line)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "---")?;
        writeln!(out)?;
        writeln!(out, "*Generated by windmill v{}*", env!("CARGO_PKG_VERSION"))?;
        out.flush()?;
        Ok(())
    }
}

/// Saved turbine with its identity
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TurbineRecord {
    pub id: Uuid,
    pub state: TurbineState,
}

/// Full farm state at one tick
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub recorded_at: DateTime<Utc>,
    pub farm: FarmView,
    pub turbines: Vec<TurbineRecord>,
}

impl Snapshot {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
