//! Event logging, state snapshots and run summaries.

mod events;
mod logbook;

pub use events::Event;
pub use logbook::{Logbook, Snapshot, TurbineRecord};
