//! Corridor aggregate: a directed link between two zones with a validity window.

mod aggregate;
mod events;

pub use aggregate::{Corridor, CorridorPatch};
pub use events::{CorridorEvent, CorridorEventData, CorridorSnapshot};
