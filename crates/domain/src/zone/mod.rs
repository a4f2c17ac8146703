//! Zone aggregate: a named geographic grouping identified by a unique code.

mod aggregate;
mod events;

pub use aggregate::Zone;
pub use events::{ZoneEvent, ZoneEventData, ZoneSnapshot};
