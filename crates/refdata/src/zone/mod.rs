//! Zone requests and handlers.

mod commands;
mod handlers;
mod queries;
mod validators;

pub use commands::{ActivateZone, CreateZone, DisableZone, UpdateZone};
pub use handlers::ZoneHandlers;
pub use queries::{FindZone, GetZone, ListZones};
pub use validators::{create_zone_rules, find_zone_rules, update_zone_rules};
