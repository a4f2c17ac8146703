//! Corridor requests and handlers.

mod commands;
mod handlers;
mod queries;
mod validators;

pub use commands::{ActivateCorridor, CreateCorridor, DisableCorridor, PatchCorridor, UpdateCorridor};
pub use handlers::CorridorHandlers;
pub use queries::{GetCorridor, ListCorridors};
pub use validators::{create_corridor_rules, patch_corridor_rules, update_corridor_rules};
