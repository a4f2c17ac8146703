//! Reference-data requests and handlers.
//!
//! This crate provides:
//! - Zone and Corridor commands and queries as pipeline [`Request`](pipeline::Request)s
//! - Declarative validators for each request
//! - Handlers that load aggregates, mutate them and commit a unit of work
//! - [`register`] to wire all of the above into a dispatcher

pub mod corridor;
pub mod error;
pub mod keys;
pub mod registration;
pub mod zone;

pub use corridor::{
    ActivateCorridor, CorridorHandlers, CreateCorridor, DisableCorridor, GetCorridor,
    ListCorridors, PatchCorridor, UpdateCorridor,
};
pub use keys::{CORRIDOR_PREFIX, ZONE_PREFIX, query_cache_ttl, set_query_cache_ttl};
pub use registration::register;
pub use zone::{
    ActivateZone, CreateZone, DisableZone, FindZone, GetZone, ListZones, UpdateZone, ZoneHandlers,
};
