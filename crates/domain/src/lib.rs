//! Domain layer for the reference-data service.
//!
//! This crate provides:
//! - [`Aggregate`] trait for entities that buffer domain events until commit
//! - [`EventBuffer`] holding those events in mutation order
//! - [`EventEnvelope`], the value handed to event subscribers
//! - Zone and Corridor aggregates

pub mod aggregate;
pub mod corridor;
pub mod error;
pub mod event;
pub mod zone;

pub use aggregate::{Aggregate, AuditInfo, AuditStamp, DomainEvent, EventBuffer};
pub use corridor::{Corridor, CorridorEvent, CorridorPatch, CorridorSnapshot};
pub use error::DomainError;
pub use event::EventEnvelope;
pub use zone::{Zone, ZoneEvent, ZoneSnapshot};
