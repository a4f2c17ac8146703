//! Shared types used across the reference-data workspace.

pub mod types;

pub use types::{Actor, AggregateId, Version};
