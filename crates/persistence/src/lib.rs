//! Persistence layer for reference-data aggregates.
//!
//! Aggregates are stored as versioned JSON state documents behind the
//! [`Store`] trait. A [`UnitOfWork`] commits every tracked aggregate in one
//! atomic [`Store::commit`] and then hands the aggregates to a [`CommitHook`];
//! the [`CommitInterceptor`] hook harvests their buffered domain events and
//! publishes them through an [`EventPublisher`]. Natural-key uniqueness is
//! enforced by committing a [`Reservation`] in the same unit of work.

pub mod context;
pub mod database;
pub mod error;
pub mod interceptor;
pub mod memory;
pub mod publisher;
pub mod repository;
pub mod reservation;
pub mod store;
pub mod unit_of_work;

pub use context::CommitContext;
pub use database::Database;
pub use error::{PersistenceError, PublishError, Result};
pub use interceptor::{CommitHook, CommitInterceptor};
pub use memory::InMemoryStore;
pub use publisher::{
    AuditLogSubscriber, EventPublisher, InMemoryEventLog, Subscriber, SubscriberFanout,
};
pub use repository::Repository;
pub use reservation::{RESERVATION_TYPE, Reservation};
pub use store::{RecordChange, Store, StoredRecord};
pub use unit_of_work::{TrackedAggregate, UnitOfWork};
