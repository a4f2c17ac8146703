//! Cross-cutting request pipeline.
//!
//! Every request sent through a [`RequestDispatcher`] runs through the same
//! fixed chain of behaviors before reaching its handler:
//!
//! ```text
//! LoggingBehavior ⊃ ValidationBehavior ⊃ CachingBehavior ⊃ Handler
//! ```
//!
//! Requests opt into caching and cache invalidation through
//! [`Request::cache_policy`] and [`Request::invalidates`].

pub mod behavior;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod request;
pub mod validation;

pub use behavior::{CachingBehavior, LoggingBehavior, ValidationBehavior};
pub use context::RequestContext;
pub use dispatcher::{DispatcherBuilder, HandlerRegistry, RequestDispatcher};
pub use error::{ConfigurationError, RequestError, Result};
pub use handler::Handler;
pub use request::{CachePolicy, Request, RequestKind};
pub use validation::{
    FieldError, Rules, ValidationFailure, ValidationRunner, Validator, ValidatorRegistry,
};
