//! The fixed behavior chain wrapped around every handler.
//!
//! Each behavior exposes `around(request, ctx, next)`, where `next` runs the
//! rest of the chain. The dispatcher nests them statically.

mod caching;
mod logging;
mod validation;

pub use caching::CachingBehavior;
pub use logging::LoggingBehavior;
pub use validation::ValidationBehavior;
