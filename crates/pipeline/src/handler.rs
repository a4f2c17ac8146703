use async_trait::async_trait;

use crate::{Request, RequestContext, Result};

/// Handles one request type. Exactly one handler is registered per type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, ctx: &RequestContext) -> Result<R::Response>;
}
