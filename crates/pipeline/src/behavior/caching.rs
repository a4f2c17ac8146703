use std::future::Future;

use cache::CacheStore;

use crate::{CachePolicy, Request, RequestContext, RequestError, RequestKind, Result};

/// Cache-aside for queries and prefix invalidation for commands.
///
/// Only successful responses are cached. Cache reads and writes race the
/// request's cancellation token and lose to it with
/// [`RequestError::Cancelled`]. A query cancelled while its result is being
/// written drops that result and leaves no entry behind. Invalidation after a
/// successful command always runs to completion.
#[derive(Debug, Clone)]
pub struct CachingBehavior {
    cache: CacheStore,
}

impl CachingBehavior {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub async fn around<R, F, Fut>(
        &self,
        request: R,
        ctx: &RequestContext,
        next: F,
    ) -> Result<R::Response>
    where
        R: Request,
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<R::Response>>,
    {
        ctx.ensure_active()?;

        if R::KIND == RequestKind::Query
            && let Some(policy) = request.cache_policy()
        {
            return self.cache_aside(policy, request, ctx, next).await;
        }

        let prefix = request.invalidates();
        let response = next(request).await?;

        if let Some(prefix) = prefix {
            let removed = self.cache.remove_by_prefix(prefix).await;
            tracing::debug!(request = R::NAME, prefix, removed, "invalidated cached queries");
        }

        Ok(response)
    }

    async fn cache_aside<R, F, Fut>(
        &self,
        policy: CachePolicy,
        request: R,
        ctx: &RequestContext,
        next: F,
    ) -> Result<R::Response>
    where
        R: Request,
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<R::Response>>,
    {
        let cached = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return Err(RequestError::Cancelled),
            cached = self.cache.get_json::<R::Response>(&policy.key) => cached,
        };
        if let Some(response) = cached {
            tracing::debug!(request = R::NAME, key = %policy.key, "served from cache");
            return Ok(response);
        }

        let response = next(request).await?;

        // Cancelled mid-write: the response is dropped and nothing is cached.
        tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return Err(RequestError::Cancelled),
            _ = self.cache.set_json(&policy.key, &response, policy.ttl) => {}
        }

        Ok(response)
    }
}
