use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use tracing::Instrument;

use crate::{Request, RequestContext, Result};

/// Outermost behavior: one structured log line and one metrics sample per
/// request, whatever the outcome. Panics are logged and then resumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

impl LoggingBehavior {
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
        let span = tracing::info_span!(
            "request",
            request = R::NAME,
            kind = %R::KIND,
            actor = %ctx.actor(),
            correlation_id = ctx.correlation_id(),
        );
        let started = Instant::now();
        tracing::debug!(parent: &span, "request started");

        let outcome = AssertUnwindSafe(next(request))
            .catch_unwind()
            .instrument(span.clone())
            .await;
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        let label = match &outcome {
            Ok(Ok(_)) => "ok",
            Ok(Err(e)) => e.kind(),
            Err(_) => "panic",
        };
        metrics::counter!("pipeline_requests_total", "request" => R::NAME, "outcome" => label)
            .increment(1);
        metrics::histogram!("pipeline_request_duration_seconds", "request" => R::NAME)
            .record(elapsed.as_secs_f64());

        match outcome {
            Ok(Ok(response)) => {
                tracing::info!(parent: &span, elapsed_ms, outcome = label, "request handled");
                Ok(response)
            }
            Ok(Err(e)) if e.is_expected() => {
                tracing::info!(parent: &span, elapsed_ms, outcome = label, error = %e, "request rejected");
                Err(e)
            }
            Ok(Err(e)) => {
                tracing::error!(parent: &span, elapsed_ms, outcome = label, error = %e, "request failed");
                Err(e)
            }
            Err(panic) => {
                tracing::error!(parent: &span, elapsed_ms, outcome = label, "handler panicked");
                std::panic::resume_unwind(panic)
            }
        }
    }
}
