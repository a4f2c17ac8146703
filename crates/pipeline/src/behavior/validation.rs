use std::future::Future;
use std::sync::Arc;

use crate::validation::ValidatorRegistry;
use crate::{Request, RequestContext, RequestError, Result};

/// Rejects invalid requests before any inner layer runs.
///
/// Requests without registered validators pass straight through.
#[derive(Clone, Default)]
pub struct ValidationBehavior {
    validators: Arc<ValidatorRegistry>,
}

impl ValidationBehavior {
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self {
            validators: Arc::new(validators),
        }
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

        if let Some(runner) = self.validators.runner::<R>() {
            let failure = runner.validate(&request);
            if !failure.is_empty() {
                tracing::debug!(request = R::NAME, %failure, "validation failed");
                return Err(RequestError::Validation(failure));
            }
        }

        next(request).await
    }
}
