//! Request dispatch: handler lookup plus the behavior chain.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use cache::CacheStore;

use crate::behavior::{CachingBehavior, LoggingBehavior, ValidationBehavior};
use crate::validation::{Validator, ValidatorRegistry};
use crate::{ConfigurationError, Handler, Request, RequestContext, Result};

/// Handlers keyed by request type, at most one per type.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for `R`. A second registration for the same
    /// type is rejected.
    pub fn register<R, H>(&mut self, handler: H) -> std::result::Result<(), ConfigurationError>
    where
        R: Request,
        H: Handler<R> + 'static,
    {
        self.register_shared::<R>(Arc::new(handler))
    }

    /// Registers an already shared handler for `R`.
    pub fn register_shared<R: Request>(
        &mut self,
        handler: Arc<dyn Handler<R>>,
    ) -> std::result::Result<(), ConfigurationError> {
        let type_id = TypeId::of::<R>();
        if self.handlers.contains_key(&type_id) {
            return Err(ConfigurationError::DuplicateHandler(R::NAME));
        }
        self.handlers.insert(type_id, Box::new(handler));
        Ok(())
    }

    pub fn get<R: Request>(&self) -> Option<Arc<dyn Handler<R>>> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|handler| handler.downcast_ref::<Arc<dyn Handler<R>>>())
            .cloned()
    }

    pub fn contains<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Composition-root builder for a [`RequestDispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HandlerRegistry,
    validators: ValidatorRegistry,
    cache: Option<CacheStore>,
    required: Vec<(TypeId, &'static str)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache used by the caching behavior. Defaults to an
    /// in-memory cache.
    pub fn cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn handler<R, H>(&mut self, handler: H) -> std::result::Result<&mut Self, ConfigurationError>
    where
        R: Request,
        H: Handler<R> + 'static,
    {
        self.handlers.register::<R, H>(handler)?;
        Ok(self)
    }

    pub fn shared_handler<R: Request>(
        &mut self,
        handler: Arc<dyn Handler<R>>,
    ) -> std::result::Result<&mut Self, ConfigurationError> {
        self.handlers.register_shared::<R>(handler)?;
        Ok(self)
    }

    pub fn validator<R: Request>(&mut self, validator: impl Validator<R> + 'static) -> &mut Self {
        self.validators.add::<R>(validator);
        self
    }

    /// Makes [`build`](Self::build) fail unless a handler for `R` is registered.
    pub fn require<R: Request>(&mut self) -> &mut Self {
        self.required.push((TypeId::of::<R>(), R::NAME));
        self
    }

    pub fn build(self) -> std::result::Result<RequestDispatcher, ConfigurationError> {
        if let Some((_, name)) = self
            .required
            .iter()
            .find(|(type_id, _)| !self.handlers.handlers.contains_key(type_id))
        {
            return Err(ConfigurationError::MissingHandler(*name));
        }

        tracing::debug!(
            handlers = self.handlers.len(),
            validated_requests = self.validators.len(),
            "request dispatcher built"
        );

        Ok(RequestDispatcher {
            handlers: self.handlers,
            logging: LoggingBehavior,
            validation: ValidationBehavior::new(self.validators),
            caching: CachingBehavior::new(self.cache.unwrap_or_else(CacheStore::in_memory)),
        })
    }
}

/// Sends requests to their handler through
/// Logging ⊃ Validation ⊃ Caching ⊃ Handler.
pub struct RequestDispatcher {
    handlers: HandlerRegistry,
    logging: LoggingBehavior,
    validation: ValidationBehavior,
    caching: CachingBehavior,
}

impl RequestDispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Runs `request` through the behavior chain and its handler.
    ///
    /// Fails with [`ConfigurationError::MissingHandler`] before any behavior
    /// runs when no handler is registered for `R`.
    pub async fn send<R: Request>(&self, request: R, ctx: &RequestContext) -> Result<R::Response> {
        let Some(handler) = self.handlers.get::<R>() else {
            tracing::error!(request = R::NAME, "no handler registered");
            return Err(ConfigurationError::MissingHandler(R::NAME).into());
        };
        let handler = &handler;
        let validation = &self.validation;
        let caching = &self.caching;

        self.logging
            .around(request, ctx, move |request: R| async move {
                validation
                    .around(request, ctx, move |request: R| async move {
                        caching
                            .around(request, ctx, move |request: R| async move {
                                ctx.ensure_active()?;
                                handler.handle(request, ctx).await
                            })
                            .await
                    })
                    .await
            })
            .await
    }

    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains::<R>()
    }

    pub fn cache(&self) -> &CacheStore {
        self.caching.cache()
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
