#![allow(dead_code)]

use std::sync::Arc;

use cache::{CacheStore, InMemoryCacheClient};
use common::Actor;
use persistence::{Database, InMemoryEventLog, InMemoryStore, SubscriberFanout};
use pipeline::{DispatcherBuilder, RequestContext, RequestDispatcher};

pub struct TestApp {
    pub dispatcher: RequestDispatcher,
    pub store: InMemoryStore,
    pub db: Database<InMemoryStore>,
    pub events: InMemoryEventLog,
    pub cache: InMemoryCacheClient,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let events = InMemoryEventLog::new();
        let db = Database::with_publisher(
            store.clone(),
            Arc::new(SubscriberFanout::new().with(events.clone())),
        );
        let cache = InMemoryCacheClient::new();

        let mut builder = DispatcherBuilder::new().cache(CacheStore::new(cache.clone()));
        refdata::register(&mut builder, db.clone()).unwrap();

        Self {
            dispatcher: builder.build().unwrap(),
            store,
            db,
            events,
            cache,
        }
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new(Actor::new("tester"))
}
