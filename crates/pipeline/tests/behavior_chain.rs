use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cache::{CacheClient, CacheStore, InMemoryCacheClient};
use pipeline::{
    CachePolicy, DispatcherBuilder, Handler, Request, RequestContext, RequestDispatcher,
    RequestError, RequestKind, Result, Rules,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u32,
    name: String,
}

struct GetItem {
    id: u32,
}

impl Request for GetItem {
    type Response = Item;
    const NAME: &'static str = "GetItem";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        Some(CachePolicy::new(format!("Item_{}", self.id), TTL))
    }
}

struct RenameItem {
    id: u32,
    name: String,
}

impl Request for RenameItem {
    type Response = ();
    const NAME: &'static str = "RenameItem";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some("Item_")
    }
}

struct Explode;

impl Request for Explode {
    type Response = ();
    const NAME: &'static str = "Explode";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Clone, Default)]
struct ItemHandler {
    names: Arc<std::sync::Mutex<std::collections::HashMap<u32, String>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    fail_next_read: Arc<AtomicBool>,
}

impl ItemHandler {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler<GetItem> for ItemHandler {
    async fn handle(&self, request: GetItem, _ctx: &RequestContext) -> Result<Item> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(RequestError::Persistence("store offline".to_string()));
        }
        let names = self.names.lock().unwrap();
        let name = names
            .get(&request.id)
            .cloned()
            .ok_or_else(|| RequestError::not_found("Item", request.id))?;
        Ok(Item {
            id: request.id,
            name,
        })
    }
}

#[async_trait]
impl Handler<RenameItem> for ItemHandler {
    async fn handle(&self, request: RenameItem, _ctx: &RequestContext) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().insert(request.id, request.name);
        Ok(())
    }
}

struct ExplodingHandler;

#[async_trait]
impl Handler<Explode> for ExplodingHandler {
    async fn handle(&self, _request: Explode, _ctx: &RequestContext) -> Result<()> {
        panic!("boom");
    }
}

struct Fixture {
    dispatcher: RequestDispatcher,
    handler: ItemHandler,
    client: InMemoryCacheClient,
}

fn fixture() -> Fixture {
    let handler = ItemHandler::default();
    handler
        .names
        .lock()
        .unwrap()
        .insert(1, "first".to_string());
    let client = InMemoryCacheClient::new();

    let mut builder = DispatcherBuilder::new().cache(CacheStore::new(client.clone()));
    builder
        .handler::<GetItem, _>(handler.clone())
        .unwrap()
        .handler::<RenameItem, _>(handler.clone())
        .unwrap()
        .handler::<Explode, _>(ExplodingHandler)
        .unwrap()
        .validator::<RenameItem>(
            Rules::new().not_blank("name", |r: &RenameItem| r.name.as_str()),
        );

    Fixture {
        dispatcher: builder.build().unwrap(),
        handler,
        client,
    }
}

fn ctx() -> RequestContext {
    RequestContext::default()
}

#[tokio::test]
async fn invalid_request_never_reaches_handler() {
    let f = fixture();

    let result = f
        .dispatcher
        .send(
            RenameItem {
                id: 1,
                name: "  ".to_string(),
            },
            &ctx(),
        )
        .await;

    match result {
        Err(RequestError::Validation(failure)) => assert!(failure.contains("name")),
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(f.handler.writes(), 0);
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let f = fixture();

    let first = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();
    let second = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(f.handler.reads(), 1);
    assert!(f.client.contains_key("Item_1").await);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_recomputed() {
    let f = fixture();
    f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();

    tokio::time::advance(TTL + Duration::from_secs(1)).await;
    f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();

    assert_eq!(f.handler.reads(), 2);
}

#[tokio::test]
async fn successful_command_invalidates_only_its_prefix() {
    let f = fixture();
    f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();
    f.client
        .set("Other_1", "\"kept\"".to_string(), TTL)
        .await
        .unwrap();

    f.dispatcher
        .send(
            RenameItem {
                id: 1,
                name: "renamed".to_string(),
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert!(!f.client.contains_key("Item_1").await);
    assert!(f.client.contains_key("Other_1").await);

    let reloaded = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();
    assert_eq!(reloaded.name, "renamed");
    assert_eq!(f.handler.reads(), 2);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let f = fixture();
    f.handler.fail_next_read.store(true, Ordering::SeqCst);

    let failed = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await;
    assert!(matches!(failed, Err(RequestError::Persistence(_))));
    assert!(!f.client.contains_key("Item_1").await);

    let missing = f.dispatcher.send(GetItem { id: 99 }, &ctx()).await;
    assert!(matches!(missing, Err(RequestError::NotFound { .. })));

    f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();
    assert_eq!(f.handler.reads(), 3);
}

#[tokio::test]
async fn cache_outage_degrades_to_recompute() {
    let f = fixture();
    f.client.set_offline(true);

    let first = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();
    let second = f.dispatcher.send(GetItem { id: 1 }, &ctx()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(f.handler.reads(), 2);

    f.dispatcher
        .send(
            RenameItem {
                id: 1,
                name: "renamed".to_string(),
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(f.handler.writes(), 1);
}

#[tokio::test]
async fn cancelled_request_surfaces_cancelled() {
    let f = fixture();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ctx().with_cancellation(token);

    let read = f.dispatcher.send(GetItem { id: 1 }, &ctx).await;
    let write = f
        .dispatcher
        .send(
            RenameItem {
                id: 1,
                name: "renamed".to_string(),
            },
            &ctx,
        )
        .await;

    assert!(matches!(read, Err(RequestError::Cancelled)));
    assert!(matches!(write, Err(RequestError::Cancelled)));
    assert_eq!(f.handler.reads(), 0);
    assert_eq!(f.handler.writes(), 0);
}

/// Cache client that can stall reads or writes until the request is dropped.
#[derive(Clone, Default)]
struct StallingCacheClient {
    inner: InMemoryCacheClient,
    stall_gets: Arc<AtomicBool>,
    stall_sets: Arc<AtomicBool>,
    stalled: Arc<Notify>,
}

impl StallingCacheClient {
    async fn stall(&self) {
        self.stalled.notify_one();
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl CacheClient for StallingCacheClient {
    async fn get(&self, key: &str) -> cache::Result<Option<String>> {
        if self.stall_gets.load(Ordering::SeqCst) {
            self.stall().await;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> cache::Result<()> {
        if self.stall_sets.load(Ordering::SeqCst) {
            self.stall().await;
        }
        self.inner.set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> cache::Result<()> {
        self.inner.remove(key).await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> cache::Result<u64> {
        self.inner.remove_by_prefix(prefix).await
    }
}

fn stalling_fixture(client: &StallingCacheClient) -> (RequestDispatcher, ItemHandler) {
    let handler = ItemHandler::default();
    handler
        .names
        .lock()
        .unwrap()
        .insert(1, "first".to_string());

    let mut builder = DispatcherBuilder::new().cache(CacheStore::new(client.clone()));
    builder.handler::<GetItem, _>(handler.clone()).unwrap();
    (builder.build().unwrap(), handler)
}

/// Sends `GetItem { id: 1 }` and cancels it once the cache client stalls.
async fn send_and_cancel_on_stall(
    dispatcher: &RequestDispatcher,
    client: &StallingCacheClient,
) -> Result<Item> {
    let token = CancellationToken::new();
    let ctx = ctx().with_cancellation(token.clone());

    let (result, ()) = tokio::join!(dispatcher.send(GetItem { id: 1 }, &ctx), async {
        client.stalled.notified().await;
        token.cancel();
    });
    result
}

#[tokio::test]
async fn cancellation_during_cache_read_skips_the_handler() {
    let client = StallingCacheClient::default();
    client.stall_gets.store(true, Ordering::SeqCst);
    let (dispatcher, handler) = stalling_fixture(&client);

    let result = send_and_cancel_on_stall(&dispatcher, &client).await;

    assert!(matches!(result, Err(RequestError::Cancelled)));
    assert_eq!(handler.reads(), 0);
    assert!(client.inner.is_empty().await);
}

#[tokio::test]
async fn cancellation_during_cache_write_drops_the_result_unwritten() {
    let client = StallingCacheClient::default();
    client.stall_sets.store(true, Ordering::SeqCst);
    let (dispatcher, handler) = stalling_fixture(&client);

    let result = send_and_cancel_on_stall(&dispatcher, &client).await;

    assert!(matches!(result, Err(RequestError::Cancelled)));
    assert_eq!(handler.reads(), 1);
    assert!(!client.inner.contains_key("Item_1").await);
    assert!(client.inner.is_empty().await);
}

#[tokio::test]
async fn handler_panic_is_resumed() {
    let dispatcher = Arc::new(fixture().dispatcher);

    let task = tokio::spawn(async move { dispatcher.send(Explode, &RequestContext::default()).await });

    assert!(task.await.unwrap_err().is_panic());
}
