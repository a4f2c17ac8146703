use std::sync::Arc;

use async_trait::async_trait;
use common::{Actor, AggregateId, Version};
use domain::{Aggregate, Corridor, EventEnvelope, Zone};
use persistence::{
    CommitContext, Database, InMemoryEventLog, InMemoryStore, PersistenceError, PublishError,
    Reservation, Subscriber, SubscriberFanout,
};
use tokio_util::sync::CancellationToken;

fn database() -> (Database<InMemoryStore>, InMemoryStore, InMemoryEventLog) {
    let store = InMemoryStore::new();
    let log = InMemoryEventLog::new();
    let db = Database::with_publisher(
        store.clone(),
        Arc::new(SubscriberFanout::new().with(log.clone())),
    );
    (db, store, log)
}

fn ctx() -> CommitContext {
    CommitContext::new(Actor::new("tester"))
}

#[tokio::test]
async fn create_then_disable_publishes_two_events_in_order() {
    let (db, store, log) = database();

    let mut zone = Zone::create(AggregateId::new(), "eu", "Europe", None);
    zone.disable().unwrap();
    let mut uow = db.begin();
    uow.track(zone);
    assert_eq!(uow.pending_events(), 2);

    let published = uow.commit(&ctx()).await.unwrap();

    assert_eq!(published, 2);
    assert_eq!(store.commit_count(), 1);
    assert_eq!(log.event_types().await, vec!["ZoneCreated", "ZoneDisabled"]);
}

#[tokio::test]
async fn failed_commit_publishes_nothing() {
    let (db, store, log) = database();
    store.fail_next_commit();

    let mut uow = db.begin();
    uow.track(Zone::create(AggregateId::new(), "eu", "Europe", None));
    let result = uow.commit(&ctx()).await;

    assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
    assert!(log.is_empty().await);
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn reload_carries_version_and_audit() {
    let (db, _store, _log) = database();
    let id = AggregateId::new();

    let mut uow = db.begin();
    uow.track(Zone::create(id, "eu", "Europe", None));
    uow.commit(&ctx()).await.unwrap();

    let zone: Zone = db.repository().load(id).await.unwrap().unwrap();
    assert_eq!(zone.version(), Version::first());
    assert!(zone.events().is_empty());
    assert_eq!(zone.audit().created_by, Some(Actor::new("tester")));

    let mut zone = zone;
    zone.update("Europe (EEA)", None);
    let mut uow = db.begin();
    uow.track(zone);
    uow.commit(&CommitContext::new(Actor::new("editor")))
        .await
        .unwrap();

    let zone: Zone = db.repository().load(id).await.unwrap().unwrap();
    assert_eq!(zone.version(), Version::new(2));
    assert_eq!(zone.name(), "Europe (EEA)");
    assert_eq!(zone.audit().created_by, Some(Actor::new("tester")));
    assert_eq!(zone.audit().modified_by, Some(Actor::new("editor")));
}

#[tokio::test]
async fn concurrent_writers_conflict() {
    let (db, _store, log) = database();
    let id = AggregateId::new();

    let mut uow = db.begin();
    uow.track(Zone::create(id, "eu", "Europe", None));
    uow.commit(&ctx()).await.unwrap();
    log.clear().await;

    let repo = db.repository::<Zone>();
    let mut first = repo.load(id).await.unwrap().unwrap();
    let mut second = repo.load(id).await.unwrap().unwrap();
    first.update("First", None);
    second.update("Second", None);

    let mut uow = db.begin();
    uow.track(first);
    uow.commit(&ctx()).await.unwrap();

    let mut uow = db.begin();
    uow.track(second);
    let result = uow.commit(&ctx()).await;

    assert!(matches!(result, Err(PersistenceError::Concurrency { .. })));
    assert_eq!(log.len().await, 1);
}

#[tokio::test]
async fn mixed_aggregates_commit_together() {
    let (db, store, log) = database();
    let source = Zone::create(AggregateId::new(), "eu", "Europe", None);
    let destination = Zone::create(AggregateId::new(), "us", "United States", None);
    let corridor = Corridor::create(
        AggregateId::new(),
        source.id(),
        destination.id(),
        "EU-US",
        chrono::Utc::now(),
        None,
    )
    .unwrap();

    let mut uow = db.begin();
    uow.track(source);
    uow.track(destination);
    uow.track(corridor);
    let types: Vec<_> = uow.tracked().map(|a| a.type_name()).collect();
    assert_eq!(types, vec!["Zone", "Zone", "Corridor"]);

    uow.commit(&ctx()).await.unwrap();

    assert_eq!(store.commit_count(), 1);
    assert_eq!(
        log.event_types().await,
        vec!["ZoneCreated", "ZoneCreated", "CorridorCreated"]
    );
}

#[tokio::test]
async fn cancelled_before_commit_writes_nothing() {
    let (db, store, log) = database();
    let token = CancellationToken::new();
    token.cancel();

    let mut uow = db.begin();
    uow.track(Zone::create(AggregateId::new(), "eu", "Europe", None));
    let result = uow.commit(&ctx().with_cancellation(token)).await;

    assert!(matches!(result, Err(PersistenceError::Cancelled)));
    assert_eq!(store.commit_count(), 0);
    assert!(log.is_empty().await);
}

struct BrokenSubscriber;

#[async_trait]
impl Subscriber for BrokenSubscriber {
    fn name(&self) -> &'static str {
        "BrokenSubscriber"
    }

    async fn handle(&self, _event: &EventEnvelope) -> Result<(), PublishError> {
        Err(PublishError::Unavailable("broker down".to_string()))
    }
}

#[tokio::test]
async fn subscriber_failure_keeps_the_commit() {
    let store = InMemoryStore::new();
    let db = Database::with_publisher(
        store.clone(),
        Arc::new(SubscriberFanout::new().with(BrokenSubscriber)),
    );
    let id = AggregateId::new();

    let mut uow = db.begin();
    uow.track(Zone::create(id, "eu", "Europe", None));
    let published = uow.commit(&ctx()).await.unwrap();

    assert_eq!(published, 0);
    assert!(db.repository::<Zone>().load(id).await.unwrap().is_some());
}

#[tokio::test]
async fn empty_unit_of_work_is_a_no_op() {
    let (db, store, _log) = database();
    let uow = db.begin();
    assert!(uow.is_empty());
    assert_eq!(uow.commit(&ctx()).await.unwrap(), 0);
    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn second_claim_on_a_key_fails_the_whole_commit() {
    let (db, store, log) = database();

    let first = Zone::create(AggregateId::new(), "eu", "Europe", None);
    let second = Zone::create(AggregateId::new(), "EU", "Europa", None);
    let (first_id, second_id) = (first.id(), second.id());

    // Both units of work are prepared before either commits.
    let mut a = db.begin();
    a.reserve(Reservation::new("ZoneCode", "EU", first_id));
    a.track(first);
    let mut b = db.begin();
    b.reserve(Reservation::new("ZoneCode", "EU", second_id));
    b.track(second);

    a.commit(&ctx()).await.unwrap();
    let result = b.commit(&ctx()).await;

    match result {
        Err(PersistenceError::Duplicate { scope, key }) => {
            assert_eq!(scope, "ZoneCode");
            assert_eq!(key, "EU");
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(store.commit_count(), 1);
    assert!(db.repository::<Zone>().load(second_id).await.unwrap().is_none());
    assert_eq!(log.event_types().await, vec!["ZoneCreated"]);

    let holder = db.reservation("ZoneCode", "EU").await.unwrap().unwrap();
    assert_eq!(holder.owner, first_id);
    assert!(db.reservation("ZoneCode", "US").await.unwrap().is_none());
}
