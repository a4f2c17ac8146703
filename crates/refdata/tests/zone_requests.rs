mod support;

use cache::CacheClient;
use common::AggregateId;
use domain::{Aggregate, Zone};
use pipeline::RequestError;
use refdata::{CreateZone, DisableZone, FindZone, GetZone, ListZones, UpdateZone};
use support::{TestApp, ctx};

fn create(code: &str, name: &str) -> CreateZone {
    CreateZone {
        code: code.to_string(),
        name: name.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn create_zone_commits_and_publishes() {
    let app = TestApp::new();

    let zone = app
        .dispatcher
        .send(create("eu", "Europe"), &ctx())
        .await
        .unwrap();

    assert_eq!(zone.code, "EU");
    assert!(zone.is_enabled);
    assert_eq!(app.store.commit_count(), 1);
    assert_eq!(app.events.event_types().await, vec!["ZoneCreated"]);

    let events = app.events.events().await;
    assert_eq!(events[0].aggregate_id, zone.zone_id);
    assert_eq!(events[0].metadata["actor"], "tester");
}

#[tokio::test]
async fn duplicate_code_is_a_conflict_without_side_effects() {
    let app = TestApp::new();
    app.dispatcher
        .send(create("EU", "Europe"), &ctx())
        .await
        .unwrap();
    app.events.clear().await;

    let result = app.dispatcher.send(create("eu", "Europa"), &ctx()).await;

    assert!(matches!(result, Err(RequestError::Conflict(_))));
    assert_eq!(app.store.commit_count(), 1);
    assert!(app.events.is_empty().await);
}

#[tokio::test]
async fn missing_name_fails_validation_without_commit() {
    let app = TestApp::new();

    let result = app.dispatcher.send(create("EU", ""), &ctx()).await;

    match result {
        Err(RequestError::Validation(failure)) => assert!(failure.contains("name")),
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(app.store.commit_count(), 0);
    assert!(app.events.is_empty().await);
}

#[tokio::test]
async fn cached_read_is_stable_until_a_zone_command() {
    let app = TestApp::new();
    let created = app
        .dispatcher
        .send(create("EU", "Europe"), &ctx())
        .await
        .unwrap();
    let id = created.zone_id;

    let first = app.dispatcher.send(GetZone { id }, &ctx()).await.unwrap();
    assert!(app.cache.contains_key(&format!("Zone_{id}")).await);

    // Write behind the pipeline's back: the cached value must still be served.
    let mut zone: Zone = app.db.repository().load(id).await.unwrap().unwrap();
    zone.update("Changed directly", None);
    let mut uow = app.db.begin();
    uow.track(zone);
    uow.commit(&persistence::CommitContext::default())
        .await
        .unwrap();

    let second = app.dispatcher.send(GetZone { id }, &ctx()).await.unwrap();
    assert_eq!(first, second);

    app.dispatcher
        .send(
            UpdateZone {
                id,
                name: "Europe (EEA)".to_string(),
                description: None,
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert!(!app.cache.contains_key(&format!("Zone_{id}")).await);
    let third = app.dispatcher.send(GetZone { id }, &ctx()).await.unwrap();
    assert_eq!(third.name, "Europe (EEA)");
}

#[tokio::test]
async fn zone_command_leaves_corridor_cache_alone() {
    let app = TestApp::new();
    app.cache
        .set(
            "Corridor_list_all",
            "[]".to_string(),
            std::time::Duration::from_secs(60),
        )
        .await
        .unwrap();

    app.dispatcher
        .send(create("EU", "Europe"), &ctx())
        .await
        .unwrap();

    assert!(app.cache.contains_key("Corridor_list_all").await);
}

#[tokio::test]
async fn disabling_twice_is_a_conflict() {
    let app = TestApp::new();
    let zone = app
        .dispatcher
        .send(create("EU", "Europe"), &ctx())
        .await
        .unwrap();

    app.dispatcher
        .send(DisableZone { id: zone.zone_id }, &ctx())
        .await
        .unwrap();
    let again = app
        .dispatcher
        .send(DisableZone { id: zone.zone_id }, &ctx())
        .await;

    assert!(matches!(again, Err(RequestError::Conflict(_))));
    assert_eq!(
        app.events.event_types().await,
        vec!["ZoneCreated", "ZoneDisabled"]
    );

    let reloaded: Zone = app.db.repository().load(zone.zone_id).await.unwrap().unwrap();
    assert!(!reloaded.is_enabled());
    assert_eq!(reloaded.version().as_i64(), 2);
}

#[tokio::test]
async fn unknown_zone_is_not_found() {
    let app = TestApp::new();

    let result = app
        .dispatcher
        .send(GetZone { id: AggregateId::new() }, &ctx())
        .await;

    assert!(matches!(result, Err(RequestError::NotFound { entity: "Zone", .. })));
}

#[tokio::test]
async fn list_and_find_zones() {
    let app = TestApp::new();
    app.dispatcher.send(create("us", "United States"), &ctx()).await.unwrap();
    let eu = app.dispatcher.send(create("eu", "Europe"), &ctx()).await.unwrap();
    app.dispatcher
        .send(DisableZone { id: eu.zone_id }, &ctx())
        .await
        .unwrap();

    let enabled = app.dispatcher.send(ListZones::default(), &ctx()).await.unwrap();
    assert_eq!(enabled.iter().map(|z| z.code.as_str()).collect::<Vec<_>>(), vec!["US"]);

    let all = app
        .dispatcher
        .send(ListZones { include_disabled: true }, &ctx())
        .await
        .unwrap();
    assert_eq!(all.iter().map(|z| z.code.as_str()).collect::<Vec<_>>(), vec!["EU", "US"]);

    let found = app
        .dispatcher
        .send(
            FindZone {
                code: Some("Eu".to_string()),
                ..Default::default()
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(found.zone_id, eu.zone_id);

    let ambiguous = app.dispatcher.send(FindZone::default(), &ctx()).await;
    assert!(matches!(ambiguous, Err(RequestError::Validation(_))));
}

#[tokio::test]
async fn failed_commit_surfaces_persistence_error_and_publishes_nothing() {
    let app = TestApp::new();
    app.store.fail_next_commit();

    let result = app.dispatcher.send(create("EU", "Europe"), &ctx()).await;

    assert!(matches!(result, Err(RequestError::Persistence(_))));
    assert!(app.events.is_empty().await);
    assert!(app.db.repository::<Zone>().load_all().await.unwrap().is_empty());
}
