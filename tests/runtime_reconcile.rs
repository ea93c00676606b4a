// tests/runtime_reconcile.rs

mod common;
use crate::common::{ShopFileBuilder, WorkItemBuilder, at, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use shopsched::capacity::AllocatorSettings;
use shopsched::clock::FixedClock;
use shopsched::config::ItemConfig;
use shopsched::dispatch::QueuedDispatcher;
use shopsched::engine::{ReconcileRuntime, RuntimeEvent, RuntimeOptions, WorkItemService};
use shopsched::model::{Actor, ResourceProfile};
use shopsched::store::{MemoryStore, WorkItemStore};
use shopsched::types::{RiskTier, WorkItemStatus};

#[tokio::test]
async fn queued_rollup_lands_after_flush() {
    init_tracing();

    let store = MemoryStore::new();
    store
        .insert_work_item(WorkItemBuilder::new("job").build())
        .unwrap();
    store
        .insert_work_item(WorkItemBuilder::new("t1").parent("job").build())
        .unwrap();
    store
        .insert_work_item(WorkItemBuilder::new("t2").parent("job").build())
        .unwrap();

    let (dispatcher, _worker) = QueuedDispatcher::spawn(Arc::new(store.clone()), 4);
    let service = WorkItemService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(dispatcher.clone()),
        Arc::new(FixedClock::new(at(2024, 3, 4, 9, 0))),
        AllocatorSettings::default(),
    );

    service
        .transition("t1", WorkItemStatus::Completed, &Actor::new("dana"))
        .unwrap();
    with_timeout(dispatcher.flush()).await;

    assert_eq!(store.get_work_item("job").unwrap().progress, 50.0);
}

#[tokio::test]
async fn once_pass_refreshes_every_open_item_from_a_shop_file() {
    init_tracing();

    let shop = ShopFileBuilder::new()
        .with_resource("alice")
        .with_availability("alice", "2024-03-04", 60)
        .with_item(
            "small",
            ItemConfig {
                planned_effort_minutes: 30,
                assigned_resource: Some("alice".into()),
                scheduled_start: Some("2024-03-04T09:00".into()),
                ..ItemConfig::default()
            },
        )
        .with_item(
            "big",
            ItemConfig {
                planned_effort_minutes: 120,
                assigned_resource: Some("alice".into()),
                scheduled_start: Some("2024-03-04T09:00".into()),
                ..ItemConfig::default()
            },
        )
        .build();
    let store = shop.build_store().unwrap();

    let service = WorkItemService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(shopsched::dispatch::InlineDispatcher::new(Arc::new(store.clone()))),
        Arc::new(FixedClock::new(at(2024, 3, 1, 0, 0))),
        shop.allocator_settings(),
    );

    let (_tx, rx) = mpsc::channel(4);
    let runtime = ReconcileRuntime::new(
        service.reconciler().clone(),
        rx,
        RuntimeOptions {
            interval: shop.reconcile_interval(),
            exit_after_first_pass: true,
        },
    );
    let summary = with_timeout(runtime.run()).await.unwrap();

    assert_eq!(summary.passes, 1);
    let report = summary.last_report.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.updated, 2);

    let small = store.get_work_item("small").unwrap().snapshot.unwrap();
    assert_eq!(small.risk, RiskTier::Low);
    assert_eq!(small.projected_completion, at(2024, 3, 4, 9, 30));

    // 120 minutes against 60 available: extrapolated, high risk.
    let big = store.get_work_item("big").unwrap().snapshot.unwrap();
    assert_eq!(big.risk, RiskTier::High);
    assert_eq!(big.projected_completion, at(2024, 3, 4, 11, 0));
}

#[tokio::test]
async fn runtime_keeps_going_past_item_failures_until_shutdown() {
    init_tracing();

    let store = MemoryStore::new();
    store.add_resource(ResourceProfile::new("alice")).unwrap();
    store
        .insert_work_item(WorkItemBuilder::new("ok").build())
        .unwrap();
    store
        .insert_work_item(
            WorkItemBuilder::new("orphan")
                .effort(30)
                .resource("retired")
                .build(),
        )
        .unwrap();

    let service = WorkItemService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(shopsched::dispatch::InlineDispatcher::new(Arc::new(store.clone()))),
        Arc::new(FixedClock::new(at(2024, 3, 4, 9, 0))),
        AllocatorSettings::default(),
    );

    let (tx, rx) = mpsc::channel(4);
    let runtime = ReconcileRuntime::new(
        service.reconciler().clone(),
        rx,
        RuntimeOptions {
            interval: Duration::from_secs(3600),
            exit_after_first_pass: false,
        },
    );
    let handle = tokio::spawn(runtime.run());

    tx.send(RuntimeEvent::RunNow).await.unwrap();
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let summary = with_timeout(handle).await.unwrap().unwrap();
    assert_eq!(summary.passes, 2);

    let report = summary.last_report.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "orphan");
    assert!(store.get_work_item("ok").unwrap().snapshot.is_some());
}
