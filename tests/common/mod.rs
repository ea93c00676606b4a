#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDateTime;
use shopsched::capacity::AllocatorSettings;
use shopsched::clock::FixedClock;
use shopsched::dispatch::InlineDispatcher;
use shopsched::engine::WorkItemService;
use shopsched::model::{ResourceProfile, WorkItem};
use shopsched::store::MemoryStore;

pub use shopsched_test_utils::builders::{
    PolicyBuilder, RuleBuilder, ShopFileBuilder, WorkItemBuilder,
};
pub use shopsched_test_utils::{at, day, init_tracing, with_timeout};

/// Store, inline service and clock over the same in-memory state.
pub struct Harness {
    pub store: MemoryStore,
    pub clock: FixedClock,
    pub service: WorkItemService,
}

impl Harness {
    pub fn new(now: NaiveDateTime) -> Self {
        init_tracing();

        let store = MemoryStore::new();
        let clock = FixedClock::new(now);
        let service = WorkItemService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(InlineDispatcher::new(Arc::new(store.clone()))),
            Arc::new(clock.clone()),
            AllocatorSettings::default(),
        );

        Self {
            store,
            clock,
            service,
        }
    }

    pub fn with_items(self, items: impl IntoIterator<Item = WorkItem>) -> Self {
        for item in items {
            self.store.insert_work_item(item).unwrap();
        }
        self
    }

    /// Adds `resource` with `minutes` available on each of the given days of
    /// March 2024.
    pub fn with_calendar(self, resource: &str, days: &[u32], minutes: i64) -> Self {
        self.store.add_resource(ResourceProfile::new(resource)).unwrap();
        for &d in days {
            self.store
                .set_availability(resource, day(2024, 3, d), minutes)
                .unwrap();
        }
        self
    }
}
