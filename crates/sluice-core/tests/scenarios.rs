//! End-to-end lifecycle scenarios across store, machine, timeline and advancer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sluice_core::advancer::{AdvanceEvent, AutoAdvancer};
use sluice_core::clock::{Clock, ManualClock};
use sluice_core::lifecycle::{self, TransitionOutcome};
use sluice_core::model::{Category, Severity, Status};
use sluice_core::storage::MemoryStorage;
use sluice_core::store::{ComplaintStore, LoadOutcome, STORAGE_KEY};
use sluice_core::timeline;

#[path = "generators.rs"]
mod generators;
use generators::leak_report;

fn store() -> (ComplaintStore<MemoryStorage>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 30, 7, 5, 0).unwrap());
    (
        ComplaintStore::open_with_clock(MemoryStorage::new(), clock.clone()),
        clock,
    )
}

#[test]
fn fresh_critical_leak_projects_pending_timeline() {
    let (mut store, _) = store();
    let id = store.create(leak_report()).unwrap();
    let complaint = store.get(&id).unwrap();

    assert_eq!(complaint.severity, Severity::Critical);
    assert_eq!(complaint.category, Category::Leak);
    assert!(complaint.location.coordinates.is_none());
    assert!(complaint.images.is_empty());
    assert_eq!(complaint.status, Status::Pending);

    let projected = timeline::project(complaint.status, complaint.created_at);
    let milestones = projected.milestones();
    assert_eq!(milestones.len(), 4);
    assert_eq!(
        milestones.iter().map(|m| m.completed).collect::<Vec<_>>(),
        vec![true, false, false, false]
    );
    assert_eq!(milestones[1].timestamp, complaint.created_at + Duration::hours(2));
}

#[test]
fn restored_far_future_complaint_still_projects() {
    let (mut store, _) = store();
    let id = store.create(leak_report()).unwrap();
    let mut complaint = store.get(&id).unwrap().clone();
    complaint.created_at = DateTime::<Utc>::MAX_UTC;
    complaint.updated_at = DateTime::<Utc>::MAX_UTC;
    let payload = serde_json::to_string(&vec![complaint]).unwrap();

    let restored = ComplaintStore::open(MemoryStorage::new().with_entry(STORAGE_KEY, &payload));
    assert_eq!(restored.load_outcome(), &LoadOutcome::Restored { count: 1 });
    let complaint = restored.get(&id).unwrap();
    let projected = timeline::project(complaint.status, complaint.created_at);
    assert!(
        projected
            .milestones()
            .iter()
            .all(|m| m.timestamp == DateTime::<Utc>::MAX_UTC)
    );
}

#[test]
fn three_transitions_resolve_and_leave_nothing_scheduled() {
    let (mut store, clock) = store();
    let id = store.create(leak_report()).unwrap();
    let mut advancer = AutoAdvancer::default();
    advancer.watch(store.get(&id).unwrap(), clock.now());

    let mut transitions = 0;
    while let Some(deadline) = advancer.next_deadline() {
        clock.set(deadline);
        for event in advancer.fire_due(&mut store, clock.now()).unwrap() {
            assert!(matches!(event, AdvanceEvent::Advanced { .. }));
            transitions += 1;
        }
    }

    let complaint = store.get(&id).unwrap();
    assert_eq!(transitions, 3);
    assert_eq!(complaint.status, Status::Resolved);
    assert!(
        timeline::project(complaint.status, complaint.created_at)
            .milestones()
            .iter()
            .all(|m| m.completed)
    );
    assert!(advancer.scheduled(&id).is_none());
    assert!(advancer.is_idle());
    assert_eq!(
        advancer.watch(complaint, clock.now()),
        None,
        "resolved complaints never re-arm"
    );
}

#[test]
fn unknown_ids_are_absent_and_create_nothing() {
    let (mut store, _) = store();
    store.create(leak_report()).unwrap();

    assert!(store.get("nonexistent-id").is_none());
    assert!(!store.update_status("nonexistent-id", Status::Resolved).unwrap());
    assert_eq!(
        lifecycle::advance(&mut store, "nonexistent-id").unwrap(),
        TransitionOutcome::NotFound
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn manual_and_timed_advances_interleave_safely() {
    let (mut store, clock) = store();
    let id = store.create(leak_report()).unwrap();
    let mut advancer = AutoAdvancer::default();
    advancer.watch(store.get(&id).unwrap(), clock.now());

    clock.advance(Duration::seconds(4));
    lifecycle::set_status(&mut store, &id, Status::UnderReview).unwrap();

    clock.advance(Duration::seconds(6));
    let events = advancer.fire_due(&mut store, clock.now()).unwrap();
    assert!(matches!(
        events.as_slice(),
        [AdvanceEvent::Stale {
            current: Status::UnderReview,
            ..
        }]
    ));
    assert_eq!(store.get(&id).unwrap().status, Status::UnderReview);

    clock.advance(Duration::seconds(15));
    advancer.fire_due(&mut store, clock.now()).unwrap();
    assert_eq!(store.get(&id).unwrap().status, Status::InProgress);
}
