//! Demonstration auto-advancer.
//!
//! Simulates field crews by moving watched complaints forward on fixed
//! delays: 10s out of `pending`, 15s out of `under-review`, 20s out of
//! `in-progress` by default. Each watched complaint holds at most one
//! one-shot timer, tied to the status that was observed when it was armed.
//!
//! Nothing here spawns threads. A driver asks for [`AutoAdvancer::next_deadline`],
//! waits until then, and calls [`AutoAdvancer::fire_due`], which reloads the
//! store from storage (so changes made by other processes are seen) before
//! touching anything:
//!
//! - complaint gone: the timer is dropped
//! - status moved since the timer was armed: re-armed from the current status
//! - otherwise: advanced through [`lifecycle::advance`] and re-armed for the
//!   next step, unless the complaint is now `resolved`

use crate::clock::Clock;
use crate::lifecycle::{self, TransitionOutcome};
use crate::model::{Complaint, Status};
use crate::storage::Storage;
use crate::store::{ComplaintStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// How long each status lasts before the advancer moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceDelays {
    pub pending: Duration,
    pub under_review: Duration,
    pub in_progress: Duration,
}

impl Default for AdvanceDelays {
    fn default() -> Self {
        Self {
            pending: Duration::from_secs(10),
            under_review: Duration::from_secs(15),
            in_progress: Duration::from_secs(20),
        }
    }
}

impl AdvanceDelays {
    /// Delay before leaving `status`; `None` for the terminal status.
    #[must_use]
    pub const fn after(&self, status: Status) -> Option<Duration> {
        match status {
            Status::Pending => Some(self.pending),
            Status::UnderReview => Some(self.under_review),
            Status::InProgress => Some(self.in_progress),
            Status::Resolved => None,
        }
    }
}

/// A single armed timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub id: String,
    pub observed: Status,
    pub due: DateTime<Utc>,
}

/// What a fired timer did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdvanceEvent {
    /// The complaint moved forward. `next_due` is `None` once resolved.
    Advanced {
        id: String,
        from: Status,
        to: Status,
        next_due: Option<DateTime<Utc>>,
    },
    /// The status changed under the timer; it was re-armed from `current`.
    Stale {
        id: String,
        observed: Status,
        current: Status,
        next_due: Option<DateTime<Utc>>,
    },
    /// The complaint no longer exists; the timer was dropped.
    Vanished { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct AutoAdvancer {
    delays: AdvanceDelays,
    timers: BTreeMap<String, ScheduledAdvance>,
}

impl AutoAdvancer {
    #[must_use]
    pub const fn new(delays: AdvanceDelays) -> Self {
        Self {
            delays,
            timers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn delays(&self) -> &AdvanceDelays {
        &self.delays
    }

    /// Start observing `complaint`, replacing any timer it already had.
    ///
    /// Returns the deadline, or `None` when the complaint is resolved.
    pub fn watch(&mut self, complaint: &Complaint, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.arm(&complaint.id, complaint.status, now)
    }

    /// Stop observing `id`. Returns whether a timer was pending.
    pub fn cancel(&mut self, id: &str) -> bool {
        let cancelled = self.timers.remove(id).is_some();
        if cancelled {
            debug!(id, "auto-advance timer cancelled");
        }
        cancelled
    }

    #[must_use]
    pub fn scheduled(&self, id: &str) -> Option<&ScheduledAdvance> {
        self.timers.get(id)
    }

    /// Earliest pending deadline across all watched complaints.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.values().map(|t| t.due).min()
    }

    /// True when no timers are armed.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Fire every timer whose deadline is at or before `now`, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if an advanced status cannot be persisted.
    /// The timer that failed and every timer not yet processed stay armed.
    pub fn fire_due<S: Storage>(
        &mut self,
        store: &mut ComplaintStore<S>,
        now: DateTime<Utc>,
    ) -> Result<Vec<AdvanceEvent>, StoreError> {
        store.reload();
        let mut due: Vec<ScheduledAdvance> = self
            .timers
            .values()
            .filter(|t| t.due <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));

        let mut events = Vec::with_capacity(due.len());
        for timer in due {
            self.timers.remove(&timer.id);
            match self.fire(store, timer.clone(), now) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) => {
                    self.timers.insert(timer.id.clone(), timer);
                    return Err(err);
                }
            }
        }
        Ok(events)
    }

    /// Drive every armed timer to completion, sleeping between deadlines.
    ///
    /// `sleep` is called with the wait until the next deadline; `on_event`
    /// sees each event as it happens.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if an advanced status cannot be persisted.
    pub fn run_until_idle<S: Storage>(
        &mut self,
        store: &mut ComplaintStore<S>,
        clock: &dyn Clock,
        mut sleep: impl FnMut(Duration),
        mut on_event: impl FnMut(&AdvanceEvent),
    ) -> Result<(), StoreError> {
        while let Some(deadline) = self.next_deadline() {
            let now = clock.now();
            if deadline > now {
                let wait = (deadline - now).to_std().unwrap_or_default();
                sleep(wait);
                continue;
            }
            for event in self.fire_due(store, now)? {
                on_event(&event);
            }
        }
        Ok(())
    }

    fn fire<S: Storage>(
        &mut self,
        store: &mut ComplaintStore<S>,
        timer: ScheduledAdvance,
        now: DateTime<Utc>,
    ) -> Result<Option<AdvanceEvent>, StoreError> {
        let Some(current) = store.get(&timer.id).map(|c| c.status) else {
            debug!(id = %timer.id, "watched complaint vanished; timer dropped");
            return Ok(Some(AdvanceEvent::Vanished { id: timer.id }));
        };

        if current != timer.observed {
            let next_due = self.arm(&timer.id, current, now);
            debug!(
                id = %timer.id,
                observed = %timer.observed,
                %current,
                "status moved under timer; re-armed"
            );
            return Ok(Some(AdvanceEvent::Stale {
                id: timer.id,
                observed: timer.observed,
                current,
                next_due,
            }));
        }

        match lifecycle::advance(store, &timer.id)? {
            TransitionOutcome::Advanced { from, to } => {
                let next_due = self.arm(&timer.id, to, now);
                if next_due.is_none() {
                    info!(id = %timer.id, "complaint resolved; auto-advance finished");
                }
                Ok(Some(AdvanceEvent::Advanced {
                    id: timer.id,
                    from,
                    to,
                    next_due,
                }))
            }
            TransitionOutcome::NotFound => Ok(Some(AdvanceEvent::Vanished { id: timer.id })),
            other => {
                debug!(id = %timer.id, ?other, "timer fired without a transition");
                Ok(None)
            }
        }
    }

    fn arm(&mut self, id: &str, status: Status, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let Some(delay) = self.delays.after(status) else {
            self.timers.remove(id);
            return None;
        };
        let due = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(id, %status, %due, "auto-advance timer armed");
        self.timers.insert(
            id.to_string(),
            ScheduledAdvance {
                id: id.to_string(),
                observed: status,
                due,
            },
        );
        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::{Category, ComplaintInput, ContactDetails, Location, Severity};
    use crate::storage::{BackendError, FileStorage, MemoryStorage, StorageError};
    use chrono::TimeZone;

    fn report() -> ComplaintInput {
        ComplaintInput {
            title: "Brown tap water".to_string(),
            description: "Discoloured since Monday".to_string(),
            category: Category::Quality,
            severity: Severity::High,
            location: Location::default(),
            images: Vec::new(),
            contact_details: ContactDetails::default(),
        }
    }

    fn setup() -> (ComplaintStore<MemoryStorage>, ManualClock, String) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap());
        let mut store = ComplaintStore::open_with_clock(MemoryStorage::new(), clock.clone());
        let id = store.create(report()).unwrap();
        (store, clock, id)
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    #[test]
    fn watch_arms_timer_with_status_delay() {
        let (store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();

        let due = advancer.watch(store.get(&id).unwrap(), clock.now());
        assert_eq!(due, Some(clock.now() + secs(10)));
        assert_eq!(advancer.scheduled(&id).unwrap().observed, Status::Pending);
        assert_eq!(advancer.len(), 1);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());

        clock.advance(secs(9));
        assert!(advancer.fire_due(&mut store, clock.now()).unwrap().is_empty());
        assert_eq!(store.get(&id).unwrap().status, Status::Pending);
    }

    #[test]
    fn walks_full_lifecycle_then_goes_idle() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());

        for (wait, expected) in [
            (10, Status::UnderReview),
            (15, Status::InProgress),
            (20, Status::Resolved),
        ] {
            clock.advance(secs(wait));
            let events = advancer.fire_due(&mut store, clock.now()).unwrap();
            assert_eq!(events.len(), 1);
            assert!(matches!(&events[0], AdvanceEvent::Advanced { to, .. } if *to == expected));
            assert_eq!(store.get(&id).unwrap().status, expected);
        }

        assert!(advancer.is_idle());
        assert!(advancer.scheduled(&id).is_none());
        assert!(advancer.next_deadline().is_none());
    }

    #[test]
    fn watching_resolved_complaint_arms_nothing() {
        let (mut store, clock, id) = setup();
        store.update_status(&id, Status::Resolved).unwrap();
        let mut advancer = AutoAdvancer::default();

        assert_eq!(advancer.watch(store.get(&id).unwrap(), clock.now()), None);
        assert!(advancer.is_idle());
    }

    #[test]
    fn stale_timer_rereads_status_instead_of_overwriting() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());

        // Someone else moves it on before the timer fires.
        lifecycle::advance(&mut store, &id).unwrap();
        lifecycle::advance(&mut store, &id).unwrap();

        clock.advance(secs(10));
        let events = advancer.fire_due(&mut store, clock.now()).unwrap();
        assert_eq!(
            events,
            vec![AdvanceEvent::Stale {
                id: id.clone(),
                observed: Status::Pending,
                current: Status::InProgress,
                next_due: Some(clock.now() + secs(20)),
            }]
        );
        assert_eq!(store.get(&id).unwrap().status, Status::InProgress);
    }

    #[test]
    fn vanished_complaint_drops_timer() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());
        store.clear().unwrap();

        clock.advance(secs(10));
        let events = advancer.fire_due(&mut store, clock.now()).unwrap();
        assert_eq!(events, vec![AdvanceEvent::Vanished { id }]);
        assert!(advancer.is_idle());
        assert!(store.is_empty());
    }

    #[test]
    fn cancel_prevents_write() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());

        assert!(advancer.cancel(&id));
        assert!(!advancer.cancel(&id));

        clock.advance(secs(60));
        assert!(advancer.fire_due(&mut store, clock.now()).unwrap().is_empty());
        assert_eq!(store.get(&id).unwrap().status, Status::Pending);
    }

    #[test]
    fn run_until_idle_sleeps_between_deadlines() {
        let (mut store, clock, id) = setup();
        let mut advancer = AutoAdvancer::new(AdvanceDelays {
            pending: Duration::from_secs(1),
            under_review: Duration::from_secs(2),
            in_progress: Duration::from_secs(3),
        });
        advancer.watch(store.get(&id).unwrap(), clock.now());

        let mut slept = Vec::new();
        let mut seen = Vec::new();
        let sleeper = clock.clone();
        advancer
            .run_until_idle(
                &mut store,
                &clock,
                |wait| {
                    slept.push(wait);
                    sleeper.advance(chrono::Duration::from_std(wait).unwrap());
                },
                |event| seen.push(event.clone()),
            )
            .unwrap();

        assert_eq!(
            slept,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
        assert_eq!(seen.len(), 3);
        assert_eq!(store.get(&id).unwrap().status, Status::Resolved);
    }

    #[test]
    fn sees_status_changed_through_another_handle() {
        let shared = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap());
        let mut watcher =
            ComplaintStore::open_with_clock(FileStorage::new(shared.path()), clock.clone());
        let id = watcher.create(report()).unwrap();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(watcher.get(&id).unwrap(), clock.now());

        let mut other = ComplaintStore::open(FileStorage::new(shared.path()));
        lifecycle::advance(&mut other, &id).unwrap();
        let submitted = other.create(report()).unwrap();

        clock.advance(secs(10));
        let events = advancer.fire_due(&mut watcher, clock.now()).unwrap();
        assert!(matches!(
            &events[..],
            [AdvanceEvent::Stale { current: Status::UnderReview, .. }]
        ));

        clock.advance(secs(15));
        advancer.fire_due(&mut watcher, clock.now()).unwrap();
        let reopened = ComplaintStore::open(FileStorage::new(shared.path()));
        assert_eq!(reopened.get(&id).unwrap().status, Status::InProgress);
        assert!(reopened.get(&submitted).is_some());
    }

    #[test]
    fn failed_persist_keeps_timer_armed() {
        #[derive(Default)]
        struct ReadOnlyAfterCreate {
            inner: MemoryStorage,
            locked: bool,
        }
        impl Storage for ReadOnlyAfterCreate {
            fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
                self.inner.get(key)
            }
            fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
                if self.locked {
                    return Err(StorageError::Write {
                        key: key.to_string(),
                        source: BackendError::Io {
                            path: "complaints.json".into(),
                            source: std::io::Error::other("disk full"),
                        },
                    });
                }
                self.locked = true;
                self.inner.set(key, value)
            }
        }

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap());
        let mut store =
            ComplaintStore::open_with_clock(ReadOnlyAfterCreate::default(), clock.clone());
        let id = store.create(report()).unwrap();
        let mut advancer = AutoAdvancer::default();
        advancer.watch(store.get(&id).unwrap(), clock.now());

        clock.advance(secs(10));
        assert!(advancer.fire_due(&mut store, clock.now()).is_err());
        let timer = advancer.scheduled(&id).expect("timer still armed");
        assert_eq!(timer.observed, Status::Pending);
        assert_eq!(advancer.next_deadline(), Some(clock.now()));
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(AdvanceEvent::Vanished {
            id: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "vanished");
        assert_eq!(json["id"], "abc");
    }
}
