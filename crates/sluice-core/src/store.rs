//! The complaint store: single source of truth for the complaint collection.
//!
//! The whole collection lives in memory in creation order and is written to
//! one [`Storage`] key after every mutation. On open the key is read back; a
//! missing key starts empty, and an unreadable or unparseable payload is
//! logged and also treated as empty. The store is a local cache, not a
//! system of record, so losing a corrupt payload is acceptable.
//!
//! Several handles may share one storage (a `sluice watch` process next to
//! one-shot commands), so every mutation first re-reads the stored
//! collection and then writes the whole of it back.
//!
//! `update_status` is permissive: it writes whatever status it is given.
//! Forward-only ordering is enforced one layer up in [`crate::lifecycle`].

use crate::clock::{Clock, SystemClock};
use crate::error::ErrorCode;
use crate::model::{Complaint, ComplaintInput, Status};
use crate::storage::{Storage, StorageError};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Storage key holding the serialized collection.
pub const STORAGE_KEY: &str = "complaints";

/// Errors from store mutations. Lookups never fail; they return `None`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to encode complaint collection: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Encode(_) => ErrorCode::InternalUnexpected,
            Self::Storage(err) => err.code(),
        }
    }
}

/// Failure to turn a user-supplied id or prefix into one complaint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("complaint not found: '{0}'")]
    NotFound(String),

    #[error("ambiguous complaint id '{query}': matches {}", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
}

impl LookupError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::ComplaintNotFound,
            Self::Ambiguous { .. } => ErrorCode::AmbiguousId,
        }
    }
}

/// What happened when the collection was restored from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored yet.
    Empty,
    /// The stored collection was restored.
    Restored { count: usize },
    /// The stored payload could not be used and was discarded.
    Reset { reason: String },
}

pub struct ComplaintStore<S> {
    storage: S,
    complaints: Vec<Complaint>,
    clock: Box<dyn Clock>,
    loaded: LoadOutcome,
}

impl<S: Storage> ComplaintStore<S> {
    /// Restore the collection from `storage`, stamping mutations with the
    /// system clock.
    pub fn open(storage: S) -> Self {
        Self::open_with_clock(storage, SystemClock)
    }

    /// Restore the collection from `storage` with an explicit clock.
    pub fn open_with_clock(storage: S, clock: impl Clock + 'static) -> Self {
        let (complaints, loaded) = load(&storage);
        Self {
            storage,
            complaints,
            clock: Box::new(clock),
            loaded,
        }
    }

    /// Create a new complaint from validated input and return its id.
    ///
    /// The complaint starts `pending` with `created_at == updated_at == now`
    /// and is appended after every existing complaint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the collection cannot be persisted. The
    /// complaint is still held in memory in that case.
    pub fn create(&mut self, input: ComplaintInput) -> Result<String, StoreError> {
        self.reload();
        let now = self.clock.now();
        let id = self.fresh_id();
        let complaint = Complaint::from_input(id.clone(), input, now);
        info!(
            id = %id,
            category = %complaint.category,
            severity = %complaint.severity,
            "complaint created"
        );
        self.complaints.push(complaint);
        self.persist()?;
        Ok(id)
    }

    /// Look up a complaint by its full id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Complaint> {
        self.complaints.iter().find(|c| c.id == id)
    }

    /// Overwrite the status of `id` and stamp `updated_at`.
    ///
    /// Returns `Ok(false)` without touching storage when `id` is unknown.
    /// No ordering check is made here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the collection cannot be persisted.
    pub fn update_status(&mut self, id: &str, status: Status) -> Result<bool, StoreError> {
        self.reload();
        let now = self.clock.now();
        let Some(complaint) = self.complaints.iter_mut().find(|c| c.id == id) else {
            debug!(id, %status, "status update for unknown complaint ignored");
            return Ok(false);
        };

        let from = complaint.status;
        complaint.status = status;
        complaint.updated_at = now.max(complaint.created_at);
        debug!(id, %from, to = %status, "status updated");
        self.persist()?;
        Ok(true)
    }

    /// Resolve a full id or a unique id prefix (such as the 8-character
    /// reference) to a complaint.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when nothing matches and
    /// [`LookupError::Ambiguous`] when a prefix matches several complaints.
    pub fn resolve(&self, query: &str) -> Result<&Complaint, LookupError> {
        let needle = query.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(LookupError::NotFound(query.to_string()));
        }
        if let Some(exact) = self.get(&needle) {
            return Ok(exact);
        }

        let matches: Vec<&Complaint> = self
            .complaints
            .iter()
            .filter(|c| c.id.starts_with(&needle))
            .collect();

        match matches.as_slice() {
            [] => Err(LookupError::NotFound(query.to_string())),
            [only] => Ok(only),
            many => Err(LookupError::Ambiguous {
                query: query.to_string(),
                candidates: many.iter().map(|c| c.id.clone()).collect(),
            }),
        }
    }

    /// All complaints in creation order.
    #[must_use]
    pub fn list(&self) -> &[Complaint] {
        &self.complaints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.complaints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.complaints.is_empty()
    }

    /// Drop every complaint and persist the empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the empty collection cannot be persisted.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let removed = self.complaints.len();
        self.complaints.clear();
        self.persist()?;
        info!(removed, "complaint collection cleared");
        Ok(removed)
    }

    /// Pick up whatever another handle on the same storage has written.
    ///
    /// Only a parseable payload replaces the in-memory collection. A missing
    /// or unusable one leaves it untouched, so complaints that failed to
    /// persist are not dropped.
    pub fn reload(&mut self) -> LoadOutcome {
        let (complaints, outcome) = load(&self.storage);
        if matches!(outcome, LoadOutcome::Restored { .. }) {
            self.complaints = complaints;
        }
        outcome
    }

    /// How the collection was restored when the store was opened.
    #[must_use]
    pub const fn load_outcome(&self) -> &LoadOutcome {
        &self.loaded
    }

    /// The clock used to stamp mutations.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Give back the underlying storage, e.g. to reopen it.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
            warn!(id = %id, "generated complaint id collided; regenerating");
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let text = serde_json::to_string(&self.complaints)?;
        self.storage.set(STORAGE_KEY, &text)?;
        debug!(count = self.complaints.len(), bytes = text.len(), "complaints persisted");
        Ok(())
    }
}

fn load<S: Storage>(storage: &S) -> (Vec<Complaint>, LoadOutcome) {
    let text = match storage.get(STORAGE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return (Vec::new(), LoadOutcome::Empty),
        Err(err) => {
            warn!(error = %err, code = %err.code(), "could not read stored complaints; starting empty");
            return (
                Vec::new(),
                LoadOutcome::Reset {
                    reason: err.to_string(),
                },
            );
        }
    };

    match serde_json::from_str::<Vec<Complaint>>(&text) {
        Ok(parsed) => {
            let complaints = dedupe_ids(parsed);
            debug!(count = complaints.len(), "complaints restored");
            let count = complaints.len();
            (complaints, LoadOutcome::Restored { count })
        }
        Err(err) => {
            warn!(
                error = %err,
                code = %ErrorCode::CorruptStore,
                "stored complaints are not parseable; starting empty"
            );
            (
                Vec::new(),
                LoadOutcome::Reset {
                    reason: err.to_string(),
                },
            )
        }
    }
}

/// Keep the first complaint for each id; a payload edited by hand could
/// otherwise break id uniqueness.
fn dedupe_ids(complaints: Vec<Complaint>) -> Vec<Complaint> {
    let mut seen = HashSet::new();
    complaints
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.id.clone());
            if !fresh {
                warn!(id = %c.id, "duplicate complaint id in storage dropped");
            }
            fresh
        })
        .collect()
}
