//! Complaint lifecycle state machine.
//!
//! ```text
//! pending -> under-review -> in-progress -> resolved
//! ```
//!
//! `pending` is the only initial status and `resolved` is terminal. The only
//! legal move is one step forward. Unlike the store's raw
//! [`update_status`](crate::store::ComplaintStore::update_status), the
//! functions here refuse jumps and regressions, so every complaint passes
//! through every earlier status.

use crate::model::Status;
use crate::storage::Storage;
use crate::store::{ComplaintStore, StoreError};
use std::fmt;
use tracing::{debug, info};

impl Status {
    /// Every status in forward order.
    pub const ORDER: [Self; 4] = [
        Self::Pending,
        Self::UnderReview,
        Self::InProgress,
        Self::Resolved,
    ];

    /// Zero-based position in [`Status::ORDER`].
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::Pending => 0,
            Self::UnderReview => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
        }
    }

    /// The status one step forward, or `None` from `resolved`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::UnderReview),
            Self::UnderReview => Some(Self::InProgress),
            Self::InProgress => Some(Self::Resolved),
            Self::Resolved => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `pending -> under-review`
    /// - `under-review -> in-progress`
    /// - `in-progress -> resolved`
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for no-ops, skips, and regressions.
    pub fn can_transition_to(self, target: Self) -> Result<(), InvalidTransition> {
        if self == target {
            return Err(InvalidTransition {
                from: self,
                to: target,
                reason: "no-op transition is not allowed",
            });
        }

        match self.next() {
            Some(next) if next == target => Ok(()),
            None => Err(InvalidTransition {
                from: self,
                to: target,
                reason: "resolved is terminal",
            }),
            Some(_) if target < self => Err(InvalidTransition {
                from: self,
                to: target,
                reason: "status never moves backwards",
            }),
            Some(_) => Err(InvalidTransition {
                from: self,
                to: target,
                reason: "status cannot skip a stage",
            }),
        }
    }
}

/// Error returned when a status transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: Status,
    pub to: Status,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move {} -> {}: {}", self.from, self.to, self.reason)
    }
}

impl std::error::Error for InvalidTransition {}

/// Result of asking the machine to move a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The complaint moved one step forward and was persisted.
    Advanced { from: Status, to: Status },
    /// The complaint already had the requested status; nothing was written.
    Unchanged(Status),
    /// The complaint is resolved; there is nowhere left to go.
    Terminal,
    /// No complaint has that id.
    NotFound,
    /// The requested status is not the legal next step.
    Rejected(InvalidTransition),
}

impl TransitionOutcome {
    /// The status the complaint holds after the call, when it exists.
    #[must_use]
    pub const fn current(&self) -> Option<Status> {
        match self {
            Self::Advanced { to, .. } => Some(*to),
            Self::Unchanged(status) => Some(*status),
            Self::Terminal => Some(Status::Resolved),
            Self::Rejected(invalid) => Some(invalid.from),
            Self::NotFound => None,
        }
    }
}

/// Move `id` one step forward.
///
/// # Errors
///
/// Returns [`StoreError`] only if the new status cannot be persisted.
pub fn advance<S: Storage>(
    store: &mut ComplaintStore<S>,
    id: &str,
) -> Result<TransitionOutcome, StoreError> {
    store.reload();
    let Some(current) = store.get(id).map(|c| c.status) else {
        debug!(id, "advance requested for unknown complaint");
        return Ok(TransitionOutcome::NotFound);
    };
    let Some(next) = current.next() else {
        return Ok(TransitionOutcome::Terminal);
    };
    apply(store, id, current, next)
}

/// Move `id` to `target`, which must be the current status (a no-op) or the
/// next one.
///
/// # Errors
///
/// Returns [`StoreError`] only if the new status cannot be persisted.
pub fn set_status<S: Storage>(
    store: &mut ComplaintStore<S>,
    id: &str,
    target: Status,
) -> Result<TransitionOutcome, StoreError> {
    store.reload();
    let Some(current) = store.get(id).map(|c| c.status) else {
        debug!(id, %target, "status change requested for unknown complaint");
        return Ok(TransitionOutcome::NotFound);
    };
    if current == target {
        return Ok(TransitionOutcome::Unchanged(current));
    }
    if let Err(invalid) = current.can_transition_to(target) {
        debug!(id, %invalid, "status change rejected");
        return Ok(TransitionOutcome::Rejected(invalid));
    }
    apply(store, id, current, target)
}

fn apply<S: Storage>(
    store: &mut ComplaintStore<S>,
    id: &str,
    from: Status,
    to: Status,
) -> Result<TransitionOutcome, StoreError> {
    store.update_status(id, to)?;
    info!(id, %from, %to, "complaint advanced");
    Ok(TransitionOutcome::Advanced { from, to })
}
