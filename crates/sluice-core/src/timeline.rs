//! Timeline projection: status + creation time -> four progress milestones.
//!
//! The projection is pure. It reads nothing but its two arguments, so the
//! same inputs always give identical output and nothing needs caching or
//! persisting. Every milestone carries a timestamp; for milestones not yet
//! reached it is an estimate.

use crate::model::Status;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Hours from submission to initial assessment.
pub const ASSESSMENT_HOURS: i64 = 2;
/// Hours from initial assessment to crew dispatch.
pub const DISPATCH_HOURS: i64 = 24;
/// Hours from crew dispatch to resolution.
pub const RESOLUTION_HOURS: i64 = 48;

/// The fixed milestones, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneKind {
    Submitted,
    InitialAssessment,
    MaintenanceDispatched,
    Resolution,
}

impl MilestoneKind {
    pub const ALL: [Self; 4] = [
        Self::Submitted,
        Self::InitialAssessment,
        Self::MaintenanceDispatched,
        Self::Resolution,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Submitted => "Complaint Submitted",
            Self::InitialAssessment => "Initial Assessment",
            Self::MaintenanceDispatched => "Maintenance Team Dispatched",
            Self::Resolution => "Issue Resolution",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Submitted => {
                "Your water issue report has been successfully submitted to our system."
            }
            Self::InitialAssessment => {
                "Our team will review your complaint and assess its severity and priority."
            }
            Self::MaintenanceDispatched => {
                "A team will be sent to inspect and address the reported issue."
            }
            Self::Resolution => {
                "The water issue will be fixed and the complaint will be marked as resolved."
            }
        }
    }

    /// The status at which this milestone counts as reached. Milestone `i`
    /// is reached by status `i` in the lifecycle order.
    #[must_use]
    pub const fn reached_at(self) -> Status {
        match self {
            Self::Submitted => Status::Pending,
            Self::InitialAssessment => Status::UnderReview,
            Self::MaintenanceDispatched => Status::InProgress,
            Self::Resolution => Status::Resolved,
        }
    }

    /// Offset from the previous milestone (zero for the first).
    fn offset(self) -> Duration {
        Duration::hours(match self {
            Self::Submitted => 0,
            Self::InitialAssessment => ASSESSMENT_HOURS,
            Self::MaintenanceDispatched => DISPATCH_HOURS,
            Self::Resolution => RESOLUTION_HOURS,
        })
    }
}

/// One entry of a projected timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub title: &'static str,
    pub description: &'static str,
    pub timestamp: DateTime<Utc>,
    pub completed: bool,
}

impl Milestone {
    /// True when `timestamp` is an estimate rather than an actual.
    #[must_use]
    pub const fn is_estimate(&self) -> bool {
        !self.completed
    }
}

/// The four milestones for one complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    milestones: Vec<Milestone>,
}

impl Timeline {
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.completed).count()
    }

    /// First milestone not yet reached.
    #[must_use]
    pub fn next_pending(&self) -> Option<&Milestone> {
        self.milestones.iter().find(|m| !m.completed)
    }
}

/// Project the timeline for a complaint with `status` created at `created_at`.
///
/// Estimates past the representable range clamp to `DateTime::<Utc>::MAX_UTC`.
#[must_use]
pub fn project(status: Status, created_at: DateTime<Utc>) -> Timeline {
    let mut timestamp = created_at;
    let milestones = MilestoneKind::ALL
        .into_iter()
        .map(|kind| {
            timestamp = timestamp
                .checked_add_signed(kind.offset())
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            Milestone {
                kind,
                title: kind.title(),
                description: kind.description(),
                timestamp,
                completed: status.position() >= kind.reached_at().position(),
            }
        })
        .collect();
    Timeline { milestones }
}
