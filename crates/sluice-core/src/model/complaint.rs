use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of id characters shown to people as the complaint reference.
pub const REFERENCE_LEN: usize = 8;

/// The four lifecycle statuses, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    UnderReview,
    InProgress,
    Resolved,
}

impl Status {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under-review",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    /// Label shown in the tracking view.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending Review",
            Self::UnderReview => "Under Review",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    /// One-sentence explanation of what the status means for the submitter.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Pending => {
                "Your complaint has been received and is awaiting review by our team."
            }
            Self::UnderReview => {
                "Our team is currently reviewing your complaint and assessing the next steps."
            }
            Self::InProgress => {
                "Maintenance team has been dispatched and is working to resolve the issue."
            }
            Self::Resolved => {
                "The reported issue has been successfully resolved. Thank you for your report!"
            }
        }
    }
}

/// What kind of water problem is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Leak,
    Quality,
    Pressure,
    Drainage,
    Infrastructure,
    Service,
    Other,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Leak,
        Self::Quality,
        Self::Pressure,
        Self::Drainage,
        Self::Infrastructure,
        Self::Service,
        Self::Other,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Leak => "leak",
            Self::Quality => "quality",
            Self::Pressure => "pressure",
            Self::Drainage => "drainage",
            Self::Infrastructure => "infrastructure",
            Self::Service => "service",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leak => "Water Leak",
            Self::Quality => "Water Quality Issue",
            Self::Pressure => "Low Water Pressure",
            Self::Drainage => "Drainage Problem",
            Self::Infrastructure => "Infrastructure Damage",
            Self::Service => "Service Disruption",
            Self::Other => "Other",
        }
    }
}

/// How urgently the submitter believes the problem needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    #[must_use]
    pub const fn guidance(self) -> &'static str {
        match self {
            Self::Low => "Not urgent, can be fixed when convenient",
            Self::Medium => "Should be addressed soon",
            Self::High => "Needs prompt attention",
            Self::Critical => "Immediate action required",
        }
    }
}

/// A latitude/longitude pair. Ranges are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where the problem is. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// Build a location, treating a blank address as absent.
    #[must_use]
    pub fn new(address: Option<String>, coordinates: Option<Coordinates>) -> Self {
        let address = address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        Self {
            address,
            coordinates,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.address.is_none() && self.coordinates.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything a submitter provides. The store assigns the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintInput {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    pub contact_details: ContactDetails,
}

/// A persisted complaint.
///
/// Only `status` and `updated_at` ever change after creation, and only
/// through [`crate::store::ComplaintStore::update_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub contact_details: ContactDetails,
}

impl Complaint {
    pub(crate) fn from_input(id: String, input: ComplaintInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            severity: input.severity,
            location: input.location,
            images: input.images,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
            contact_details: input.contact_details,
        }
    }

    /// Short reference for display. The full id stays the lookup key.
    #[must_use]
    pub fn reference(&self) -> &str {
        reference(&self.id)
    }
}

/// The first [`REFERENCE_LEN`] characters of `id`, or all of it when shorter.
#[must_use]
pub fn reference(id: &str) -> &str {
    id.char_indices()
        .nth(REFERENCE_LEN)
        .map_or(id, |(end, _)| &id[..end])
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "under-review" | "under_review" => Ok(Self::UnderReview),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "category",
                got: s.to_string(),
            })
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "severity",
                got: s.to_string(),
            })
    }
}
