use std::fmt;

/// Machine-readable error codes for scripted callers and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DataDirUnavailable,
    ComplaintNotFound,
    InvalidStatusTransition,
    AmbiguousId,
    InvalidEnumValue,
    InvalidSubmission,
    CorruptStore,
    StorageReadFailed,
    StorageWriteFailed,
    NotificationFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DataDirUnavailable => "E1002",
            Self::ComplaintNotFound => "E2001",
            Self::InvalidStatusTransition => "E2002",
            Self::AmbiguousId => "E2003",
            Self::InvalidEnumValue => "E2004",
            Self::InvalidSubmission => "E2005",
            Self::CorruptStore => "E3001",
            Self::StorageReadFailed => "E5001",
            Self::StorageWriteFailed => "E5002",
            Self::NotificationFailed => "E6001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DataDirUnavailable => "Data directory unavailable",
            Self::ComplaintNotFound => "Complaint not found",
            Self::InvalidStatusTransition => "Invalid status transition",
            Self::AmbiguousId => "Ambiguous complaint ID",
            Self::InvalidEnumValue => "Invalid category/severity/status value",
            Self::InvalidSubmission => "Invalid complaint submission",
            Self::CorruptStore => "Stored complaint collection is corrupt",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::NotificationFailed => "Notification delivery failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in config.toml inside the data directory."),
            Self::DataDirUnavailable => Some("Pass --data-dir or set SLUICE_HOME."),
            Self::ComplaintNotFound => {
                Some("Check the reference ID; `sluice list` shows every complaint.")
            }
            Self::InvalidStatusTransition => Some(
                "Follow the lifecycle: pending -> under-review -> in-progress -> resolved.",
            ),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::InvalidEnumValue => {
                Some("Use one of the documented category/severity/status values.")
            }
            Self::InvalidSubmission => None,
            Self::CorruptStore => {
                Some("The collection was reset to empty; older complaints cannot be recovered.")
            }
            Self::StorageReadFailed | Self::StorageWriteFailed => {
                Some("Check disk space and permissions on the data directory.")
            }
            Self::NotificationFailed => {
                Some("The complaint was still recorded; check [notify] endpoint in config.toml.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
