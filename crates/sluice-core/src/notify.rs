//! Submission notifications.
//!
//! After a complaint is created the submitter gets one message with a link
//! to its tracking page. Delivery is best-effort: a failure is logged and
//! never undoes or fails the submission.

use crate::error::ErrorCode;
use crate::model::Complaint;
use tracing::{info, warn};

/// Something that can deliver a short text message to a phone number.
pub trait Notifier {
    /// Deliver `message` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed off.
    fn send(&self, to: &str, message: &str) -> anyhow::Result<()>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, message: &str) -> anyhow::Result<()> {
        info!(to, message, "notification (log only)");
        Ok(())
    }
}

/// Outcome of a best-effort notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No phone number on the complaint.
    Skipped,
    Failed { reason: String },
}

/// Public tracking page for a complaint id.
#[must_use]
pub fn tracking_url(base_url: &str, id: &str) -> String {
    format!("{}/alert/{id}", base_url.trim_end_matches('/'))
}

#[must_use]
pub fn submission_message(id: &str, url: &str) -> String {
    format!("Your complaint has been registered with ID: {id}. Track your complaint at: {url}")
}

/// Tell the submitter their complaint was registered.
pub fn notify_submission(
    notifier: &dyn Notifier,
    complaint: &Complaint,
    base_url: &str,
) -> Delivery {
    let phone = complaint.contact_details.phone.trim();
    if phone.is_empty() {
        return Delivery::Skipped;
    }

    let url = tracking_url(base_url, &complaint.id);
    let message = submission_message(&complaint.id, &url);
    match notifier.send(phone, &message) {
        Ok(()) => Delivery::Sent,
        Err(err) => {
            warn!(
                id = %complaint.id,
                code = %ErrorCode::NotificationFailed,
                error = %err,
                "submission notification failed"
            );
            Delivery::Failed {
                reason: err.to_string(),
            }
        }
    }
}
