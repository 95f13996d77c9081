//! `sluice submit`: record a new complaint and notify the submitter.
//!
//! Builds a `ComplaintInput` from flags, validates it like the intake form,
//! creates it in the store, then sends the tracking link. Notification is
//! best-effort and never fails the command.

use crate::context::{Workspace, fail};
use crate::output::{CliError, OutputMode, emit, field, section};
use crate::validate;
use clap::Args;
use serde::Serialize;
use sluice_core::model::{
    Category, ComplaintInput, ContactDetails, Coordinates, Location, Severity, Status,
};
use sluice_core::notify::{self, Delivery};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Short summary of the problem.
    #[arg(long)]
    pub title: String,

    /// What is happening, and since when.
    #[arg(long)]
    pub description: String,

    /// leak, quality, pressure, drainage, infrastructure, service or other.
    #[arg(long)]
    pub category: Category,

    /// low, medium, high or critical.
    #[arg(long)]
    pub severity: Severity,

    /// Street address or landmark.
    #[arg(long)]
    pub address: Option<String>,

    /// Latitude of the problem (requires --lon).
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the problem (requires --lat).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Image URL or data URI. Repeat for several images.
    #[arg(long = "image", value_name = "URI")]
    pub images: Vec<String>,

    /// Submitter's name.
    #[arg(long)]
    pub name: String,

    /// Submitter's email.
    #[arg(long)]
    pub email: String,

    /// Submitter's phone; the tracking link is sent here.
    #[arg(long)]
    pub phone: String,

    /// Skip the SMS notification.
    #[arg(long)]
    pub no_notify: bool,
}

impl SubmitArgs {
    fn to_input(&self) -> ComplaintInput {
        let coordinates = self.lat.zip(self.lon).map(|(latitude, longitude)| Coordinates {
            latitude,
            longitude,
        });
        ComplaintInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category,
            severity: self.severity,
            location: Location::new(self.address.clone(), coordinates),
            images: self.images.clone(),
            contact_details: ContactDetails {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: self.phone.trim().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitOutput {
    id: String,
    reference: String,
    status: Status,
    tracking_url: String,
    notification: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_error: Option<String>,
}

pub fn run_submit(args: &SubmitArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    let input = args.to_input();
    if let Err(e) = validate::validate_submission(&input) {
        return Err(fail(output, &e.to_cli_error()));
    }

    let mut store = ws.open_store()?;
    let id = store
        .create(input)
        .map_err(|err| fail(output, &CliError::from(&err)))?;
    let Some(complaint) = store.get(&id) else {
        anyhow::bail!("complaint {id} missing right after create");
    };

    let delivery = match ws.notifier() {
        Some(notifier) if !args.no_notify => {
            notify::notify_submission(notifier.as_ref(), complaint, ws.base_url())
        }
        _ => Delivery::Skipped,
    };
    let (notification, notification_error) = match delivery {
        Delivery::Sent => ("sent", None),
        Delivery::Skipped => ("skipped", None),
        Delivery::Failed { reason } => ("failed", Some(reason)),
    };

    let payload = SubmitOutput {
        id: complaint.id.clone(),
        reference: complaint.reference().to_string(),
        status: complaint.status,
        tracking_url: notify::tracking_url(ws.base_url(), &complaint.id),
        notification,
        notification_error,
    };

    emit(
        output,
        &payload,
        |p, w| writeln!(w, "{}\t{}\t{}", p.id, p.status, p.tracking_url),
        |p, w| {
            section(w, "Complaint submitted")?;
            field(w, "Reference", &p.reference)?;
            field(w, "ID", &p.id)?;
            field(w, "Status", p.status.label())?;
            field(w, "Track at", &p.tracking_url)?;
            match &p.notification_error {
                Some(reason) => field(w, "SMS", format!("not sent ({reason})")),
                None => field(w, "SMS", p.notification),
            }
        },
    )
}
