//! `sluice show`: the tracking view for one complaint.
//!
//! Accepts a full id or any unique prefix (the 8-character reference handed
//! to submitters works). An unknown id renders a not-found error rather than
//! an empty view.

use crate::context::{Workspace, fail};
use crate::output::{CliError, OutputMode, emit, field, rule, section};
use clap::Args;
use serde::Serialize;
use sluice_core::model::Complaint;
use sluice_core::notify::tracking_url;
use sluice_core::timeline::{self, Timeline};
use std::io::{self, Write};

const STAMP: &str = "%b %-d, %Y %H:%M UTC";

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Complaint ID or unique prefix.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    complaint: &'a Complaint,
    reference: &'a str,
    status_label: &'static str,
    status_summary: &'static str,
    tracking_url: String,
    timeline: Timeline,
}

impl<'a> ShowOutput<'a> {
    fn new(complaint: &'a Complaint, base_url: &str) -> Self {
        Self {
            complaint,
            reference: complaint.reference(),
            status_label: complaint.status.label(),
            status_summary: complaint.status.summary(),
            tracking_url: tracking_url(base_url, &complaint.id),
            timeline: timeline::project(complaint.status, complaint.created_at),
        }
    }
}

pub fn run_show(args: &ShowArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    let store = ws.open_store()?;
    let complaint = store
        .resolve(&args.id)
        .map_err(|err| fail(output, &CliError::from(&err)))?;

    let payload = ShowOutput::new(complaint, ws.base_url());
    emit(output, &payload, render_text, render_pretty)
}

fn render_text(p: &ShowOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    let c = p.complaint;
    writeln!(w, "id  {}", c.id)?;
    writeln!(w, "status  {}", c.status)?;
    writeln!(w, "title  {}", c.title)?;
    writeln!(w, "category  {}", c.category)?;
    writeln!(w, "severity  {}", c.severity)?;
    writeln!(w, "created  {}", c.created_at.to_rfc3339())?;
    writeln!(w, "updated  {}", c.updated_at.to_rfc3339())?;
    for m in p.timeline.milestones() {
        writeln!(
            w,
            "milestone  {}  {}  {}",
            if m.completed { "done" } else { "expected" },
            m.timestamp.to_rfc3339(),
            m.title
        )?;
    }
    Ok(())
}

fn render_pretty(p: &ShowOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    let c = p.complaint;
    section(w, &format!("Complaint #{}", p.reference))?;
    field(w, "Title", &c.title)?;
    field(w, "Status", p.status_label)?;
    field(w, "Category", c.category.label())?;
    field(
        w,
        "Severity",
        format!("{} ({})", c.severity.label(), c.severity.guidance()),
    )?;
    if let Some(address) = &c.location.address {
        field(w, "Address", address)?;
    }
    if let Some(coords) = &c.location.coordinates {
        field(
            w,
            "Coordinates",
            format!("{:.6}, {:.6}", coords.latitude, coords.longitude),
        )?;
    }
    field(w, "Submitted", c.created_at.format(STAMP).to_string())?;
    field(w, "Updated", c.updated_at.format(STAMP).to_string())?;
    if !c.images.is_empty() {
        field(w, "Images", c.images.len().to_string())?;
    }
    writeln!(w)?;
    writeln!(w, "{}", c.description)?;
    writeln!(w)?;
    writeln!(w, "{}", p.status_summary)?;
    writeln!(w)?;

    section(w, "Progress")?;
    for m in p.timeline.milestones() {
        let (mark, when) = if m.completed {
            ("[x]", "Completed on")
        } else {
            ("[ ]", "Expected by")
        };
        writeln!(w, "{mark} {}", m.title)?;
        writeln!(w, "    {}", m.description)?;
        writeln!(w, "    {when} {}", m.timestamp.format(STAMP))?;
    }
    rule(w)?;
    field(w, "Track at", &p.tracking_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sluice_core::model::{Category, ContactDetails, Location, Severity, Status};

    fn complaint(status: Status) -> Complaint {
        let at = Utc.with_ymd_and_hms(2026, 8, 3, 14, 0, 0).unwrap();
        Complaint {
            id: "c0ffee00-1111-4222-8333-444455556666".to_string(),
            title: "Cloudy water".to_string(),
            description: "Tap water has been cloudy for two days".to_string(),
            category: Category::Quality,
            severity: Severity::Medium,
            location: Location::new(Some("22 Elm St".to_string()), None),
            images: Vec::new(),
            status,
            created_at: at,
            updated_at: at,
            contact_details: ContactDetails::default(),
        }
    }

    #[test]
    fn json_flattens_complaint_and_adds_timeline() {
        let c = complaint(Status::InProgress);
        let value = serde_json::to_value(ShowOutput::new(&c, "https://t.example")).unwrap();
        assert_eq!(value["id"], c.id.as_str());
        assert_eq!(value["reference"], "c0ffee00");
        assert_eq!(value["status_label"], "In Progress");
        assert_eq!(
            value["tracking_url"],
            "https://t.example/alert/c0ffee00-1111-4222-8333-444455556666"
        );
        let flags: Vec<bool> = value["timeline"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["completed"].as_bool().unwrap())
            .collect();
        assert_eq!(flags, vec![true, true, true, false]);
    }

    #[test]
    fn pretty_marks_estimates() {
        let c = complaint(Status::Pending);
        let mut buf = Vec::new();
        render_pretty(&ShowOutput::new(&c, "http://x"), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Complaint #c0ffee00"));
        assert!(text.contains("[x] Complaint Submitted"));
        assert!(text.contains("[ ] Initial Assessment"));
        assert!(text.contains("Expected by Aug 3, 2026 16:00 UTC"));
        assert!(text.contains("awaiting review"));
    }

    #[test]
    fn text_lists_milestones() {
        let c = complaint(Status::Resolved);
        let mut buf = Vec::new();
        render_text(&ShowOutput::new(&c, "http://x"), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("milestone  done").count(), 4);
    }
}
