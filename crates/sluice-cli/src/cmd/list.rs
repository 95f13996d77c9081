use crate::context::Workspace;
use crate::output::{OutputMode, Row, render_rows};
use clap::Args;
use serde::Serialize;
use sluice_core::model::{Complaint, Status};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show complaints with this status.
    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(Serialize)]
#[serde(transparent)]
struct ComplaintRow<'a>(&'a Complaint);

impl Row for ComplaintRow<'_> {
    const HEADERS: &'static [&'static str] = &["ID", "STATUS", "SEVERITY", "CATEGORY", "TITLE"];

    fn pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        let c = self.0;
        writeln!(
            w,
            "[{}] {:<14} {:<8} {}",
            c.reference(),
            c.status.label(),
            c.severity.label(),
            c.title
        )?;
        writeln!(
            w,
            "           {} · submitted {}",
            c.category.label(),
            c.created_at.format("%Y-%m-%d %H:%M UTC")
        )
    }

    fn text(&self, w: &mut dyn Write) -> io::Result<()> {
        let c = self.0;
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            c.id,
            c.status,
            c.severity,
            c.category,
            c.title
        )
    }
}

pub fn run_list(args: &ListArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    let store = ws.open_store()?;
    let rows: Vec<ComplaintRow<'_>> = store
        .list()
        .iter()
        .filter(|c| args.status.is_none_or(|s| c.status == s))
        .map(ComplaintRow)
        .collect();

    if rows.is_empty() && output == OutputMode::Pretty {
        println!("No complaints.");
        return Ok(());
    }
    render_rows(&rows, output)
}
