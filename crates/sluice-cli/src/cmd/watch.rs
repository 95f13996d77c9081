//! `sluice watch`: run the demonstration auto-advancer in the foreground.
//!
//! Each watched complaint moves forward on the configured `[advance]`
//! delays until it is resolved. Events stream to stdout as they happen
//! (one JSON object per line in JSON mode). Runs on this thread and exits
//! once nothing is left to advance.

use crate::context::{Workspace, fail};
use crate::output::{CliError, OutputMode};
use clap::Args;
use sluice_core::advancer::{AdvanceEvent, AutoAdvancer};
use sluice_core::clock::{Clock, SystemClock};
use sluice_core::model::{Status, reference};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Complaint IDs or unique prefixes to watch.
    #[arg(value_name = "ID", required_unless_present = "all", conflicts_with = "all")]
    pub ids: Vec<String>,

    /// Watch every complaint that is not yet resolved.
    #[arg(long)]
    pub all: bool,
}

pub fn run_watch(args: &WatchArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    let mut store = ws.open_store()?;
    let clock = SystemClock;
    let mut advancer = AutoAdvancer::new(ws.config().advance.to_delays());

    let now = clock.now();
    if args.all {
        for complaint in store.list() {
            advancer.watch(complaint, now);
        }
    } else {
        for raw in &args.ids {
            let complaint = store
                .resolve(raw)
                .map_err(|err| fail(output, &CliError::from(&err)))?;
            if advancer.watch(complaint, now).is_none() {
                tracing::info!(id = %complaint.id, "already resolved; nothing to watch");
            }
        }
    }

    if advancer.is_idle() {
        if output == OutputMode::Pretty {
            println!("Nothing to watch: every selected complaint is resolved.");
        }
        return Ok(());
    }
    tracing::info!(watching = advancer.len(), "auto-advancer started");

    let stdout = io::stdout();
    advancer
        .run_until_idle(&mut store, &clock, std::thread::sleep, |event| {
            let mut out = stdout.lock();
            if let Err(err) = write_event(&mut out, output, event) {
                tracing::warn!(error = %err, "failed to write watch event");
            }
        })
        .map_err(|err| fail(output, &CliError::from(&err)))?;

    if output == OutputMode::Pretty {
        println!("Auto-advance finished.");
    }
    Ok(())
}

fn write_event(w: &mut dyn Write, output: OutputMode, event: &AdvanceEvent) -> io::Result<()> {
    match output {
        OutputMode::Json => {
            serde_json::to_writer(&mut *w, event).map_err(io::Error::other)?;
            writeln!(w)
        }
        OutputMode::Text => match event {
            AdvanceEvent::Advanced { id, from, to, .. } => {
                writeln!(w, "advanced  {id}  {from} -> {to}")
            }
            AdvanceEvent::Stale {
                id,
                observed,
                current,
                ..
            } => writeln!(w, "stale  {id}  {observed} -> {current}"),
            AdvanceEvent::Vanished { id } => writeln!(w, "vanished  {id}"),
        },
        OutputMode::Pretty => match event {
            AdvanceEvent::Advanced {
                id,
                from,
                to,
                next_due,
            } => {
                write!(w, "#{}  {} → {}", reference(id), from.label(), to.label())?;
                match next_due {
                    Some(due) => writeln!(w, "  (next step at {})", due.format("%H:%M:%S")),
                    None if *to == Status::Resolved => writeln!(w, "  (done)"),
                    None => writeln!(w),
                }
            }
            AdvanceEvent::Stale { id, current, .. } => writeln!(
                w,
                "#{}  changed elsewhere; now {}, timer restarted",
                reference(id),
                current.label()
            ),
            AdvanceEvent::Vanished { id } => {
                writeln!(w, "#{}  no longer exists; stopped watching", reference(id))
            }
        },
    }
}
