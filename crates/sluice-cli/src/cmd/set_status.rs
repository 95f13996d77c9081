//! `sluice set-status`: move a complaint to an explicit status.
//!
//! Only the next status in the lifecycle (or the current one, which is a
//! no-op) is accepted; jumps and regressions are rejected without writing.

use crate::cmd::advance::{TransitionBatch, finish, transition_one};
use crate::context::Workspace;
use crate::output::OutputMode;
use clap::Args;
use sluice_core::lifecycle;
use sluice_core::model::Status;

#[derive(Args, Debug)]
pub struct SetStatusArgs {
    /// Complaint ID or unique prefix.
    pub id: String,

    /// Target status: pending, under-review, in-progress or resolved.
    pub status: Status,
}

pub fn run_set_status(
    args: &SetStatusArgs,
    ws: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut store = ws.open_store()?;
    let result = transition_one(&mut store, &args.id, |store, id| {
        Ok(lifecycle::set_status(store, id, args.status)?)
    });
    finish(
        &TransitionBatch {
            results: vec![result],
        },
        output,
    )
}
