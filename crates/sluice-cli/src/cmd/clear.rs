use crate::context::{Workspace, fail};
use crate::output::{CliError, OutputMode, emit};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm deleting every stored complaint.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct ClearOutput {
    removed: usize,
}

pub fn run_clear(args: &ClearArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    if !args.yes {
        return Err(fail(
            output,
            &CliError::new("refusing to clear the complaint collection")
                .with_suggestion("re-run with --yes to delete every stored complaint")
                .with_code("confirmation_required"),
        ));
    }

    let mut store = ws.open_store()?;
    let removed = store
        .clear()
        .map_err(|err| fail(output, &CliError::from(&err)))?;

    emit(
        output,
        &ClearOutput { removed },
        |o, w| writeln!(w, "removed  {}", o.removed),
        |o, w| writeln!(w, "Cleared {} complaint(s).", o.removed),
    )
}
