//! `sluice completions <shell>`.

use clap::{Args, Command};
use clap_complete::{Shell, generate};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
pub fn run_completions(shell: Shell, command: &mut Command) -> anyhow::Result<()> {
    let stdout = io::stdout();
    write_completions(shell, command, &mut stdout.lock());
    Ok(())
}

fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) {
    let bin_name = command.get_name().to_string();
    generate(shell, command, bin_name, out);
}
