use anyhow::Result;
use clap::Command;
use clap_complete::Shell;
use std::io::Write;

/// Print the `shell` completion script for the quickapply command tree
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    write_script(shell, cmd, &mut std::io::stdout().lock())
}

fn write_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, bin_name, out);
    out.flush()?;
    Ok(())
}
