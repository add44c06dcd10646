//! Completions command - print a shell completion script

use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

use crate::cli::Cli;

/// Write completions for `shell` to `buf`
pub fn generate<W: Write>(shell: Shell, buf: &mut W) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, buf);
}

/// Execute the completions command
pub fn execute(shell: Shell) {
    generate(shell, &mut std::io::stdout());
}
