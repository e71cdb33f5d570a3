use clap::Command;
use clap_complete::{generate, Shell};

use super::CliResult;

pub fn run(shell: Shell, cmd: &mut Command) -> CliResult {
    generate(shell, cmd, "safezone", &mut std::io::stdout());
    Ok(())
}
