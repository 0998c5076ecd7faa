//! `rfp completions` command - shell completion scripts
//!
//! Completes subcommands, flags and `--format` values. Scripts
//! go to stdout:
//!
//! ```bash
//! source <(rfp completions bash)          # ~/.bashrc
//! rfp completions zsh > ~/.zfunc/_rfp     # with ~/.zfunc on $fpath
//! rfp completions fish > ~/.config/fish/completions/rfp.fish
//! rfp completions powershell >> $PROFILE
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to print the rfp completion script for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    tracing::debug!(shell = %args.shell, "generating completions");
    generate(args.shell, &mut cmd, bin, &mut io::stdout());
    Ok(())
}
