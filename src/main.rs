//! # pbxpatch CLI
//!
//! Binary entry point for the `pbxpatch` command-line tool. It parses the
//! command line with `clap`, dispatches to one subcommand, and reports any
//! error through `anyhow`.
//!
//! All patching logic lives in the library crate; the binary only wires
//! arguments to it and prints results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
