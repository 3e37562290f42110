//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// pbxpatch - Patch Xcode project descriptors for embedded engine builds
#[derive(Parser, Debug)]
#[command(name = "pbxpatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every step of a .pbxpatch.yaml recipe
    Apply(commands::apply::ApplyArgs),

    /// Embed a framework into a target's bundle
    Embed(commands::embed::EmbedArgs),

    /// Move a folder resource from one target to another
    MoveResource(commands::move_resource::MoveResourceArgs),

    /// Make the first header under a path public
    PublicHeader(commands::public_header::PublicHeaderArgs),

    /// Show targets, build phases and their files
    Tree(commands::tree::TreeArgs),

    /// Check a descriptor for dangling references
    Verify(commands::verify::VerifyArgs),

    /// Create and update .xcworkspace files
    Workspace(commands::workspace::WorkspaceArgs),

    /// Check a build log for the success marker
    BuildLog(commands::build_log::BuildLogArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let color = self.color.as_str();

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args, color),
            Commands::Embed(args) => commands::embed::execute(args, color),
            Commands::MoveResource(args) => commands::move_resource::execute(args, color),
            Commands::PublicHeader(args) => commands::public_header::execute(args, color),
            Commands::Tree(args) => commands::tree::execute(args),
            Commands::Verify(args) => commands::verify::execute(args, color),
            Commands::Workspace(args) => commands::workspace::execute(args, color),
            Commands::BuildLog(args) => commands::build_log::execute(args, color),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialisation (e.g. in tests) keeps the first logger.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
