//! Public-header command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use pbxpatch::config::{PublicHeaderOp, Step};
use pbxpatch::output::OutputConfig;

/// Make the first header whose path contains a marker public
#[derive(Args, Debug)]
pub struct PublicHeaderArgs {
    /// The .xcodeproj bundle, its directory, or its project.pbxproj
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Substring of the header path
    #[arg(long, default_value = "Libraries/Plugins/iOS")]
    pub marker: String,

    /// Show what would be done without writing the project
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the public-header command
pub fn execute(args: PublicHeaderArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let step = Step::PublicHeader {
        public_header: PublicHeaderOp {
            project: args.project,
            marker: args.marker,
        },
    };
    super::run_steps(&[step], args.dry_run, &out)?;
    Ok(())
}
