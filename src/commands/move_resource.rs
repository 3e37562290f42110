//! Move-resource command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use pbxpatch::config::{MoveResourceOp, Step};
use pbxpatch::output::OutputConfig;

/// Move a folder resource from one target's bundle to another's
#[derive(Args, Debug)]
pub struct MoveResourceArgs {
    /// The .xcodeproj bundle, its directory, or its project.pbxproj
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Folder path as referenced from the project
    #[arg(long, default_value = "Data")]
    pub path: String,

    /// Target currently bundling the folder
    #[arg(long, default_value = "Unity-iPhone")]
    pub from: String,

    /// Target that should bundle the folder
    #[arg(long, default_value = "UnityFramework")]
    pub to: String,

    /// Show what would be done without writing the project
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the move-resource command
pub fn execute(args: MoveResourceArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let step = Step::MoveResource {
        move_resource: MoveResourceOp {
            project: args.project,
            path: args.path,
            from_target: args.from,
            to_target: args.to,
        },
    };
    super::run_steps(&[step], args.dry_run, &out)?;
    Ok(())
}
