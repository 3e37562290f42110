//! Embed command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use pbxpatch::config::{EmbedFrameworkOp, Step};
use pbxpatch::output::OutputConfig;

/// Embed a framework into a target's bundle
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// The .xcodeproj bundle, its directory, or its project.pbxproj
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Framework path as referenced from the project
    #[arg(short, long, default_value = "UnityFramework.framework")]
    pub framework: String,

    /// Target to embed into (default: first application target)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Keep the framework in the target's link phases
    #[arg(long)]
    pub keep_linked: bool,

    /// Show what would be done without writing the project
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the embed command
pub fn execute(args: EmbedArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let step = Step::EmbedFramework {
        embed_framework: EmbedFrameworkOp {
            project: args.project,
            framework: args.framework,
            target: args.target,
            keep_linked: args.keep_linked,
        },
    };
    super::run_steps(&[step], args.dry_run, &out)?;
    Ok(())
}
