//! Apply command implementation
//!
//! Runs every step of a `.pbxpatch.yaml` recipe. Project descriptors are
//! written once, after the last step succeeded.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pbxpatch::config;
use pbxpatch::output::{emoji, OutputConfig};

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the recipe file
    #[arg(short, long, value_name = "PATH", env = "PBXPATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show what would be done without writing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_RECIPE));

    if !config_path.exists() {
        anyhow::bail!("Recipe file not found: {}", config_path.display());
    }

    let recipe = config::from_file(&config_path)
        .with_context(|| format!("Failed to load recipe from {}", config_path.display()))?;
    println!(
        "{} {} ({} steps)",
        emoji(&out, "📋", "[RECIPE]"),
        out.heading(&config_path.display().to_string()),
        recipe.len()
    );

    super::run_steps(&recipe, args.dry_run, &out)?;
    Ok(())
}
