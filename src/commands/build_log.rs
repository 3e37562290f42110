//! Build-log command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use pbxpatch::buildlog;
use pbxpatch::output::{OutputConfig, Status};

/// Check a build log for the success marker
#[derive(Args, Debug)]
pub struct BuildLogArgs {
    /// Captured output of the engine build
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Case-sensitive text that marks a successful build
    #[arg(long, default_value = buildlog::SUCCESS_MARKER)]
    pub marker: String,
}

/// Execute the build-log command
pub fn execute(args: BuildLogArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    match buildlog::check_file(&args.log, &args.marker) {
        Ok(()) => {
            println!(
                "{}",
                Status::Ok.line(&out, format!("build succeeded ({})", args.log.display()))
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", Status::Failed.line(&out, "build failed"));
            Err(e.into())
        }
    }
}
