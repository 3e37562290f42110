//! Build log verdicts.
//!
//! The engine build tool is not driven from here; its captured output is
//! inspected afterwards. A build succeeded iff the log contains the success
//! marker (case-sensitive).

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};

pub const SUCCESS_MARKER: &str = "build success";

/// Whether `log` reports success.
pub fn is_success(log: &str, marker: &str) -> bool {
    log.contains(marker)
}

/// Read the log at `path`; `BuildFailed` unless it contains `marker`.
pub fn check_file(path: &Path, marker: &str) -> Result<()> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    debug!("read {} bytes of build log from {}", bytes.len(), path.display());
    if is_success(&text, marker) {
        info!("{} reports success", path.display());
        Ok(())
    } else {
        Err(Error::BuildFailed {
            message: format!("{:?} not found in {}", marker, path.display()),
        })
    }
}
