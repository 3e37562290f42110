//! Host filesystem helpers: locating project bundles and the directory and
//! file copies run alongside descriptor patches.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Descriptor file inside an `.xcodeproj` bundle.
pub const DESCRIPTOR_FILE: &str = "project.pbxproj";

pub const PROJECT_EXTENSION: &str = "xcodeproj";

fn fs_error(message: impl Into<String>) -> Error {
    Error::Filesystem {
        message: message.into(),
    }
}

/// Resolve a project argument to its descriptor file.
///
/// Accepts an `.xcodeproj` bundle, a directory holding exactly one bundle
/// (first in name order if several), or the descriptor file itself.
pub fn descriptor_path(project: &Path) -> Result<PathBuf> {
    if project.is_file() {
        return Ok(project.to_path_buf());
    }
    if project.extension().is_some_and(|ext| ext == PROJECT_EXTENSION) {
        return Ok(project.join(DESCRIPTOR_FILE));
    }
    if project.is_dir() {
        return Ok(find_project(project)?.join(DESCRIPTOR_FILE));
    }
    Err(Error::not_found(format!("project at {}", project.display())))
}

/// First `.xcodeproj` bundle directly inside `dir`, in name order.
pub fn find_project(dir: &Path) -> Result<PathBuf> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        PROJECT_EXTENSION
    );
    let mut bundles: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();
    bundles.sort();
    let bundle = bundles
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(format!("*.{} in {}", PROJECT_EXTENSION, dir.display())))?;
    debug!("found project bundle {}", bundle.display());
    Ok(bundle)
}

/// Replace `to` with a recursive copy of `from`.
///
/// The destination is deleted first, so files absent from `from` do not
/// survive. Returns the number of files copied.
pub fn replace_dir(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(fs_error(format!(
            "source directory {} does not exist",
            from.display()
        )));
    }
    if to.exists() {
        fs::remove_dir_all(to)?;
        debug!("removed {}", to.display());
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| fs_error(format!("walking {}: {}", from.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| fs_error(format!("{} escaped {}", entry.path().display(), from.display())))?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    info!("replaced {} with {} ({} files)", to.display(), from.display(), copied);
    Ok(copied)
}

/// Overwrite `to` with the contents of `from`, creating parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(fs_error(format!("source file {} does not exist", from.display())));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    info!("copied {} to {}", from.display(), to.display());
    Ok(())
}
