// src/recipe/kitchen/vcs.rs

//! Development-head checkout

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Shallow-clone one branch of a repository into `dest`
///
/// A branch or repository git cannot find is an unresolvable source; any other
/// failure is treated as a transport error.
pub fn clone_branch(git: &Path, repository: &str, branch: &str, dest: &Path) -> Result<()> {
    info!("Cloning {} (branch {})", repository, branch);

    let output = Command::new(git)
        .args(["clone", "--depth", "1", "--single-branch", "--branch", branch, "--"])
        .arg(repository)
        .arg(dest)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::DownloadError(format!("Failed to run git: {}", e)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("git clone stderr: {}", stderr.trim());

    if output.status.success() {
        return Ok(());
    }

    if is_missing_ref(&stderr) {
        Err(Error::UnresolvableSource(format!(
            "{} has no branch {}: {}",
            repository,
            branch,
            stderr.trim()
        )))
    } else {
        Err(Error::DownloadError(format!(
            "git clone of {} failed with exit code {:?}: {}",
            repository,
            output.status.code(),
            stderr.trim()
        )))
    }
}

fn is_missing_ref(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("remote branch") && lower.contains("not found")
        || lower.contains("repository") && lower.contains("not found")
        || lower.contains("does not appear to be a git repository")
}
