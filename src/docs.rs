//! Upstream snapshot handling: clone the documentation repository and copy
//! each branch's markdown into its `version-<branch>/origin/` directory.

use crate::config::SyncConfig;
use crate::git::run_git;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory holding the untranslated snapshot inside each version dir.
pub const ORIGIN_DIR: &str = "origin";

/// Directory for one documentation version, e.g. `versioned_docs/version-12.x`.
pub fn version_dir(repo_root: &Path, docs_root: &Path, branch: &str) -> PathBuf {
    repo_root.join(docs_root).join(format!("version-{branch}"))
}

/// Clones the upstream repository into `temp_dir`, removing any stale
/// directory first.
pub fn clone_docs(repo_url: &str, temp_dir: &Path) -> Result<()> {
    if temp_dir.exists() {
        fs::remove_dir_all(temp_dir)
            .with_context(|| format!("failed to remove stale clone dir {temp_dir:?}"))?;
        debug!(path = %temp_dir.display(), "Removed stale clone directory");
    }
    let dest = temp_dir.to_string_lossy();
    run_git(None, &["clone", repo_url, dest.as_ref()])?;
    info!(repo_url, path = %temp_dir.display(), "Cloned upstream docs repository");
    Ok(())
}

/// Checks out `branch` in the clone and copies every top-level markdown file
/// into the branch's `origin/` snapshot. Files on the excluded list are
/// additionally copied beside `origin/`, untranslated.
pub fn update_branch_docs(
    branch: &str,
    temp_dir: &Path,
    repo_root: &Path,
    config: &SyncConfig,
) -> Result<()> {
    run_git(Some(temp_dir), &["checkout", branch])?;

    let version_dir = version_dir(repo_root, &config.docs_root, branch);
    let origin_dir = version_dir.join(ORIGIN_DIR);
    fs::create_dir_all(&origin_dir)
        .with_context(|| format!("failed to create {origin_dir:?}"))?;

    let mut copied = 0usize;
    for entry in fs::read_dir(temp_dir)
        .with_context(|| format!("failed to read clone dir {temp_dir:?}"))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.ends_with(".md") {
            continue;
        }

        fs::copy(&path, origin_dir.join(file_name))
            .with_context(|| format!("failed to copy {file_name} into {origin_dir:?}"))?;
        copied += 1;

        if config.excluded_files.contains(&file_name.to_lowercase()) {
            fs::copy(&path, version_dir.join(file_name))
                .with_context(|| format!("failed to copy excluded {file_name}"))?;
            debug!(branch, file = file_name, "Copied excluded file untranslated");
        }
    }

    info!(branch, copied, "Updated branch docs snapshot");
    Ok(())
}
