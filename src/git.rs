//! Thin wrappers around the `git` CLI: command execution, change detection
//! over `status --porcelain`, and staging of the docs tree.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;
use tracing::{debug, error, info};

/// Runs a git command, returning raw stdout. Non-zero exit codes become
/// errors carrying trimmed stderr.
pub fn run_git(cwd: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.args(args);
    debug!(?args, cwd = ?cwd, "Running git command");

    let output = cmd
        .output()
        .with_context(|| format!("failed to launch git {args:?}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(?args, status = ?output.status, stderr = %stderr, "git command failed");
        anyhow::bail!(
            "git {:?} exited with {}: {}",
            args,
            output.status,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extracts changed origin-snapshot markdown paths from
/// `git status --porcelain` output.
///
/// A path qualifies when it ends in `.md`, is at least three components
/// deep, and has an `origin` directory somewhere past the first component.
/// Renames contribute their new path. The result is deduplicated and
/// sorted.
pub fn parse_porcelain(output: &str) -> Vec<String> {
    let mut files: BTreeSet<String> = BTreeSet::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        // Two status characters, then the path.
        let Some(rest) = line.get(2..) else {
            continue;
        };
        let mut path = rest.trim_start();
        if let Some((_, renamed_to)) = path.split_once(" -> ") {
            path = renamed_to;
        }
        if !path.ends_with(".md") {
            continue;
        }
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 3 && parts[1..].iter().any(|p| *p == "origin") {
            files.insert(path.to_string());
        }
    }

    files.into_iter().collect()
}

/// Lists changed origin markdown files in the repository, relative to its
/// root.
pub fn changed_origin_docs(repo_root: &Path) -> Result<Vec<String>> {
    let output = run_git(Some(repo_root), &["status", "--porcelain"])?;
    let files = parse_porcelain(&output);
    info!(changed = files.len(), "Detected changed origin docs");
    Ok(files)
}

/// Stages the whole docs tree.
pub fn stage_docs(repo_root: &Path, docs_root: &Path) -> Result<()> {
    let docs = docs_root.to_string_lossy();
    run_git(Some(repo_root), &["add", docs.as_ref()])?;
    info!(docs_root = %docs, "Staged docs tree");
    Ok(())
}
