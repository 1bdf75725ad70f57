//! Coordinating module for the clone → snapshot → translate → stage
//! pipeline. Files are processed sequentially; translation order and the
//! inter-file delay are part of the provider rate-limit discipline.

use crate::config::SyncConfig;
use crate::docs::{clone_docs, update_branch_docs, version_dir, ORIGIN_DIR};
use crate::git::{changed_origin_docs, stage_docs};
use crate::normalize::normalize;
use crate::translate::{render_prompt, translate_with_retry, RetryPolicy, Translator};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome summary of a sync run.
#[derive(Debug)]
pub struct SyncReport {
    pub files: Vec<FileReport>,
}

#[derive(Debug)]
pub struct FileReport {
    pub branch: String,
    pub file: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Translated,
    SkippedExcluded,
    SkippedEmpty,
    SkippedMissing,
}

/// Maps a changed path like `versioned_docs/version-12.x/origin/queues.md`
/// to its branch and file name. Paths outside a configured branch's origin
/// snapshot yield `None`.
pub fn branch_and_file(path: &str, branches: &[String]) -> Option<(String, String)> {
    let parts: Vec<&str> = path.split('/').collect();
    let origin_idx = parts.iter().position(|p| *p == ORIGIN_DIR)?;
    let file = parts.get(origin_idx + 1)?;
    let branch = branches.iter().find(|b| {
        let version_component = format!("version-{b}");
        parts[..origin_idx].iter().any(|p| *p == version_component)
    })?;
    Some((branch.clone(), (*file).to_string()))
}

/// Translates one origin snapshot into its target file: read, normalise
/// with the version token, translate, write. Returns `false` when the
/// source was empty and skipped.
pub async fn translate_file(
    source: &Path,
    target: &Path,
    version: Option<&str>,
    system_prompt: &str,
    translator: &dyn Translator,
    policy: &RetryPolicy,
) -> Result<bool> {
    let content =
        fs::read_to_string(source).with_context(|| format!("failed to read {source:?}"))?;
    if content.trim().is_empty() {
        warn!(source = %source.display(), "Skipping empty source file");
        return Ok(false);
    }

    info!(source = %source.display(), "Translation started");
    let normalized = normalize(&content, version);
    info!(
        source = %source.display(),
        bytes = normalized.len(),
        "Normalised document ready for translation"
    );

    let translated = translate_with_retry(translator, policy, system_prompt, &normalized)
        .await
        .with_context(|| format!("translation failed for {source:?}"))?;

    fs::write(target, translated).with_context(|| format!("failed to write {target:?}"))?;
    info!(source = %source.display(), target = %target.display(), "Translation complete");
    Ok(true)
}

/// Entrypoint: synchronise the docs tree according to config.
///
/// Clones the upstream repository into a scratch directory, refreshes every
/// configured branch snapshot, translates each changed origin file, and
/// stages the result. A branch that fails to update is logged and skipped;
/// a failed translation aborts the run.
pub async fn synchronise(
    repo_root: &Path,
    config: &SyncConfig,
    translator: &dyn Translator,
) -> Result<SyncReport> {
    info!("Starting docs synchronisation");

    let temp = tempfile::tempdir().context("failed to create scratch clone directory")?;
    clone_docs(&config.upstream.repo_url, temp.path())?;

    for branch in &config.upstream.branches {
        if let Err(e) = update_branch_docs(branch, temp.path(), repo_root, config) {
            error!(branch = %branch, error = ?e, "Failed to update branch docs, continuing");
        }
    }
    drop(temp);

    let changed = changed_origin_docs(repo_root)?;
    if changed.is_empty() {
        info!("No changed docs to translate");
    }

    let prompt_template = fs::read_to_string(&config.translation.prompt_path)
        .with_context(|| format!("failed to read prompt template {:?}", config.translation.prompt_path))?;
    let system_prompt = render_prompt(
        &prompt_template,
        &config.translation.source_lang,
        &config.translation.target_lang,
    );
    let policy = RetryPolicy::default();
    let delay = Duration::from_secs(config.translation.delay_secs);

    let mut processed: HashSet<String> = HashSet::new();
    let mut files: Vec<FileReport> = Vec::new();

    for path in &changed {
        let Some((branch, file)) = branch_and_file(path, &config.upstream.branches) else {
            continue;
        };
        if !processed.insert(format!("{branch}/{file}")) {
            continue;
        }

        if config.excluded_files.contains(&file.to_lowercase()) {
            info!(branch = %branch, file = %file, "Excluded from translation");
            files.push(FileReport {
                branch,
                file,
                outcome: FileOutcome::SkippedExcluded,
            });
            continue;
        }

        let version_path = version_dir(repo_root, &config.docs_root, &branch);
        let source = version_path.join(ORIGIN_DIR).join(&file);
        let target = version_path.join(&file);
        if !source.exists() {
            warn!(branch = %branch, file = %file, "Origin snapshot missing, skipping");
            files.push(FileReport {
                branch,
                file,
                outcome: FileOutcome::SkippedMissing,
            });
            continue;
        }

        // The branch name is the version token substituted into the text.
        let translated = translate_file(
            &source,
            &target,
            Some(&branch),
            &system_prompt,
            translator,
            &policy,
        )
        .await?;

        let outcome = if translated {
            tokio::time::sleep(delay).await;
            FileOutcome::Translated
        } else {
            FileOutcome::SkippedEmpty
        };
        files.push(FileReport {
            branch,
            file,
            outcome,
        });
    }

    stage_docs(repo_root, &config.docs_root)?;
    info!(files = files.len(), "Docs synchronisation complete");

    Ok(SyncReport { files })
}
