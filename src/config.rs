use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Fully merged runtime configuration for a sync run.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    pub upstream: UpstreamConfig,
    /// Root of the versioned docs tree, relative to the repository root.
    pub docs_root: PathBuf,
    /// Lowercased file names copied verbatim and never translated.
    pub excluded_files: Vec<String>,
    pub translation: TranslationConfig,
}

impl SyncConfig {
    pub fn trace_loaded(&self) {
        info!(
            repo_url = %self.upstream.repo_url,
            branches = self.upstream.branches.len(),
            docs_root = %self.docs_root.display(),
            excluded = self.excluded_files.len(),
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// URL of the upstream documentation repository.
    pub repo_url: String,
    /// Branches to snapshot, e.g. `["master", "12.x", "11.x"]`. The branch
    /// name doubles as the version token substituted into documents.
    pub branches: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub provider: Provider,
    pub model: String,
    /// Prompt template file with `{source_lang}`/`{target_lang}` slots.
    pub prompt_path: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
    /// Pause between consecutive file translations, for rate limiting.
    pub delay_secs: u64,
}

impl TranslationConfig {
    pub fn trace_loaded(&self) {
        info!(
            provider = ?self.provider,
            model = %self.model,
            source_lang = %self.source_lang,
            target_lang = %self.target_lang,
            delay_secs = self.delay_secs,
            "Loaded TranslationConfig"
        );
    }
}

/// Chat-completion backend used for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Azure,
}
