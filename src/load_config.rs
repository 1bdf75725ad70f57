use crate::config::{Provider, SyncConfig, TranslationConfig, UpstreamConfig};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_DELAY_SECS: u64 = 10;

/// Static YAML shape. Secrets never live here; they are injected from the
/// environment (API keys by the translator itself, overrides below).
#[derive(serde::Deserialize)]
struct StaticConfig {
    upstream: UpstreamSection,
    #[serde(default = "default_docs_root")]
    docs_root: PathBuf,
    #[serde(default)]
    excluded_files: Vec<String>,
    #[serde(default)]
    translation: TranslationSection,
}

#[derive(serde::Deserialize)]
struct UpstreamSection {
    repo_url: String,
    branches: Vec<String>,
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
struct TranslationSection {
    provider: Option<String>,
    model: Option<String>,
    prompt_path: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    delay_secs: Option<u64>,
}

fn default_docs_root() -> PathBuf {
    PathBuf::from("versioned_docs")
}

/// Loads the static YAML config file and merges environment overrides
/// (`TRANSLATION_PROVIDER`, `TRANSLATION_MODEL`, `TRANSLATION_DELAY`).
/// Returns a fully merged [`SyncConfig`] or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if static_conf.upstream.branches.is_empty() {
        error!("Config lists no upstream branches");
        anyhow::bail!("upstream.branches must not be empty");
    }

    let provider_name = std::env::var("TRANSLATION_PROVIDER")
        .ok()
        .or(static_conf.translation.provider)
        .unwrap_or_else(|| "openai".to_string());
    let provider = parse_provider(&provider_name)?;

    let model = std::env::var("TRANSLATION_MODEL")
        .ok()
        .or(static_conf.translation.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let delay_secs = resolve_delay(static_conf.translation.delay_secs);

    let translation = TranslationConfig {
        provider,
        model,
        prompt_path: static_conf
            .translation
            .prompt_path
            .unwrap_or_else(|| PathBuf::from("prompt.md")),
        source_lang: static_conf
            .translation
            .source_lang
            .unwrap_or_else(|| "en".to_string()),
        target_lang: static_conf
            .translation
            .target_lang
            .unwrap_or_else(|| "ko".to_string()),
        delay_secs,
    };
    translation.trace_loaded();

    let config = SyncConfig {
        upstream: UpstreamConfig {
            repo_url: static_conf.upstream.repo_url,
            branches: static_conf.upstream.branches,
        },
        docs_root: static_conf.docs_root,
        excluded_files: static_conf
            .excluded_files
            .into_iter()
            .map(|f| f.to_lowercase())
            .collect(),
        translation,
    };
    config.trace_loaded();

    Ok(config)
}

fn parse_provider(name: &str) -> Result<Provider> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(Provider::OpenAi),
        "azure" => Ok(Provider::Azure),
        other => {
            error!(provider = %other, "Unsupported translation provider");
            anyhow::bail!("Unsupported translation provider: {}", other)
        }
    }
}

/// `TRANSLATION_DELAY` beats the config value; an unparseable or
/// non-positive value falls back with a warning instead of failing the run.
fn resolve_delay(configured: Option<u64>) -> u64 {
    let fallback = configured.unwrap_or(DEFAULT_DELAY_SECS);
    match std::env::var("TRANSLATION_DELAY") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(value = %raw, fallback, "Invalid TRANSLATION_DELAY, using fallback");
                fallback
            }
        },
        Err(_) => fallback,
    }
}
