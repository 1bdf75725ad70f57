//! Translation client: the [`Translator`] seam, a chat-completion
//! implementation for OpenAI and Azure OpenAI, and the retry/timeout
//! wrapper every call goes through.

use crate::config::{Provider, TranslationConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Errors surfaced by a translation call.
#[derive(Debug)]
pub enum TranslateError {
    /// Transport-level failure (connection, TLS, body decoding).
    Http(reqwest::Error),
    /// Non-success response from the provider.
    Api { status: u16, body: String },
    /// HTTP 429; the retry wrapper backs off longer for these.
    RateLimited,
    /// The whole call exceeded the configured deadline.
    Timeout(u64),
    /// The provider returned a completion with no content.
    EmptyResponse,
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Http(e) => write!(f, "http error: {e}"),
            TranslateError::Api { status, body } => {
                write!(f, "api error (status {status}): {body}")
            }
            TranslateError::RateLimited => write!(f, "rate limited by provider"),
            TranslateError::Timeout(secs) => write!(f, "translation timed out after {secs}s"),
            TranslateError::EmptyResponse => write!(f, "provider returned empty completion"),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslateError::Http(e) => Some(e),
            _ => None,
        }
    }
}

/// Trait for translating one document. Implemented by the real API client
/// and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` under the given system prompt, returning the
    /// translated document.
    async fn translate(&self, system_prompt: &str, text: &str)
        -> Result<String, TranslateError>;
}

enum Auth {
    Bearer(String),
    ApiKey(String),
}

/// Chat-completion client for OpenAI-compatible endpoints.
pub struct OpenAiTranslator {
    client: reqwest::Client,
    endpoint: String,
    auth: Auth,
    model: String,
}

impl OpenAiTranslator {
    /// Builds a client for the configured provider, reading credentials from
    /// the environment: `OPENAI_API_KEY` for OpenAI, or
    /// `AZURE_OPENAI_API_KEY` / `AZURE_OPENAI_ENDPOINT` /
    /// `AZURE_OPENAI_API_VERSION` for Azure.
    pub fn from_env(config: &TranslationConfig) -> Result<Self> {
        let (endpoint, auth) = match config.provider {
            Provider::OpenAi => {
                let api_key =
                    std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
                (
                    "https://api.openai.com/v1/chat/completions".to_string(),
                    Auth::Bearer(api_key),
                )
            }
            Provider::Azure => {
                let api_key = std::env::var("AZURE_OPENAI_API_KEY")
                    .context("AZURE_OPENAI_API_KEY not set")?;
                let base = std::env::var("AZURE_OPENAI_ENDPOINT")
                    .context("AZURE_OPENAI_ENDPOINT not set")?;
                let api_version = std::env::var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|_| "2025-05-01-preview".to_string());
                (
                    format!(
                        "{}/openai/deployments/{}/chat/completions?api-version={}",
                        base.trim_end_matches('/'),
                        config.model,
                        api_version
                    ),
                    Auth::ApiKey(api_key),
                )
            }
        };

        info!(provider = ?config.provider, model = %config.model, "Constructed translation client");
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            auth,
            model: config.model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        system_prompt: &str,
        text: &str,
    ) -> Result<String, TranslateError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": text },
            ],
        });

        let request = self.client.post(&self.endpoint).json(&body);
        let request = match &self.auth {
            Auth::Bearer(key) => request.bearer_auth(key),
            Auth::ApiKey(key) => request.header("api-key", key),
        };

        let response = request.send().await.map_err(TranslateError::Http)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Translation API returned error");
            return Err(TranslateError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion =
            response.json().await.map_err(TranslateError::Http)?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(TranslateError::EmptyResponse)
    }
}

/// Retry discipline for translation calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: u32,
    /// Deadline for a single attempt.
    pub call_timeout: Duration,
    /// Extra pause after a rate-limit response, before the normal backoff.
    pub rate_limit_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(3),
            backoff: 2,
            call_timeout: Duration::from_secs(1000),
            rate_limit_pause: Duration::from_secs(30),
        }
    }
}

/// Calls the translator with bounded retries, exponential backoff and a
/// per-attempt timeout. The last error is returned once attempts are
/// exhausted.
pub async fn translate_with_retry(
    translator: &dyn Translator,
    policy: &RetryPolicy,
    system_prompt: &str,
    text: &str,
) -> Result<String, TranslateError> {
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let outcome = tokio::time::timeout(
            policy.call_timeout,
            translator.translate(system_prompt, text),
        )
        .await;

        let err = match outcome {
            Ok(Ok(translated)) => return Ok(translated),
            Ok(Err(e)) => e,
            Err(_) => TranslateError::Timeout(policy.call_timeout.as_secs()),
        };

        if attempt >= policy.max_attempts {
            error!(attempt, error = %err, "Translation failed, giving up");
            return Err(err);
        }

        if matches!(err, TranslateError::RateLimited) {
            warn!(pause_secs = policy.rate_limit_pause.as_secs(), "Rate limited, pausing");
            tokio::time::sleep(policy.rate_limit_pause).await;
        }

        warn!(attempt, error = %err, delay_secs = delay.as_secs(), "Translation failed, retrying");
        tokio::time::sleep(delay).await;
        delay *= policy.backoff;
    }
}

/// Fills the language slots of a prompt template.
pub fn render_prompt(template: &str, source_lang: &str, target_lang: &str) -> String {
    template
        .replace("{source_lang}", source_lang)
        .replace("{target_lang}", target_lang)
}
