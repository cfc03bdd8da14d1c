//! Enrichment stage: replace article summaries with research proposals.
//!
//! ## Retry Strategy
//!
//! Provider errors are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`): with a 500 ms base and 2 retries the
//! waits are 500 ms then 1 s. After the last attempt the article keeps going
//! with [`PROPOSAL_PLACEHOLDER`] as its body; the batch is never aborted.

use crate::config::PipelineConfig;
use crate::error::{ArticleError, ReportError};
use crate::model::Article;
use crate::progress::PipelineProgressCallback;
use crate::prompts::{proposal_prompt, PROPOSAL_PLACEHOLDER, PROPOSAL_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Why a proposal could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalFailure {
    /// Retries made after the first attempt.
    pub retries: u32,
    pub detail: String,
}

/// Something that turns an article summary into a proposal.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn propose(&self, summary: &str) -> Result<String, ProposalFailure>;
}

/// [`ProposalGenerator`] backed by an `edgequake-llm` provider.
pub struct LlmProposalGenerator {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl LlmProposalGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            system_prompt: PROPOSAL_SYSTEM_PROMPT.to_string(),
            options: CompletionOptions {
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
                ..Default::default()
            },
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Build from the provider settings in `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ReportError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl ProposalGenerator for LlmProposalGenerator {
    async fn propose(&self, summary: &str) -> Result<String, ProposalFailure> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(proposal_prompt(summary)),
        ];

        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Proposal: retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.provider.chat(&messages, Some(&self.options)).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    debug!(
                        "Proposal: {} input tokens, {} output tokens",
                        response.prompt_tokens, response.completion_tokens
                    );
                    return Ok(response.content);
                }
                Ok(_) => {
                    warn!("Proposal: attempt {} returned empty content", attempt + 1);
                    last_err = Some("empty response".to_string());
                }
                Err(e) => {
                    warn!("Proposal: attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(e.to_string());
                }
            }
        }

        Err(ProposalFailure {
            retries: self.max_retries,
            detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

/// Replace each article's summary with a generated proposal.
///
/// Returns the per-article failures. A failed article gets
/// [`PROPOSAL_PLACEHOLDER`] as its body; an article without a summary is
/// left untouched.
pub async fn enrich_articles(
    generator: &dyn ProposalGenerator,
    articles: &mut [Article],
    progress: &dyn PipelineProgressCallback,
) -> Vec<ArticleError> {
    let total = articles.len();
    let mut errors = Vec::new();

    for (index, article) in articles.iter_mut().enumerate() {
        if article.summary.trim().is_empty() {
            warn!("Article {}: no summary, skipping proposal", index);
            errors.push(ArticleError::MissingSummary { index });
            progress.on_article_enriched(index, total, false);
            continue;
        }

        info!("Generating proposal {}/{}: {}", index + 1, total, article.title);
        match generator.propose(&article.summary).await {
            Ok(proposal) => {
                article.replace_summary(proposal);
                progress.on_article_enriched(index, total, true);
            }
            Err(failure) => {
                warn!("Article {}: {}", index, failure.detail);
                article.replace_summary(PROPOSAL_PLACEHOLDER.to_string());
                errors.push(ArticleError::EnrichmentFailed {
                    index,
                    retries: failure.retries,
                    detail: failure.detail,
                });
                progress.on_article_enriched(index, total, false);
            }
        }
    }

    errors
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ReportError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ReportError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`)
/// 2. **Named provider + model** (`config.provider_name`)
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`)
/// 4. **Anthropic** when `ANTHROPIC_API_KEY` and `ANTHROPIC_MODEL` are set
/// 5. **Full auto-detection** (`ProviderFactory::from_env`)
pub fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, ReportError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    if let (Some(prov), Some(model)) = (
        non_empty("EDGEQUAKE_LLM_PROVIDER"),
        non_empty("EDGEQUAKE_MODEL"),
    ) {
        return create_provider(&prov, &model);
    }

    if let (Some(_), Some(model)) = (non_empty("ANTHROPIC_API_KEY"), non_empty("ANTHROPIC_MODEL")) {
        let model = config.model.clone().unwrap_or(model);
        return create_provider("anthropic", &model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ReportError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --no-enrich.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
