//! rig-core integration for LLM-backed documentation generation.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Cohere, Gemini, Perplexity,
//! DeepSeek, xAI, Groq, and any OpenAI-compatible API.
//!
//! rig's simple prompt API returns the full completion text; we expose it
//! as a single-fragment stream to satisfy the [`ChatProvider`] capability
//! contract.

use async_trait::async_trait;
use futures::StreamExt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::cancel::CancelFlag;
use crate::config::ProviderConfig;

use super::{ChatMessage, ChatProvider, FragmentStream, ModelInfo, ProviderError, ProviderName, Role};

/// Maximum tokens per LLM completion response.
///
/// Set high enough to accommodate thinking models (e.g. Gemini 2.5 Pro)
/// that consume part of the budget for internal reasoning tokens.
const MAX_TOKENS: u64 = 65536;

/// Build a simple agent from a rig-core client and prompt it.
///
/// Always sets `max_tokens` — all rig-core providers support it and without
/// it some (e.g. Gemini) default to a low limit that truncates responses.
macro_rules! prompt_simple {
    ($client:expr, $model:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature(0.0)
            .max_tokens(MAX_TOKENS)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based chat provider.
///
/// Wraps rig-core's multi-provider client system. The provider name
/// in config selects which rig-core provider to use.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or the provider-specific env var.",
                config.name,
                crate::constants::ENV_API_KEY
            )));
        }
        Ok(Self { config })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Get the API key or return an error.
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_simple!(client, model, system_prompt, user_prompt, "OpenAI")
            }
            ProviderName::Cohere => {
                let client = new_client!(providers::cohere::Client, api_key, "Cohere")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Cohere")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Gemini")
            }
            ProviderName::Perplexity => {
                let client = new_client!(providers::perplexity::Client, api_key, "Perplexity")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Perplexity")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "DeepSeek")
            }
            ProviderName::XAI => {
                let client = new_client!(providers::xai::Client, api_key, "xAI")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "xAI")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Groq")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client: providers::openai::CompletionsClient =
                    providers::openai::CompletionsClient::builder()
                        .api_key(api_key)
                        .base_url(base_url)
                        .build()
                        .map_err(|e| {
                            ProviderError::ApiError(format!(
                                "failed to create OpenAI-compatible client: {e}"
                            ))
                        })?;
                prompt_simple!(
                    client,
                    model,
                    system_prompt,
                    user_prompt,
                    "OpenAI-compatible"
                )
            }
        }
    }
}

#[async_trait]
impl ChatProvider for RigProvider {
    /// Return the configured model catalog.
    ///
    /// rig-core exposes no uniform model-listing endpoint, so the catalog is
    /// configuration: `[[provider.models]]` entries, falling back to the
    /// selected model as a single synthesized entry.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        if !self.config.models.is_empty() {
            return Ok(self.config.models.clone());
        }
        Ok(self
            .config
            .model
            .as_ref()
            .map(|id| {
                vec![ModelInfo {
                    id: id.clone(),
                    name: id.clone(),
                    family: String::new(),
                    vendor: self.config.name.to_string(),
                }]
            })
            .unwrap_or_default())
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _cancel: &CancelFlag,
    ) -> Result<FragmentStream, ProviderError> {
        let (system_prompt, user_prompt) = split_messages(messages);
        let text = self.call_rig(model, &system_prompt, &user_prompt).await?;

        if let Some(reason) = detect_policy_rejection(&text) {
            return Err(ProviderError::ContentPolicy(reason.to_string()));
        }

        Ok(futures::stream::once(async move { Ok(text) }).boxed())
    }
}

/// Split role-tagged messages into rig's preamble/prompt pair.
///
/// Multiple messages of the same role are concatenated in order with blank
/// lines between them.
fn split_messages(messages: &[ChatMessage]) -> (String, String) {
    let mut system = String::new();
    let mut user = String::new();
    for msg in messages {
        let target = match msg.role {
            Role::System => &mut system,
            Role::User => &mut user,
        };
        if !target.is_empty() {
            target.push_str("\n\n");
        }
        target.push_str(&msg.content);
    }
    (system, user)
}

/// Detect a provider-level content-policy refusal in a successful response.
///
/// Some providers return a 200 with a refusal body instead of an error
/// status. Only the unmistakable markers are matched — we would rather miss
/// a refusal than misclassify a genuine summary.
fn detect_policy_rejection(text: &str) -> Option<&'static str> {
    let head = text.trim_start();
    if head.starts_with("I can't assist") || head.starts_with("I cannot assist") {
        return Some("provider refused the request");
    }
    None
}

/// Classifies a provider error into a short, user-friendly message.
///
/// Returns `Some(message)` for recognized transient or policy errors,
/// `None` otherwise. Used for distinct logging; all classes share the same
/// per-folder failure handling.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    match err {
        ProviderError::ApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else {
                None
            }
        }
        ProviderError::ContentPolicy(_) => Some("Rejected by content policy"),
        ProviderError::NotConfigured(_) => None,
    }
}
