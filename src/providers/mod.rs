//! ChatProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core to decouple the codebase
//! from the specific LLM library. The completion call yields a finite
//! stream of text fragments which callers consume into a buffer; the
//! stream is not restartable.

pub mod rig;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancel::CancelFlag;

/// Errors from the chat provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("request rejected by content policy: {0}")]
    ContentPolicy(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// A model advertised by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub family: String,
    pub vendor: String,
}

/// Message roles understood by the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A finite, non-restartable stream of response text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Trait for the LLM chat-completion capability.
///
/// Implementations handle client construction and transport; they make no
/// assumptions about what the prompt asks for.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// List the models available for selection.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;

    /// Submit a completion request and return the response fragment stream.
    ///
    /// `cancel` is advisory: the call is not abortable mid-stream, and a
    /// cancellation requested while it is in flight takes effect only after
    /// the call returns.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        cancel: &CancelFlag,
    ) -> Result<FragmentStream, ProviderError>;
}

/// Consume a fragment stream into a single text buffer.
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String, ProviderError> {
    let mut buffer = String::new();
    while let Some(fragment) = stream.next().await {
        buffer.push_str(&fragment?);
    }
    Ok(buffer)
}

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Cohere,
    Gemini,
    Perplexity,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "xai")]
    XAI,
    Groq,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Cohere => write!(f, "cohere"),
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::Perplexity => write!(f, "perplexity"),
            ProviderName::DeepSeek => write!(f, "deepseek"),
            ProviderName::XAI => write!(f, "xai"),
            ProviderName::Groq => write!(f, "groq"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            "cohere" => Ok(ProviderName::Cohere),
            "gemini" => Ok(ProviderName::Gemini),
            "perplexity" => Ok(ProviderName::Perplexity),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "xai" => Ok(ProviderName::XAI),
            "groq" => Ok(ProviderName::Groq),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: anthropic, openai, cohere, \
                 gemini, perplexity, deepseek, xai, groq, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Returns the provider-specific environment variable name for the API key.
    ///
    /// These match the env var names used by rig-core's `from_env()` implementations.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Cohere => "COHERE_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::Perplexity => "PERPLEXITY_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderName::XAI => "XAI_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_name_display_roundtrip() {
        for name in [
            ProviderName::Anthropic,
            ProviderName::OpenAI,
            ProviderName::Cohere,
            ProviderName::Gemini,
            ProviderName::Perplexity,
            ProviderName::DeepSeek,
            ProviderName::XAI,
            ProviderName::Groq,
            ProviderName::OpenAICompatible,
        ] {
            let parsed: ProviderName = name.to_string().parse().unwrap();
            assert_eq!(parsed, name);
        }
    }

    #[test]
    fn provider_name_from_str_case_insensitive() {
        assert_eq!(
            "ANTHROPIC".parse::<ProviderName>().unwrap(),
            ProviderName::Anthropic
        );
        assert_eq!(
            "OpenAI".parse::<ProviderName>().unwrap(),
            ProviderName::OpenAI
        );
    }

    #[test]
    fn provider_name_from_str_invalid() {
        let result = "invalid".parse::<ProviderName>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("unsupported provider"));
    }

    #[test]
    fn provider_name_api_key_env_var() {
        assert_eq!(
            ProviderName::Anthropic.api_key_env_var(),
            "ANTHROPIC_API_KEY"
        );
        assert_eq!(
            ProviderName::OpenAICompatible.api_key_env_var(),
            "OPENAI_API_KEY"
        );
    }

    #[test]
    fn chat_message_constructors() {
        let msg = ChatMessage::system("be brief");
        assert_eq!(msg.role, Role::System);
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }

    #[tokio::test]
    async fn collect_fragments_concatenates() {
        let stream: FragmentStream = Box::pin(futures::stream::iter(vec![
            Ok("Hello ".to_string()),
            Ok("world".to_string()),
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn collect_fragments_empty_stream() {
        let stream: FragmentStream = Box::pin(futures::stream::iter(Vec::<
            Result<String, ProviderError>,
        >::new()));
        let text = collect_fragments(stream).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn collect_fragments_propagates_error() {
        let stream: FragmentStream = Box::pin(futures::stream::iter(vec![
            Ok("partial".to_string()),
            Err(ProviderError::ApiError("mid-stream failure".to_string())),
        ]));
        let result = collect_fragments(stream).await;
        assert!(result.is_err());
    }

    #[test]
    fn model_info_serde_roundtrip() {
        let info = ModelInfo {
            id: "claude-sonnet-4-20250514".to_string(),
            name: "Claude Sonnet 4".to_string(),
            family: "claude-sonnet".to_string(),
            vendor: "anthropic".to_string(),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: ModelInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
