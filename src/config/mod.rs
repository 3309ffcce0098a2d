//! Configuration loading and types.

pub mod loader;

pub use loader::{Config, ConfigError, ContextConfig, IgnoreConfig, PromptConfig, ProviderConfig};
