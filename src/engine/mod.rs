//! Per-folder generation: read existing output, assemble context, invoke
//! the model, merge with prior content, persist.
//!
//! The engine is deliberately retry-free. Success and failure are terminal
//! for one invocation; re-running is an operator decision made upstream.

use std::path::Path;
use std::sync::Arc;

use crate::cancel::CancelFlag;
use crate::config::Config;
use crate::constants::OUTPUT_FILENAME;
use crate::context;
use crate::prompt;
use crate::providers::rig::classify_error;
use crate::providers::{ChatMessage, ChatProvider, collect_fragments};
use crate::scan::IgnoreFilter;

/// Fixed instruction for the merge invocation. The model is asked to keep
/// operator-authored sections while refreshing the generated ones.
const MERGE_SYSTEM_PROMPT: &str = "You merge two versions of a folder documentation file. \
The NEW version replaces all standard sections (the top heading, the purpose paragraph, \
'Key Files', 'Relationships'). Any other section present in the EXISTING version but not \
in the NEW version was written by a person and must be preserved verbatim in your output. \
Respond with the merged Markdown document only, no commentary.";

/// Heading under which existing content is preserved when the merge
/// invocation itself fails.
const MERGE_FALLBACK_HEADING: &str = "## Previous Documentation";

/// Drives one folder through the full generate/merge/persist sequence.
pub struct GenerationEngine {
    provider: Arc<dyn ChatProvider>,
}

impl GenerationEngine {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Generate the summary document for `folder`.
    ///
    /// Returns `true` on success (including a successful or fallback merge),
    /// `false` when the fallback stub was written instead. A missing model
    /// selection and a provider failure both take the fallback path; neither
    /// aborts the caller's run.
    pub async fn generate(&self, folder: &Path, config: &Config, cancel: &CancelFlag) -> bool {
        let output_path = folder.join(OUTPUT_FILENAME);
        let existing = match tokio::fs::read_to_string(&output_path).await {
            Ok(text) => Some(text),
            Err(_) => None,
        };

        let filter = IgnoreFilter::new(&config.ignore);
        let ctx = context::assemble(folder, &config.context, &filter).await;
        let prompt_text = prompt::build(&config.prompt, &ctx.own_context, &ctx.child_summaries);

        let Some(model) = resolve_model(config) else {
            eprintln!(
                "Warning: no model selected for provider '{}'; cannot generate {}",
                config.provider.name,
                output_path.display()
            );
            return self.write_fallback(folder, &output_path).await;
        };

        let messages = vec![
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(prompt_text),
        ];
        let fresh = match self.invoke(&model, &messages, cancel).await {
            Ok(text) => text,
            Err(message) => {
                eprintln!(
                    "Warning: generation failed for {}: {message}",
                    folder.display()
                );
                return self.write_fallback(folder, &output_path).await;
            }
        };

        let final_text = match existing {
            Some(prior) if !prior.trim().is_empty() => {
                self.merge(&model, &prior, &fresh, cancel).await
            }
            _ => fresh,
        };

        if let Err(e) = tokio::fs::write(&output_path, ensure_trailing_newline(final_text)).await {
            eprintln!(
                "Warning: could not write {}: {e}",
                output_path.display()
            );
            return false;
        }
        true
    }

    /// Submit one completion request and buffer the response. Errors are
    /// flattened to a display string with the transient/policy class noted
    /// where one is recognized.
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        cancel: &CancelFlag,
    ) -> Result<String, String> {
        let stream = self
            .provider
            .complete(model, messages, cancel)
            .await
            .map_err(|e| describe(&e))?;
        let text = collect_fragments(stream).await.map_err(|e| describe(&e))?;
        if text.trim().is_empty() {
            return Err("provider returned an empty response".to_string());
        }
        Ok(text)
    }

    /// Merge existing and fresh content via a second model invocation.
    ///
    /// A merge failure never loses content: the deterministic fallback keeps
    /// the fresh text and appends the prior document under a labeled
    /// trailing heading.
    async fn merge(&self, model: &str, existing: &str, fresh: &str, cancel: &CancelFlag) -> String {
        let request = format!(
            "EXISTING version:\n\n{existing}\n\n---\n\nNEW version:\n\n{fresh}"
        );
        let messages = vec![
            ChatMessage::system(MERGE_SYSTEM_PROMPT),
            ChatMessage::user(request),
        ];
        match self.invoke(model, &messages, cancel).await {
            Ok(merged) => merged,
            Err(message) => {
                eprintln!("Warning: merge invocation failed ({message}); keeping both versions");
                deterministic_merge(existing, fresh)
            }
        }
    }

    /// Write the fixed fallback document and report failure.
    async fn write_fallback(&self, folder: &Path, output_path: &Path) -> bool {
        let doc = fallback_document(folder);
        if let Err(e) = tokio::fs::write(output_path, doc).await {
            eprintln!(
                "Warning: could not write fallback {}: {e}",
                output_path.display()
            );
        }
        false
    }
}

/// Resolve the effective model id from the provider configuration.
///
/// Explicit selection wins. Otherwise the priority list is consulted against
/// the catalog (or taken at face value when no catalog is configured).
/// `None` means the folder fails with a configuration error; a catalog alone
/// is never a selection — there is no silent default.
pub fn resolve_model(config: &Config) -> Option<String> {
    let provider = &config.provider;
    if let Some(model) = &provider.model {
        return Some(model.clone());
    }
    for preferred in &provider.model_priority {
        if provider.models.is_empty() || provider.models.iter().any(|m| &m.id == preferred) {
            return Some(preferred.clone());
        }
    }
    None
}

/// Non-LLM merge: fresh content first, prior content preserved under a
/// labeled trailing section.
fn deterministic_merge(existing: &str, fresh: &str) -> String {
    format!(
        "{}\n\n{MERGE_FALLBACK_HEADING}\n\n{}",
        fresh.trim_end(),
        existing.trim()
    )
}

fn fallback_document(folder: &Path) -> String {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.to_string_lossy().into_owned());
    format!(
        "# {name}\n\nDocumentation generation failed for this folder. \
         Re-run generation to retry.\n"
    )
}

fn describe(err: &crate::providers::ProviderError) -> String {
    match classify_error(err) {
        Some(class) => format!("{err} ({class})"),
        None => err.to_string(),
    }
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
