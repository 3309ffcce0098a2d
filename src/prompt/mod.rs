//! Prompt construction from configurable templates.
//!
//! The main template carries two named placeholders: `{{folder_structure}}`
//! receives the assembled own-folder context, `{{child_context}}` receives
//! either the rendered child-summary block or an explicit instruction to
//! omit child sections. Placeholders that are absent from a template are
//! simply never substituted, and unknown tokens are left as-is — a template
//! mistake surfaces as a visibly malformed document, not a crash.

use indexmap::IndexMap;

use crate::config::PromptConfig;

/// Placeholder for the own-folder context in the main template.
pub const FOLDER_STRUCTURE_PLACEHOLDER: &str = "{{folder_structure}}";

/// Placeholder for the child-summary block in the main template.
pub const CHILD_CONTEXT_PLACEHOLDER: &str = "{{child_context}}";

/// Placeholders for the per-child template.
pub const CHILD_PATH_PLACEHOLDER: &str = "{{child_path}}";
pub const CHILD_SUMMARY_PLACEHOLDER: &str = "{{child_summary}}";

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a technical writer producing concise folder-level \
documentation for a software project. You write plain Markdown: a top-level heading with the \
folder name, a short purpose paragraph, a 'Key Files' section, and a 'Relationships' section \
describing how this folder relates to its parent and children. Be factual; never invent files \
or behavior not visible in the provided context.";

/// Default main template.
pub const DEFAULT_MAIN_TEMPLATE: &str = "\
Document the following folder of a software project.

## Folder contents

{{folder_structure}}

## Child folder documentation

{{child_context}}

## Output requirements

Produce a short Markdown document: a `#` heading with the folder name, a purpose \
paragraph, a `## Key Files` section, and a `## Relationships` section. Where child \
documentation was provided above, summarise each child in one sentence under \
`## Relationships` instead of re-documenting it.";

/// Default per-child template.
pub const DEFAULT_CHILD_TEMPLATE: &str = "### {{child_path}}

{{child_summary}}";

/// Instruction substituted when no child summaries exist, so the model
/// omits child sections entirely instead of emitting empty headings.
pub const NO_CHILDREN_INSTRUCTION: &str = "This folder has no documented child folders. \
Omit all child-folder and subdirectory subsections from your output entirely; do not \
emit empty headings for them.";

/// Render the final prompt text.
///
/// Pure function of the current [`PromptConfig`] plus inputs. `child_summaries`
/// maps each child's relative label to its (already truncated) summary text,
/// in traversal order.
pub fn build(
    config: &PromptConfig,
    own_context: &str,
    child_summaries: &IndexMap<String, String>,
) -> String {
    let child_block = if child_summaries.is_empty() {
        NO_CHILDREN_INSTRUCTION.to_string()
    } else {
        render_child_block(&config.child_template, child_summaries)
    };

    config
        .main_template
        .replace(CHILD_CONTEXT_PLACEHOLDER, &child_block)
        .replace(FOLDER_STRUCTURE_PLACEHOLDER, own_context)
}

/// Render the child-context block: a label listing followed by each child's
/// content substituted into the child template.
fn render_child_block(child_template: &str, child_summaries: &IndexMap<String, String>) -> String {
    let mut block = String::from("Documented child folders: ");
    block.push_str(
        &child_summaries
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    );
    block.push_str("\n\n");

    for (label, summary) in child_summaries {
        block.push_str(
            &child_template
                .replace(CHILD_PATH_PLACEHOLDER, label)
                .replace(CHILD_SUMMARY_PLACEHOLDER, summary),
        );
        block.push_str("\n\n");
    }

    block.trim_end().to_string()
}
