//! Folder context assembly for prompt construction.
//!
//! Gathers a folder's own analyzable file contents (size-capped) and the
//! already-generated summaries of its direct children. Individual I/O
//! failures never propagate — an unreadable file is logged and omitted so
//! one bad entry cannot sink a folder's generation.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::ContextConfig;
use crate::constants::OUTPUT_FILENAME;
use crate::scan::IgnoreFilter;

/// Marker appended to any content cut at the character cap.
pub const TRUNCATION_MARKER: &str = "\n[... truncated ...]";

/// File extensions worth feeding to the model: source code plus common
/// config and doc formats.
const ANALYZABLE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "py", "go", "java", "kt", "c", "h", "cpp", "hpp",
    "cs", "rb", "php", "swift", "scala", "sh", "md", "toml", "json", "yaml", "yml", "sql",
    "html", "css", "proto",
];

/// Assembled context for one folder.
#[derive(Debug, Default)]
pub struct FolderContext {
    /// Textual description of the folder's own contents.
    pub own_context: String,
    /// Child label (path relative to this folder) → truncated summary, for
    /// each direct child whose generated output file exists.
    pub child_summaries: IndexMap<String, String>,
}

/// Assemble the context for `folder`.
///
/// Children that already have a generated summary contribute it to
/// `child_summaries`; children that do not contribute a bounded sample of
/// their own code files (one level only) to `own_context`, so the parent's
/// documentation can see undocumented children's code rather than just
/// their names.
///
/// `filter` is the same ignore filter the tree builder applies: a child the
/// scan excluded must not resurface here as a listing, a summary, or a code
/// sample.
pub async fn assemble(folder: &Path, config: &ContextConfig, filter: &IgnoreFilter) -> FolderContext {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string());

    let (files, mut subdirs) = list_entries(folder).await;
    subdirs.retain(|p| {
        p.file_name()
            .map(|n| !filter.should_ignore(&n.to_string_lossy(), None))
            .unwrap_or(false)
    });

    let mut own_context = format!("Folder: {folder_name}\n");

    let subdir_names: Vec<String> = subdirs
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    if subdir_names.is_empty() {
        own_context.push_str("Subdirectories: none\n");
    } else {
        own_context.push_str(&format!("Subdirectories: {}\n", subdir_names.join(", ")));
    }

    let file_names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    if file_names.is_empty() {
        own_context.push_str("Files: none\n");
    } else {
        own_context.push_str(&format!("Files: {}\n", file_names.join(", ")));
    }

    // Own file contents, bounded in count and size.
    let mut included = 0usize;
    for file in &files {
        if included >= config.max_files_per_folder {
            break;
        }
        if !is_analyzable(file) || is_output_file(file) {
            continue;
        }
        if let Some(content) = read_truncated(file, config.max_chars_per_file).await {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            own_context.push_str(&format!("\n--- file: {name} ---\n{content}\n"));
            included += 1;
        }
    }

    // Child summaries and undocumented-child code samples.
    let mut child_summaries = IndexMap::new();
    for subdir in &subdirs {
        let label = subdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let summary_path = subdir.join(OUTPUT_FILENAME);

        if let Some(summary) =
            read_truncated(&summary_path, config.max_chars_per_child_summary).await
        {
            child_summaries.insert(label, summary);
        } else {
            append_child_sample(&mut own_context, subdir, &label, config).await;
        }
    }

    FolderContext {
        own_context,
        child_summaries,
    }
}

/// Pull a bounded sample of an undocumented child's code files into the
/// parent's own context. One level only — grandchildren are never read.
async fn append_child_sample(
    own_context: &mut String,
    subdir: &Path,
    label: &str,
    config: &ContextConfig,
) {
    let (files, _) = list_entries(subdir).await;
    let mut sampled = 0usize;
    for file in &files {
        if sampled >= config.undocumented_child_sample {
            break;
        }
        if !is_analyzable(file) || is_output_file(file) {
            continue;
        }
        if let Some(content) = read_truncated(file, config.max_chars_per_file).await {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            own_context.push_str(&format!(
                "\n--- undocumented child sample: {label}/{name} ---\n{content}\n"
            ));
            sampled += 1;
        }
    }
}

/// List a directory's direct files and subdirectories, sorted by name.
/// Read failures degrade to empty listings.
async fn list_entries(folder: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    let mut entries = match tokio::fs::read_dir(folder).await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Warning: cannot read directory {}: {e}", folder.display());
            return (files, subdirs);
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => match entry.file_type().await {
                Ok(ft) if ft.is_dir() => subdirs.push(entry.path()),
                Ok(ft) if ft.is_file() => files.push(entry.path()),
                // Symlinks and exotic entries are opaque to context assembly.
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Warning: cannot stat {}: {e}", entry.path().display());
                }
            },
            Ok(None) => break,
            Err(e) => {
                eprintln!("Warning: error while listing {}: {e}", folder.display());
                break;
            }
        }
    }

    files.sort();
    subdirs.sort();
    (files, subdirs)
}

/// Read a file, truncating at `max_chars` with an explicit marker.
/// Returns `None` when the file is missing or unreadable.
async fn read_truncated(path: &Path, max_chars: usize) -> Option<String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) => {
            if path.exists() {
                eprintln!("Warning: cannot read {}: {e}", path.display());
            }
            return None;
        }
    };
    Some(truncate_chars(&content, max_chars))
}

/// Truncate to at most `max_chars` characters, respecting char boundaries,
/// appending [`TRUNCATION_MARKER`] when content was cut.
fn truncate_chars(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut truncated: String = content.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

fn is_analyzable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            ANALYZABLE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

fn is_output_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n == OUTPUT_FILENAME)
        .unwrap_or(false)
}
