//! Folder exclusion rules: exact names plus wildcard patterns.

use std::collections::HashSet;

use regex::Regex;

use crate::config::IgnoreConfig;

/// Decides whether a directory should be excluded from scanning.
///
/// Exclusion is all-or-nothing: an ignored directory's entire subtree is
/// skipped because the tree builder never descends into it.
pub struct IgnoreFilter {
    names: HashSet<String>,
    patterns: Vec<CompiledPattern>,
}

/// One wildcard pattern, pre-compiled to a regex.
struct CompiledPattern {
    /// `true` when the raw pattern contains a path separator, in which
    /// case it is additionally matched against the workspace-relative path.
    path_scoped: bool,
    /// `None` when compilation failed; such a pattern never matches.
    regex: Option<Regex>,
}

impl IgnoreFilter {
    /// Build a filter from an [`IgnoreConfig`].
    pub fn new(config: &IgnoreConfig) -> Self {
        let names = config.names.iter().cloned().collect();
        let patterns = config
            .patterns
            .iter()
            .map(|raw| CompiledPattern {
                path_scoped: raw.contains('/') || raw.contains('\\'),
                regex: compile_wildcard(raw),
            })
            .collect();
        Self { names, patterns }
    }

    /// Returns `true` when the folder must be excluded.
    ///
    /// `name` is the bare folder name; `relative_path` is the folder's path
    /// relative to the workspace root, used only by path-scoped patterns.
    pub fn should_ignore(&self, name: &str, relative_path: Option<&str>) -> bool {
        // Exact-name match is the cheap path, checked first.
        if self.names.contains(name) {
            return true;
        }

        for pattern in &self.patterns {
            let Some(re) = &pattern.regex else { continue };
            if re.is_match(name) {
                return true;
            }
            if pattern.path_scoped {
                if let Some(rel) = relative_path {
                    let normalized = rel.replace('\\', "/");
                    if re.is_match(&normalized) {
                        return true;
                    }
                }
            }
        }

        false
    }
}

/// Compile a wildcard pattern (`*` matches zero-or-more characters) into an
/// anchored regex. Returns `None` on compilation failure so that a malformed
/// pattern degrades to "never matches" rather than aborting the scan.
fn compile_wildcard(pattern: &str) -> Option<Regex> {
    let normalized = pattern.replace('\\', "/");
    let mut source = String::with_capacity(pattern.len() + 8);
    // Windows paths compare case-insensitively.
    if cfg!(windows) {
        source.push_str("(?i)");
    }
    source.push('^');
    for (i, segment) in normalized.split('*').enumerate() {
        if i > 0 {
            source.push_str(".*");
        }
        source.push_str(&regex::escape(segment));
    }
    source.push('$');

    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            eprintln!("Warning: ignoring malformed ignore pattern '{pattern}': {e}");
            None
        }
    }
}
