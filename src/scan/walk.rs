//! Shared directory traversal primitive.
//!
//! Both the folder tree builder and the freshness mtime walk need a
//! recursive descent with the same edge-case handling: unreadable
//! directories truncate their subtree instead of failing the walk, and
//! symlinks are never followed as directories (the filesystem does not
//! prevent symlink cycles, so we refuse to descend through them at all).
//! Keeping one primitive stops the two walks drifting apart.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// A single traversal event.
#[derive(Debug)]
pub enum WalkEvent<'a> {
    /// About to process a directory's entries (emitted for the root too).
    EnterDir(&'a Path),
    /// A non-directory entry, with its modification time when available.
    File(&'a Path, Option<SystemTime>),
    /// Finished a directory's entries.
    LeaveDir(&'a Path),
}

/// Walk `root` depth-first, emitting [`WalkEvent`]s to `visit`.
///
/// `descend` is consulted for every subdirectory (never for `root` itself)
/// with the directory's path and bare name; returning `false` prunes that
/// entire subtree. Directory read failures are logged and treated as a
/// directory with no entries.
pub fn walk_dirs<D, V>(root: &Path, descend: &mut D, visit: &mut V)
where
    D: FnMut(&Path, &str) -> bool,
    V: FnMut(WalkEvent<'_>),
{
    visit(WalkEvent::EnterDir(root));

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Warning: cannot read directory {}: {e}", root.display());
            visit(WalkEvent::LeaveDir(root));
            return;
        }
    };

    // Collect and sort by name for a deterministic traversal order.
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        // DirEntry::file_type does not follow symlinks, so a symlinked
        // directory reports as a symlink here and is treated as opaque.
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                eprintln!("Warning: cannot stat {}: {e}", path.display());
                continue;
            }
        };

        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if descend(&path, &name) {
                walk_dirs(&path, descend, visit);
            }
        } else {
            let mtime = entry.metadata().ok().and_then(|m| m.modified().ok());
            visit(WalkEvent::File(&path, mtime));
        }
    }

    visit(WalkEvent::LeaveDir(root));
}
