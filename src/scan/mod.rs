//! Workspace scanning: folder tree construction and leaf-to-root ordering.

pub mod ignore;
pub mod order;
pub mod walk;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use ignore::IgnoreFilter;
pub use order::flatten;

/// Errors raised when a scan cannot start at all. Per-directory read
/// failures are not errors — they truncate that subtree and the walk
/// continues.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("workspace root {0} does not exist or is not a directory")]
    RootNotFound(PathBuf),
}

/// One directory in the scanned workspace.
///
/// The tree is rebuilt wholesale on every scan; nodes carry no identity
/// across scans beyond `path` equality.
#[derive(Debug, Clone)]
pub struct FolderNode {
    /// Absolute filesystem path (unique key).
    pub path: PathBuf,
    /// Final path segment.
    pub name: String,
    /// Non-ignored direct subdirectories, in traversal order.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Depth measured in path components, used for leaf-to-root ordering.
    pub fn depth(&self) -> usize {
        self.path.components().count()
    }
}

/// Build the folder tree rooted at `root`, applying `filter` to every
/// subdirectory. The tree is immutable after construction; a configuration
/// change requires a full rebuild.
pub fn build_tree(root: &Path, filter: &IgnoreFilter) -> Result<FolderNode, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    // Stack of partially-built nodes; EnterDir pushes, LeaveDir pops and
    // attaches to the parent. The walk is strictly nested so the stack
    // discipline holds by construction.
    let mut stack: Vec<FolderNode> = Vec::new();
    let mut finished: Option<FolderNode> = None;

    walk::walk_dirs(
        root,
        &mut |path, name| {
            let rel = path
                .strip_prefix(root)
                .ok()
                .map(|r| r.to_string_lossy().into_owned());
            !filter.should_ignore(name, rel.as_deref())
        },
        &mut |event| match event {
            walk::WalkEvent::EnterDir(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                stack.push(FolderNode {
                    path: path.to_path_buf(),
                    name,
                    children: Vec::new(),
                });
            }
            walk::WalkEvent::LeaveDir(_) => {
                let Some(node) = stack.pop() else { return };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => finished = Some(node),
                }
            }
            // Files are irrelevant to the tree shape.
            walk::WalkEvent::File(..) => {}
        },
    );

    finished.ok_or_else(|| ScanError::RootNotFound(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IgnoreConfig;

    fn no_ignore() -> IgnoreFilter {
        IgnoreFilter::new(&IgnoreConfig::default())
    }

    fn collect_paths(node: &FolderNode, out: &mut Vec<PathBuf>) {
        out.push(node.path.clone());
        for child in &node.children {
            collect_paths(child, out);
        }
    }

    #[test]
    fn builds_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let tree = build_tree(dir.path(), &no_ignore()).unwrap();
        assert_eq!(tree.children.len(), 2);
        let a = tree.children.iter().find(|c| c.name == "a").unwrap();
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].name, "b");
    }

    #[test]
    fn ignored_directory_excludes_whole_subtree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules").join("dep")).unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let filter = IgnoreFilter::new(&IgnoreConfig {
            names: vec!["node_modules".to_string()],
            patterns: vec![],
        });
        let tree = build_tree(dir.path(), &filter).unwrap();
        let mut paths = Vec::new();
        collect_paths(&tree, &mut paths);
        assert!(!paths.iter().any(|p| p.ends_with("node_modules")));
        assert!(!paths.iter().any(|p| p.ends_with("dep")));
        assert!(paths.iter().any(|p| p.ends_with("src")));
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = build_tree(Path::new("/tmp/dirdocs_nonexistent_root_xyz"), &no_ignore());
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn rescan_of_unchanged_workspace_yields_identical_path_set() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("x").join("y")).unwrap();
        std::fs::create_dir(dir.path().join("z")).unwrap();

        let first = build_tree(dir.path(), &no_ignore()).unwrap();
        let second = build_tree(dir.path(), &no_ignore()).unwrap();

        let mut paths_a = Vec::new();
        let mut paths_b = Vec::new();
        collect_paths(&first, &mut paths_a);
        collect_paths(&second, &mut paths_b);
        assert_eq!(paths_a, paths_b);
    }

    #[test]
    fn files_do_not_appear_in_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file.rs"), "fn main() {}").unwrap();

        let tree = build_tree(dir.path(), &no_ignore()).unwrap();
        assert!(tree.children.is_empty());
    }
}
