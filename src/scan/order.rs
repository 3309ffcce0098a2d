//! Leaf-to-root traversal ordering.
//!
//! The generation engine feeds child summaries into parent prompts, so
//! every descendant must be processed before its ancestor. Depth-descending
//! order over the whole tree gives exactly that: a descendant always has
//! strictly more path components than its ancestor.

use super::FolderNode;

/// Flatten the tree into leaf-to-root processing order.
///
/// Collects every node pre-order, then stable-sorts by path depth
/// descending; nodes of equal depth keep their collection order. Pure
/// function of the tree — repeated calls yield the same sequence.
pub fn flatten(root: &FolderNode) -> Vec<&FolderNode> {
    let mut nodes = Vec::new();
    collect(root, &mut nodes);
    nodes.sort_by_key(|node| std::cmp::Reverse(node.depth()));
    nodes
}

fn collect<'a>(node: &'a FolderNode, out: &mut Vec<&'a FolderNode>) {
    out.push(node);
    for child in &node.children {
        collect(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn node(path: &str, children: Vec<FolderNode>) -> FolderNode {
        let path = PathBuf::from(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        FolderNode { path, name, children }
    }

    #[test]
    fn descendants_precede_ancestors() {
        let tree = node(
            "/root",
            vec![
                node("/root/a", vec![node("/root/a/b", vec![])]),
                node("/root/c", vec![]),
            ],
        );
        let order = flatten(&tree);
        let index = |p: &str| {
            order
                .iter()
                .position(|n| n.path == PathBuf::from(p))
                .unwrap_or_else(|| panic!("{p} missing from order"))
        };
        assert!(index("/root/a/b") < index("/root/a"));
        assert!(index("/root/a") < index("/root"));
        assert!(index("/root/c") < index("/root"));
        assert_eq!(order.last().unwrap().path, PathBuf::from("/root"));
    }

    #[test]
    fn equal_depth_keeps_collection_order() {
        let tree = node(
            "/root",
            vec![
                node("/root/first", vec![]),
                node("/root/second", vec![]),
                node("/root/third", vec![]),
            ],
        );
        let order = flatten(&tree);
        let names: Vec<&str> = order.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third", "root"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tree = node(
            "/w",
            vec![node("/w/a", vec![node("/w/a/b", vec![])]), node("/w/c", vec![])],
        );
        let first: Vec<_> = flatten(&tree).iter().map(|n| n.path.clone()).collect();
        let second: Vec<_> = flatten(&tree).iter().map(|n| n.path.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn single_node_tree() {
        let tree = node("/solo", vec![]);
        let order = flatten(&tree);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].name, "solo");
    }

    #[test]
    fn ignored_sibling_is_simply_absent() {
        // `root/c` was ignored at scan time and is simply absent here;
        // the remaining three folders come out deepest-first.
        let tree = node(
            "/root",
            vec![node("/root/a", vec![node("/root/a/b", vec![])])],
        );
        let order = flatten(&tree);
        let paths: Vec<PathBuf> = order.iter().map(|n| n.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/root/a/b"),
                PathBuf::from("/root/a"),
                PathBuf::from("/root"),
            ]
        );
    }
}
