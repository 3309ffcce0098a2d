//! Per-folder generation status and content freshness.
//!
//! The status map is mutated only by the pipeline orchestrator; this module
//! owns the types, the rescan reconciliation rules, and the snapshot
//! computation. Freshness details are a pure function of current filesystem
//! state and are recomputed on every call — their whole purpose is to detect
//! drift since the last successful generation, so caching would defeat them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::{FRESHNESS_PRUNE_DIRS, OUTPUT_FILENAME};
use crate::scan::walk::{WalkEvent, walk_dirs};
use crate::scan::FolderNode;

/// Generation state of one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStatus::NotStarted => write!(f, "not started"),
            GenerationStatus::InProgress => write!(f, "in progress"),
            GenerationStatus::Completed => write!(f, "completed"),
            GenerationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Folder path → status, for every path in the current tree.
pub type StatusMap = BTreeMap<PathBuf, GenerationStatus>;

/// Reconcile a prior status map against a fresh scan.
///
/// Preserves each surviving path's status, drops entries for vanished
/// paths, and defaults new paths to `NotStarted`. With `reset` every entry
/// becomes `NotStarted` regardless of prior value.
pub fn reconcile(prior: &StatusMap, current_paths: &[PathBuf], reset: bool) -> StatusMap {
    current_paths
        .iter()
        .map(|path| {
            let status = if reset {
                GenerationStatus::NotStarted
            } else {
                prior
                    .get(path)
                    .copied()
                    .unwrap_or(GenerationStatus::NotStarted)
            };
            (path.clone(), status)
        })
        .collect()
}

/// Freshness record for one folder, derived from filesystem state.
///
/// Timestamps are milliseconds since the Unix epoch so the snapshot stays
/// JSON-serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDocStatusDetails {
    pub has_output_file: bool,
    pub output_updated_at: Option<u64>,
    pub latest_content_updated_at: Option<u64>,
    pub is_up_to_date: bool,
}

impl FolderDocStatusDetails {
    /// Compute the freshness details for `folder`. Never cached.
    ///
    /// `latest_content_updated_at` is the maximum modification time across
    /// all files in the folder's subtree, excluding generated summary files
    /// (the folder's own and its descendants') and never descending into
    /// build/VCS/dependency directories.
    pub fn compute(folder: &Path) -> Self {
        let output_path = folder.join(OUTPUT_FILENAME);
        let output_updated_at = std::fs::metadata(&output_path)
            .ok()
            .and_then(|m| m.modified().ok())
            .map(epoch_millis);
        let has_output_file = output_updated_at.is_some();

        let mut latest: Option<u64> = None;
        walk_dirs(
            folder,
            &mut |_, name| !FRESHNESS_PRUNE_DIRS.contains(&name),
            &mut |event| {
                if let WalkEvent::File(path, Some(mtime)) = event {
                    if path.file_name().map(|n| n == OUTPUT_FILENAME).unwrap_or(false) {
                        return;
                    }
                    let millis = epoch_millis(mtime);
                    latest = Some(latest.map_or(millis, |l| l.max(millis)));
                }
            },
        );

        let is_up_to_date = has_output_file
            && match (output_updated_at, latest) {
                (_, None) => true,
                (Some(out), Some(src)) => out >= src,
                (None, Some(_)) => false,
            };

        Self {
            has_output_file,
            output_updated_at,
            latest_content_updated_at: latest,
            is_up_to_date,
        }
    }
}

fn epoch_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// One folder's row in the dashboard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderStatusItem {
    pub path: PathBuf,
    pub name: String,
    pub relative_path: String,
    pub depth: usize,
    pub status: GenerationStatus,
    pub details: FolderDocStatusDetails,
}

/// Aggregate view pushed to the dashboard. Rebuilt fully on every
/// status-changing event, never incrementally patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub items: Vec<FolderStatusItem>,
}

/// Build a full snapshot over the flattened folder sequence.
///
/// `folders` is expected in leaf-to-root order (the processing order), and
/// the snapshot's item list preserves it. Freshness details are recomputed
/// for every folder on every call — correctness over performance, folder
/// counts are tens to low thousands.
pub fn snapshot(root: &Path, folders: &[&FolderNode], statuses: &StatusMap) -> StatusSnapshot {
    let mut snap = StatusSnapshot {
        total: folders.len(),
        ..StatusSnapshot::default()
    };

    for folder in folders {
        let status = statuses
            .get(&folder.path)
            .copied()
            .unwrap_or(GenerationStatus::NotStarted);
        match status {
            GenerationStatus::NotStarted => snap.not_started += 1,
            GenerationStatus::InProgress => snap.in_progress += 1,
            GenerationStatus::Completed => snap.completed += 1,
            GenerationStatus::Failed => snap.failed += 1,
        }

        let relative = folder
            .path
            .strip_prefix(root)
            .map(|r| r.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| folder.path.to_string_lossy().into_owned());
        let depth = if relative.is_empty() {
            0
        } else {
            relative.split('/').count()
        };

        snap.items.push(FolderStatusItem {
            path: folder.path.clone(),
            name: folder.name.clone(),
            relative_path: relative,
            depth,
            status,
            details: FolderDocStatusDetails::compute(&folder.path),
        });
    }

    snap
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};

    #[test]
    fn reconcile_preserves_surviving_paths() {
        let mut prior = StatusMap::new();
        prior.insert(PathBuf::from("/w/a"), GenerationStatus::Completed);
        prior.insert(PathBuf::from("/w/gone"), GenerationStatus::Failed);

        let current = vec![PathBuf::from("/w/a"), PathBuf::from("/w/new")];
        let next = reconcile(&prior, &current, false);

        assert_eq!(next[&PathBuf::from("/w/a")], GenerationStatus::Completed);
        assert_eq!(next[&PathBuf::from("/w/new")], GenerationStatus::NotStarted);
        assert!(!next.contains_key(&PathBuf::from("/w/gone")));
    }

    #[test]
    fn reconcile_with_reset_forces_not_started() {
        let mut prior = StatusMap::new();
        prior.insert(PathBuf::from("/w/a"), GenerationStatus::Completed);

        let current = vec![PathBuf::from("/w/a")];
        let next = reconcile(&prior, &current, true);
        assert_eq!(next[&PathBuf::from("/w/a")], GenerationStatus::NotStarted);
    }

    #[test]
    fn details_without_output_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("src.rs"), "fn f() {}").unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(!details.has_output_file);
        assert!(!details.is_up_to_date);
        assert!(details.latest_content_updated_at.is_some());
    }

    #[test]
    fn details_up_to_date_when_output_newer() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.rs");
        let out = dir.path().join(OUTPUT_FILENAME);
        std::fs::write(&src, "fn f() {}").unwrap();
        std::fs::write(&out, "# docs").unwrap();
        set_file_mtime(&src, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
        set_file_mtime(&out, FileTime::from_unix_time(1_700_000_100, 0)).unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(details.has_output_file);
        assert!(details.is_up_to_date);
    }

    #[test]
    fn details_stale_when_source_newer() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.rs");
        let out = dir.path().join(OUTPUT_FILENAME);
        std::fs::write(&src, "fn f() {}").unwrap();
        std::fs::write(&out, "# docs").unwrap();
        set_file_mtime(&out, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
        set_file_mtime(&src, FileTime::from_unix_time(1_700_000_100, 0)).unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(details.has_output_file);
        assert!(!details.is_up_to_date);
    }

    #[test]
    fn details_up_to_date_when_only_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OUTPUT_FILENAME), "# docs").unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(details.has_output_file);
        assert!(details.latest_content_updated_at.is_none());
        assert!(details.is_up_to_date);
    }

    #[test]
    fn freshness_walk_prunes_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(OUTPUT_FILENAME);
        std::fs::write(&out, "# docs").unwrap();
        set_file_mtime(&out, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

        // A newer file hidden inside node_modules must not count as drift.
        let nm = dir.path().join("node_modules");
        std::fs::create_dir(&nm).unwrap();
        let dep = nm.join("dep.js");
        std::fs::write(&dep, "x").unwrap();
        set_file_mtime(&dep, FileTime::from_unix_time(1_800_000_000, 0)).unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(details.is_up_to_date);
    }

    #[test]
    fn freshness_sees_nested_source_changes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(OUTPUT_FILENAME);
        std::fs::write(&out, "# docs").unwrap();
        set_file_mtime(&out, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let nested = sub.join("deep.rs");
        std::fs::write(&nested, "fn f() {}").unwrap();
        set_file_mtime(&nested, FileTime::from_unix_time(1_800_000_000, 0)).unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(!details.is_up_to_date);
    }

    #[test]
    fn child_output_files_do_not_count_as_content() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(OUTPUT_FILENAME);
        std::fs::write(&out, "# docs").unwrap();
        set_file_mtime(&out, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let child_out = sub.join(OUTPUT_FILENAME);
        std::fs::write(&child_out, "# sub docs").unwrap();
        set_file_mtime(&child_out, FileTime::from_unix_time(1_800_000_000, 0)).unwrap();

        let details = FolderDocStatusDetails::compute(dir.path());
        assert!(details.is_up_to_date);
    }

    #[test]
    fn snapshot_counts_and_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let root_node = FolderNode {
            path: dir.path().to_path_buf(),
            name: "root".to_string(),
            children: vec![],
        };
        let a_node = FolderNode {
            path: dir.path().join("a"),
            name: "a".to_string(),
            children: vec![],
        };
        let folders: Vec<&FolderNode> = vec![&a_node, &root_node];

        let mut statuses = StatusMap::new();
        statuses.insert(a_node.path.clone(), GenerationStatus::Completed);
        statuses.insert(root_node.path.clone(), GenerationStatus::Failed);

        let snap = snapshot(dir.path(), &folders, &statuses);
        assert_eq!(snap.total, 2);
        assert_eq!(snap.completed, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.items[0].name, "a");
        assert_eq!(snap.items[0].depth, 1);
        assert_eq!(snap.items[1].depth, 0);
        assert_eq!(snap.items[0].relative_path, "a");
    }

    #[test]
    fn snapshot_defaults_missing_status_to_not_started() {
        let dir = tempfile::tempdir().unwrap();
        let node = FolderNode {
            path: dir.path().to_path_buf(),
            name: "root".to_string(),
            children: vec![],
        };
        let folders: Vec<&FolderNode> = vec![&node];
        let snap = snapshot(dir.path(), &folders, &StatusMap::new());
        assert_eq!(snap.not_started, 1);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let node = FolderNode {
            path: dir.path().to_path_buf(),
            name: "root".to_string(),
            children: vec![],
        };
        let folders: Vec<&FolderNode> = vec![&node];
        let snap = snapshot(dir.path(), &folders, &StatusMap::new());
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"not_started\""));
    }
}
