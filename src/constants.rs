//! App-wide constants.
//!
//! Centralises the tool name, the generated output filename, config paths,
//! and environment variable names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "dirdocs";

/// Crate version, injected by cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed filename of the generated per-folder summary.
pub const OUTPUT_FILENAME: &str = "AGENTS.md";

/// Local config filename (e.g. `.dirdocs.toml` in the workspace root).
pub const CONFIG_FILENAME: &str = ".dirdocs.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "dirdocs";

/// Directory names that are never descended into when computing
/// content freshness, regardless of ignore configuration.
pub const FRESHNESS_PRUNE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    ".venv",
    "venv",
    "__pycache__",
    ".idea",
    ".vscode",
];

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "DIRDOCS_PROVIDER";
pub const ENV_MODEL: &str = "DIRDOCS_MODEL";
pub const ENV_API_KEY: &str = "DIRDOCS_API_KEY";
pub const ENV_BASE_URL: &str = "DIRDOCS_BASE_URL";
