//! Clap argument types and run-mode resolution.

use clap::Parser;
use std::path::PathBuf;

use dirdocs::orchestrator::RunMode;

/// AI-generated per-folder documentation for a project tree.
#[derive(Parser, Debug)]
#[command(name = "dirdocs", version = dirdocs::constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Generate folder documentation across the workspace.
    Generate(GenerateArgs),

    /// Show per-folder generation and freshness status.
    Status(StatusArgs),

    /// List the models available for selection.
    Models(WorkspaceArgs),

    /// Print the effective configuration after layering.
    Config(WorkspaceArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Path to the workspace root (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Only process folders whose documentation is missing or stale.
    #[arg(long, default_value_t = false)]
    pub outdated: bool,

    /// Reset all folder statuses to not-started before the run.
    #[arg(long, default_value_t = false, conflicts_with_all = ["outdated", "folder"])]
    pub reset: bool,

    /// Generate documentation for a single folder only.
    #[arg(long, conflicts_with = "outdated")]
    pub folder: Option<PathBuf>,

    /// Model id to use, overriding configuration.
    #[arg(long)]
    pub model: Option<String>,

    /// Suppress per-folder progress output.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl GenerateArgs {
    /// Resolve the flags into a run mode. `--folder` paths are anchored at
    /// the workspace root when given relative.
    pub fn run_mode(&self) -> RunMode {
        if let Some(folder) = &self.folder {
            let path = if folder.is_absolute() {
                folder.clone()
            } else {
                self.path.join(folder)
            };
            RunMode::Single { path }
        } else if self.outdated {
            RunMode::Outdated
        } else {
            RunMode::Full { reset: self.reset }
        }
    }
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Path to the workspace root (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Emit the snapshot as JSON instead of the table view.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for subcommands that only need a workspace root.
#[derive(Parser, Debug)]
pub struct WorkspaceArgs {
    /// Path to the workspace root (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn generate_defaults_to_full_mode() {
        let cli = parse(&["dirdocs", "generate"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.run_mode(), RunMode::Full { reset: false });
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn generate_outdated_flag() {
        let cli = parse(&["dirdocs", "generate", "--outdated"]);
        match cli.command {
            Command::Generate(args) => assert_eq!(args.run_mode(), RunMode::Outdated),
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn generate_folder_is_anchored_at_workspace_root() {
        let cli = parse(&["dirdocs", "generate", "--path", "/ws", "--folder", "src"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(
                    args.run_mode(),
                    RunMode::Single {
                        path: PathBuf::from("/ws/src")
                    }
                );
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn generate_absolute_folder_kept_as_is() {
        let cli = parse(&["dirdocs", "generate", "--folder", "/abs/src"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(
                    args.run_mode(),
                    RunMode::Single {
                        path: PathBuf::from("/abs/src")
                    }
                );
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn reset_conflicts_with_outdated() {
        let result = Cli::try_parse_from(["dirdocs", "generate", "--reset", "--outdated"]);
        assert!(result.is_err());
    }

    #[test]
    fn folder_conflicts_with_outdated() {
        let result = Cli::try_parse_from(["dirdocs", "generate", "--folder", "x", "--outdated"]);
        assert!(result.is_err());
    }

    #[test]
    fn status_json_flag() {
        let cli = parse(&["dirdocs", "status", "--json"]);
        match cli.command {
            Command::Status(args) => assert!(args.json),
            _ => panic!("expected Status command"),
        }
    }
}
