//! Pipeline orchestrator: owns the scanned tree, the status map, and the
//! configuration surface, and drives generation runs over the leaf-to-root
//! sequence.
//!
//! One orchestrator is constructed per workspace session. All mutable run
//! state lives here; nothing is process-global, so several workspaces can
//! coexist in one process and tests get clean teardown for free.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::cancel::CancelFlag;
use crate::config::{Config, IgnoreConfig, PromptConfig};
use crate::constants::OUTPUT_FILENAME;
use crate::dashboard::{CoreMessage, UiIntent};
use crate::engine::GenerationEngine;
use crate::progress::ProgressReporter;
use crate::providers::ChatProvider;
use crate::scan::{self, FolderNode, IgnoreFilter, ScanError, flatten};
use crate::status::{self, FolderDocStatusDetails, GenerationStatus, StatusMap, StatusSnapshot};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// No workspace folder exists at the configured root. Fatal to starting
    /// a run; no partial state is created.
    #[error("workspace folder does not exist: {0}")]
    WorkspaceMissing(PathBuf),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("folder is not part of the scanned tree: {0}")]
    FolderNotInTree(PathBuf),
}

/// What a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Every folder in the tree. `reset` forces all statuses back to
    /// NotStarted before the run.
    Full { reset: bool },
    /// Only folders whose output is missing or stale, still leaf-to-root.
    Outdated,
    /// One folder, bypassing sequence iteration.
    Single { path: PathBuf },
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub processed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Owns per-workspace pipeline state and drives generation runs.
pub struct DocOrchestrator {
    workspace_root: PathBuf,
    config: Config,
    engine: GenerationEngine,
    provider: Arc<dyn ChatProvider>,
    progress: ProgressReporter,
    tree: Option<FolderNode>,
    statuses: StatusMap,
    snapshot_tx: watch::Sender<StatusSnapshot>,
}

impl DocOrchestrator {
    pub fn new(
        workspace_root: PathBuf,
        config: Config,
        provider: Arc<dyn ChatProvider>,
        progress: ProgressReporter,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(StatusSnapshot::default());
        Self {
            workspace_root,
            config,
            engine: GenerationEngine::new(provider.clone()),
            provider,
            progress,
            tree: None,
            statuses: StatusMap::new(),
            snapshot_tx,
        }
    }

    /// Subscribe to status snapshots. A fresh snapshot is published after
    /// every status-changing event.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// (Re)scan the workspace and reconcile the status map against the new
    /// path set. Surviving paths keep their status unless `reset` is set;
    /// vanished paths are dropped, new paths start as NotStarted.
    pub fn scan(&mut self, reset: bool) -> Result<(), OrchestratorError> {
        if !self.workspace_root.is_dir() {
            return Err(OrchestratorError::WorkspaceMissing(
                self.workspace_root.clone(),
            ));
        }

        let filter = IgnoreFilter::new(&self.config.ignore);
        let tree = scan::build_tree(&self.workspace_root, &filter)?;
        let paths: Vec<PathBuf> = flatten(&tree).iter().map(|n| n.path.clone()).collect();
        self.statuses = status::reconcile(&self.statuses, &paths, reset);
        self.tree = Some(tree);
        self.publish_snapshot();
        Ok(())
    }

    /// Execute one generation run.
    ///
    /// Strictly sequential: one folder at a time, in leaf-to-root order, so
    /// parent prompts see child summaries written earlier in the same run.
    /// Cancellation is checked once per folder; a pending model call is not
    /// interrupted.
    pub async fn run(
        &mut self,
        mode: RunMode,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome, OrchestratorError> {
        let reset = matches!(mode, RunMode::Full { reset: true });
        self.scan(reset)?;

        let sequence = self.sequence_for(&mode)?;
        let total = sequence.len();
        let mut outcome = RunOutcome {
            processed: 0,
            failed: 0,
            cancelled: false,
        };

        for (index, (path, name)) in sequence.into_iter().enumerate() {
            if cancel.is_requested() {
                outcome.cancelled = true;
                break;
            }

            self.progress.folder_started(index + 1, total, &name);
            self.set_status(&path, GenerationStatus::InProgress);
            self.publish_snapshot();

            let ok = self.engine.generate(&path, &self.config, cancel).await;
            let final_status = if ok {
                GenerationStatus::Completed
            } else {
                outcome.failed += 1;
                GenerationStatus::Failed
            };
            self.set_status(&path, final_status);
            self.publish_snapshot();
            self.progress.folder_finished(&name, final_status);

            outcome.processed += 1;
        }

        self.progress
            .run_summary(outcome.processed, outcome.failed, outcome.cancelled);
        Ok(outcome)
    }

    /// Handle one dashboard intent and produce the reply message.
    ///
    /// Run-triggering intents execute the run to completion before replying;
    /// snapshot updates flow through the watch channel while they do.
    pub async fn handle_intent(&mut self, intent: UiIntent, cancel: &CancelFlag) -> CoreMessage {
        match intent {
            UiIntent::GenerateAll { reset } => {
                self.run_to_message(RunMode::Full { reset }, cancel).await
            }
            UiIntent::GenerateOutdated => self.run_to_message(RunMode::Outdated, cancel).await,
            UiIntent::GenerateFolder { path } => {
                self.run_to_message(RunMode::Single { path }, cancel).await
            }
            UiIntent::SelectModel { id } => {
                self.set_selected_model(Some(id));
                self.models_message().await
            }
            UiIntent::UpdateIgnoreConfig { ignore } => {
                self.set_ignore_config(ignore);
                match self.scan(false) {
                    Ok(()) => self.config_message(),
                    Err(e) => CoreMessage::Error {
                        message: e.to_string(),
                    },
                }
            }
            UiIntent::UpdatePromptConfig { prompt } => {
                self.set_prompt_config(prompt);
                self.config_message()
            }
            UiIntent::Refresh => match self.scan(false) {
                Ok(()) => CoreMessage::Status {
                    snapshot: self.snapshot_tx.borrow().clone(),
                },
                Err(e) => CoreMessage::Error {
                    message: e.to_string(),
                },
            },
            UiIntent::OpenFolderDoc { path } => {
                let content = tokio::fs::read_to_string(path.join(OUTPUT_FILENAME))
                    .await
                    .ok();
                CoreMessage::FolderDoc { path, content }
            }
        }
    }

    pub fn ignore_config(&self) -> &IgnoreConfig {
        &self.config.ignore
    }

    /// Replace the ignore configuration wholesale. Takes effect on the next
    /// scan.
    pub fn set_ignore_config(&mut self, ignore: IgnoreConfig) {
        self.config.ignore = ignore;
    }

    pub fn prompt_config(&self) -> &PromptConfig {
        &self.config.prompt
    }

    pub fn set_prompt_config(&mut self, prompt: PromptConfig) {
        self.config.prompt = prompt;
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.config.provider.model.as_deref()
    }

    pub fn set_selected_model(&mut self, model: Option<String>) {
        self.config.provider.model = model;
    }

    async fn run_to_message(&mut self, mode: RunMode, cancel: &CancelFlag) -> CoreMessage {
        match self.run(mode, cancel).await {
            Ok(outcome) => CoreMessage::RunFinished {
                processed: outcome.processed,
                failed: outcome.failed,
                cancelled: outcome.cancelled,
            },
            Err(e) => CoreMessage::Error {
                message: e.to_string(),
            },
        }
    }

    async fn models_message(&self) -> CoreMessage {
        let models = match self.provider.list_models().await {
            Ok(models) => models,
            Err(e) => {
                eprintln!("Warning: could not list models: {e}");
                self.config.provider.models.clone()
            }
        };
        CoreMessage::Models {
            models,
            selected: self.config.provider.model.clone(),
        }
    }

    fn config_message(&self) -> CoreMessage {
        CoreMessage::Config {
            ignore: self.config.ignore.clone(),
            prompt: self.config.prompt.clone(),
        }
    }

    /// Resolve the mode into an owned (path, name) processing sequence.
    fn sequence_for(&self, mode: &RunMode) -> Result<Vec<(PathBuf, String)>, OrchestratorError> {
        let Some(tree) = &self.tree else {
            // scan() always runs first; an empty sequence is the safe answer.
            return Ok(Vec::new());
        };
        let ordered = flatten(tree);

        let sequence = match mode {
            RunMode::Full { .. } => ordered
                .iter()
                .map(|n| (n.path.clone(), n.name.clone()))
                .collect(),
            RunMode::Outdated => ordered
                .iter()
                .filter(|n| !FolderDocStatusDetails::compute(&n.path).is_up_to_date)
                .map(|n| (n.path.clone(), n.name.clone()))
                .collect(),
            RunMode::Single { path } => {
                let node = ordered
                    .iter()
                    .find(|n| &n.path == path)
                    .ok_or_else(|| OrchestratorError::FolderNotInTree(path.clone()))?;
                vec![(node.path.clone(), node.name.clone())]
            }
        };
        Ok(sequence)
    }

    fn set_status(&mut self, path: &Path, status: GenerationStatus) {
        self.statuses.insert(path.to_path_buf(), status);
    }

    fn publish_snapshot(&self) {
        if let Some(tree) = &self.tree {
            let folders = flatten(tree);
            let snap = status::snapshot(&self.workspace_root, &folders, &self.statuses);
            let _ = self.snapshot_tx.send(snap);
        }
    }
}
