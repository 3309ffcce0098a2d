//! Dashboard message contract.
//!
//! Two tagged-union message types, one per direction, with exhaustive
//! handling at both ends. The wire shape is plain JSON so any host UI
//! (webview, TUI, editor panel) can speak it; the enums exist so the core
//! cannot silently ignore a new intent.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{IgnoreConfig, PromptConfig};
use crate::providers::ModelInfo;
use crate::status::StatusSnapshot;

/// Intents emitted by the dashboard (UI → core).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiIntent {
    /// Run generation over every folder in the tree.
    GenerateAll {
        #[serde(default)]
        reset: bool,
    },
    /// Run generation only over folders whose output is missing or stale.
    GenerateOutdated,
    /// Run generation for a single folder.
    GenerateFolder { path: PathBuf },
    /// Select the model used for subsequent runs.
    SelectModel { id: String },
    UpdateIgnoreConfig { ignore: IgnoreConfig },
    UpdatePromptConfig { prompt: PromptConfig },
    /// Rescan the tree and push a fresh snapshot without generating.
    Refresh,
    /// Request a folder's generated document content.
    OpenFolderDoc { path: PathBuf },
}

/// Messages pushed by the core (core → UI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreMessage {
    /// Full status snapshot; pushed whenever any folder's status changes.
    Status { snapshot: StatusSnapshot },
    /// Model catalog plus the currently selected model id, on demand.
    Models {
        models: Vec<ModelInfo>,
        selected: Option<String>,
    },
    /// Current configuration surface, on demand.
    Config {
        ignore: IgnoreConfig,
        prompt: PromptConfig,
    },
    /// Content of one folder's generated document.
    FolderDoc {
        path: PathBuf,
        content: Option<String>,
    },
    /// Terminal outcome of a run.
    RunFinished {
        processed: usize,
        failed: usize,
        cancelled: bool,
    },
    /// An error that prevented an intent from being carried out.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_json_roundtrip() {
        let intent = UiIntent::GenerateFolder {
            path: PathBuf::from("/workspace/src"),
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"type\":\"generate_folder\""));
        let back: UiIntent = serde_json::from_str(&json).unwrap();
        match back {
            UiIntent::GenerateFolder { path } => {
                assert_eq!(path, PathBuf::from("/workspace/src"));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn generate_all_reset_defaults_to_false() {
        let intent: UiIntent = serde_json::from_str(r#"{"type":"generate_all"}"#).unwrap();
        match intent {
            UiIntent::GenerateAll { reset } => assert!(!reset),
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn core_message_is_tagged() {
        let msg = CoreMessage::RunFinished {
            processed: 3,
            failed: 1,
            cancelled: false,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"run_finished\""));
        assert!(json.contains("\"processed\":3"));
    }

    #[test]
    fn unknown_intent_type_is_rejected() {
        let result = serde_json::from_str::<UiIntent>(r#"{"type":"self_destruct"}"#);
        assert!(result.is_err());
    }
}
