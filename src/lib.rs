//! dirdocs — AI-powered per-folder documentation generator (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod context;
pub mod dashboard;
pub mod engine;
pub mod env;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod providers;
pub mod scan;
pub mod status;
