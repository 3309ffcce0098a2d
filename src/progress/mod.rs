//! Operator-facing progress output.

use colored::Colorize;

use crate::status::GenerationStatus;

/// Prints per-folder progress lines and the terminal run summary to stderr.
/// Disabled entirely for machine-readable invocations.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn folder_started(&self, index: usize, total: usize, name: &str) {
        if !self.enabled {
            return;
        }
        eprintln!(
            "{} Processing folder {index}/{total}: {name}",
            "→".blue()
        );
    }

    pub fn folder_finished(&self, name: &str, status: GenerationStatus) {
        if !self.enabled {
            return;
        }
        match status {
            GenerationStatus::Completed => eprintln!("{} {name}", "✓".green()),
            GenerationStatus::Failed => eprintln!("{} {name} (fallback written)", "✗".red()),
            _ => {}
        }
    }

    pub fn run_summary(&self, processed: usize, failed: usize, cancelled: bool) {
        if !self.enabled {
            return;
        }
        if cancelled {
            eprintln!(
                "{} Run cancelled after {processed} folder(s)",
                "!".yellow()
            );
        } else if failed > 0 {
            eprintln!(
                "{} Run finished: {processed} folder(s) processed, {failed} failed",
                "!".yellow()
            );
        } else {
            eprintln!(
                "{} Run finished: {processed} folder(s) processed",
                "✓".green()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_reporter_is_silent_and_cheap() {
        let reporter = ProgressReporter::new(false);
        reporter.folder_started(1, 3, "src");
        reporter.folder_finished("src", GenerationStatus::Completed);
        reporter.run_summary(3, 0, false);
    }
}
