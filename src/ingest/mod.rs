/// Source data ingest.
///
/// Submodules:
/// - `profile`: float file exports → metadata and profile documents.

pub mod profile;

use crate::logging::{self, Component};
use profile::AssembledFile;

/// Running counts for one ingest run.
///
/// Profile counts and file counts are kept apart: a file that cannot be
/// read contributes no profiles, so it never shows up as a profile failure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestTally {
    pub files_read: usize,
    pub files_failed: usize,
    pub profiles: usize,
    pub stored: usize,
    pub failed: usize,
}

impl IngestTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unreadable_file(&mut self) {
        self.files_failed += 1;
    }

    /// Count every profile in the file; rejected ones are failures already.
    pub fn record_assembled(&mut self, assembled: &AssembledFile) {
        self.files_read += 1;
        self.profiles += assembled.documents.len() + assembled.rejected.len();
        self.failed += assembled.rejected.len();
    }

    /// Outcome of writing (or printing) the assembled documents.
    pub fn record_stored(&mut self, successful: usize, failed: usize) {
        self.stored += successful;
        self.failed += failed;
    }

    pub fn log_summary(&self) {
        logging::log_ingest_summary(Component::Ingest, self.profiles, self.stored, self.failed);
        if self.files_failed > 0 {
            logging::error(
                Component::Ingest,
                None,
                &format!(
                    "{} of {} float files could not be read",
                    self.files_failed,
                    self.files_read + self.files_failed
                ),
            );
        }
    }
}
