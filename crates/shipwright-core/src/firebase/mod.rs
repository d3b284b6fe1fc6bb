pub mod cli;
pub mod envelope;
pub mod project;
pub mod resolver;
pub mod sync;
pub mod types;

pub use project::ProjectId;
pub use resolver::ProjectResolver;
pub use sync::{FirebaseSync, SyncOptions, SyncOutcome, SyncReport};

/// User-facing progress messages, logged as they happen and kept for the
/// final report.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<String>,
}

impl Journal {
    pub fn note(&mut self, message: String) {
        tracing::info!("{message}");
        self.entries.push(message);
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.entries.push(message);
    }

    pub fn extend(&mut self, other: Journal) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
