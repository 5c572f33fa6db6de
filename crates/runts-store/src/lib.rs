//! Durable storage: JSON history file and notification artifact directory.

mod artifact;
mod atomic;
mod error;
mod history;

pub use artifact::{ArtifactDir, PendingArtifact};
pub use error::StoreError;
pub use history::JsonHistoryStore;
