//! Snapshot sources: the boundary with the external scraper.
//!
//! The scraper (browser automation against the RUNTS portal) runs outside
//! this workspace. It hands over one snapshot per organization either as
//! files in a directory or through an HTTP sidecar.

mod dir;
mod error;
#[cfg(feature = "http")]
mod http;
mod wire;

pub use dir::DirectorySource;
pub use error::SourceError;
#[cfg(feature = "http")]
pub use http::HttpSource;

use async_trait::async_trait;
use runts_core::{Organization, Snapshot};

/// Yields the freshly scraped snapshot for one organization.
///
/// Implementations must return an error, never an empty snapshot, when the
/// scrape did not complete. An `Ok` empty snapshot means the organization
/// really has no documents.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, org: &Organization) -> Result<Snapshot, SourceError>;

    /// Called after `org`'s snapshot has been committed to history.
    ///
    /// Sources that hand over files remove them here, so a later run whose
    /// scrape never happened sees a missing snapshot instead of this one.
    async fn acknowledge(&self, _org: &Organization) -> Result<(), SourceError> {
        Ok(())
    }
}
