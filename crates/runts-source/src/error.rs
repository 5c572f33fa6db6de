use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no snapshot for {fiscal_code}: {path}")]
    Missing { fiscal_code: String, path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot for {fiscal_code}: {source}")]
    Json {
        fiscal_code: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("scraper reported failure: {reason}")]
    Reported { reason: String },

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "http")]
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}
