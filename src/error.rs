//! Error taxonomy for rendering, extraction and storage.
//!
//! Render and extraction failures are scoped to a single store and are
//! collected by the fetch loop. Storage failures abort the current command.

use thiserror::Error;

/// Failure to obtain a rendered page from the rendering collaborator.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Could not open a browser session or HTTP client
    #[error("failed to start rendering session: {0}")]
    Session(String),

    /// Navigation failed or the server answered with an error
    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The page never became ready within the allotted time
    #[error("timed out after {secs}s waiting for {url}")]
    Timeout { url: String, secs: u64 },
}

impl RenderError {
    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Navigation { url: url.into(), reason: reason.to_string() }
    }
}

/// Failure to pull a price out of page text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no price found on the page")]
    NoPrice,

    #[error("could not parse price from '{raw}'")]
    Unparseable { raw: String },
}

/// Persistence layer failure.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be decoded back into an observation
    #[error("corrupt row for {product}/{store}: {reason}")]
    CorruptRow { product: String, store: String, reason: String },
}

/// Per-store failure captured by the fetch loop.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
