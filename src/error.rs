use thiserror::Error;

/// Failures that stop a lesson from being produced at all.
///
/// A missing field or section is never an error; extractors fall back to
/// their defaults instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} produced no usable element tree")]
    EmptyDocument { url: String },
}
