//! Unified error handling for the sitesearch crate
//!
//! Each subsystem has its own error enum; [`Error`] wraps them so that
//! callers crossing module boundaries can use a single type while still
//! matching on the detailed cause.
//!
//! # Architecture
//!
//! - [`FetchError`] - one URL could not be fetched (recovered by the crawler)
//! - [`LemmaError`] - morphological analysis rejected a token
//! - [`IndexingError`] - pipeline and indexing service failures, including cancellation
//! - [`SearchError`] - failures reported to search callers
//! - [`ErrorCategory`] - classification of errors for handling strategies

use thiserror::Error;

/// Errors that can occur while fetching a single page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP transport error (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success status code
    #[error("Unexpected status code: {0}")]
    Status(u16),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Transport level failures may succeed on a later crawl
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors raised by the morphology backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LemmaError {
    /// Token contains characters outside the analyzer's alphabet
    #[error("Malformed token for {language} analyzer: {token:?}")]
    MalformedToken { token: String, language: &'static str },
}

/// Errors raised by the site indexing pipeline and the indexing service
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Cooperative cancellation was observed at a checkpoint
    #[error("crawl interrupted")]
    Cancelled,

    /// Another indexing campaign is running
    #[error("Indexing is already running")]
    AlreadyActive,

    /// Stop was requested while nothing is indexing
    #[error("Indexing is not running")]
    NotActive,

    /// URL is not among the configured sites
    #[error("Page is outside the sites listed in the configuration: {0}")]
    UnknownSite(String),

    /// Lemmatization failed on crawled content
    #[error("Lemmatization failed: {0}")]
    Lemma(#[from] LemmaError),

    /// Storage layer failure
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    /// A blocking worker panicked or was aborted
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IndexingError {
    /// Check whether this is the cancellation control-flow condition
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<anyhow::Error> for IndexingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

/// Errors reported to search callers
#[derive(Error, Debug)]
pub enum SearchError {
    /// The requested site scope is not a known site
    #[error("The page is outside the sites listed in the configuration: {0}")]
    UnknownSite(String),

    /// Query text could not be lemmatized
    #[error("Lemmatization failed: {0}")]
    Lemma(#[from] LemmaError),

    /// Storage layer failure
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Parsing and morphology errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and scope errors
    Config,
    /// Indexing lifecycle errors
    Indexing,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Human readable description of the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing error",
            Self::Storage => "storage error",
            Self::Config => "configuration error",
            Self::Indexing => "indexing error",
            Self::Other => "other error",
        }
    }
}

/// Unified error type for the sitesearch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Indexing pipeline and service errors
    #[error("Indexing error: {0}")]
    Indexing(#[from] IndexingError),

    /// Search errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Indexing(e) => match e {
                IndexingError::UnknownSite(_) => ErrorCategory::Config,
                IndexingError::Storage(_) => ErrorCategory::Storage,
                IndexingError::Lemma(_) => ErrorCategory::Parsing,
                _ => ErrorCategory::Indexing,
            },
            Self::Search(e) => match e {
                SearchError::UnknownSite(_) => ErrorCategory::Config,
                SearchError::Lemma(_) => ErrorCategory::Parsing,
                SearchError::Storage(_) => ErrorCategory::Storage,
            },
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
