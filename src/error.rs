// src/error.rs
// =============================================================================
// Error types of the library.
//
// Very little here is fatal: a page that cannot be fetched still produces a
// report (with the error as its status message), and a dead link is just a
// status code on that link. These errors cover the few things that really
// stop us: a bad configuration, or an HTTP client that cannot be built.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_concurrent_probes must be at least 1")]
    ZeroConcurrency,
    #[error("max_body_bytes must be at least 1")]
    ZeroBodyLimit,
    #[error("request_timeout must be longer than zero")]
    ZeroTimeout,
}

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why the root page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0}")]
    Request(#[from] reqwest::Error),
}
