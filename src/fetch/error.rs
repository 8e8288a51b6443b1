//! Error types for the fetch module.
//!
//! Every failure carries the URL that was being requested so that a
//! diagnostic on an aborted export points at the exact hop that broke.

use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The provided URL (or a redirect target) is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A redirect response carried neither a `Location` header nor an anchor tag.
    #[error("HTTP {status} redirect from {url} has no usable target")]
    MalformedRedirect {
        /// The URL that answered with the redirect.
        url: String,
        /// The redirect status code.
        status: u16,
    },

    /// The redirect chain exceeded the configured hop limit.
    #[error("too many redirects ({limit}) starting from {url}")]
    TooManyRedirects {
        /// The URL the chain started from.
        url: String,
        /// The configured hop limit.
        limit: usize,
    },

    /// The final response carried a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a malformed redirect error.
    pub fn malformed_redirect(url: impl Into<String>, status: u16) -> Self {
        Self::MalformedRedirect {
            url: url.into(),
            status,
        }
    }

    /// Creates a redirect limit error.
    pub fn too_many_redirects(url: impl Into<String>, limit: usize) -> Self {
        Self::TooManyRedirects {
            url: url.into(),
            limit,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}

// No From<reqwest::Error>: every variant needs the URL for context, so callers
// go through the helper constructors above.
