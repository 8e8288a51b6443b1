//! Authenticated HTTP retrieval for the export engine.
//!
//! Every request the exporter makes (search listings, node detail JSON and
//! file bodies) goes through [`AuthenticatedFetcher`], which attaches HTTP
//! Basic credentials to the request and to every redirect hop.
//!
//! # Example
//!
//! ```no_run
//! use library_export_core::fetch::{AuthenticatedFetcher, FetchOptions};
//! use library_export_core::session::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = AuthenticatedFetcher::new(Credentials::admin("secret"), FetchOptions::default())?;
//! let response = fetcher.fetch("https://example.edu/p/abc.infinity.json").await?;
//! println!("status: {}", response.status());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;

pub use client::{AuthenticatedFetcher, FetchOptions};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_ADMIN_USER, DEFAULT_MAX_REDIRECTS, READ_TIMEOUT_SECS,
};
pub use error::FetchError;
