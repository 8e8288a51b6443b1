//! Library Export Core
//!
//! This library exports a user's content library from a content-management
//! service into a local directory tree that mirrors the service's
//! collections, with an `index.html` in every directory linking the files,
//! sub-collections and external links it contains.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Authenticated HTTP GET that follows redirects hop by hop
//! - [`library`] - Typed model of listing and node-detail JSON
//! - [`output`] - Output directory / index document frame stack
//! - [`export`] - Recursive export engine tying the above together
//! - [`config`] - Optional file-based defaults for the CLI
//! - [`session`] - Run-wide base URL, user and credentials

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod export;
pub mod fetch;
pub mod library;
pub mod output;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use export::{ExportError, ExportOptions, ExportStats, Exporter};
pub use fetch::{AuthenticatedFetcher, FetchError, FetchOptions};
pub use library::{ContentNode, NodeKind, ParseError};
pub use output::{OutputError, OutputTree};
pub use session::{Credentials, Session};
