//! Error type for export runs.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::library::ParseError;
use crate::output::OutputError;

/// Any failure that aborts an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A listing, node-detail or file request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A payload did not match the API contract.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The output tree could not be written, or the frame stack was misused.
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl ExportError {
    /// Returns true for the frame-stack invariant violation.
    #[must_use]
    pub fn is_empty_stack(&self) -> bool {
        matches!(self, Self::Output(OutputError::EmptyStack))
    }
}
