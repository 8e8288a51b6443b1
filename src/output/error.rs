//! Error types for the output tree.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing the exported tree.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Directory or file creation, write, or flush failed.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// The path being created or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A frame was requested while no frame was open.
    #[error("output frame stack is empty")]
    EmptyStack,
}

impl OutputError {
    /// Creates a filesystem error.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = OutputError::filesystem("/tmp/out/a.pdf", io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/out/a.pdf"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }
}
