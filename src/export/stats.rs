//! Counters collected during an export run.

/// What an export produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    files: usize,
    bytes: u64,
    collections: usize,
    links: usize,
    aliases: usize,
    documents_skipped: usize,
}

impl ExportStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written to disk.
    #[must_use]
    pub fn files(&self) -> usize {
        self.files
    }

    /// Total bytes of file content written.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Collection directories created.
    #[must_use]
    pub fn collections(&self) -> usize {
        self.collections
    }

    /// External links recorded in indexes.
    #[must_use]
    pub fn links(&self) -> usize {
        self.links
    }

    /// Internal links resolved to the node they point at.
    #[must_use]
    pub fn aliases(&self) -> usize {
        self.aliases
    }

    /// Rich-text documents skipped.
    #[must_use]
    pub fn documents_skipped(&self) -> usize {
        self.documents_skipped
    }

    pub(crate) fn record_file(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }

    pub(crate) fn record_collection(&mut self) {
        self.collections += 1;
    }

    pub(crate) fn record_link(&mut self) {
        self.links += 1;
    }

    pub(crate) fn record_alias(&mut self) {
        self.aliases += 1;
    }

    pub(crate) fn record_document_skipped(&mut self) {
        self.documents_skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = ExportStats::new();
        stats.record_file(10);
        stats.record_file(5);
        stats.record_collection();
        stats.record_link();
        stats.record_alias();
        stats.record_document_skipped();

        assert_eq!(stats.files(), 2);
        assert_eq!(stats.bytes(), 15);
        assert_eq!(stats.collections(), 1);
        assert_eq!(stats.links(), 1);
        assert_eq!(stats.aliases(), 1);
        assert_eq!(stats.documents_skipped(), 1);
    }
}
