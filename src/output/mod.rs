//! Output tree bookkeeping.
//!
//! [`OutputTree`] is a stack of [`OutputFrame`]s, one per level of collection
//! nesting. The top frame is where files and index entries currently go.
//! Every [`OutputTree::begin_frame`] must be matched by exactly one
//! [`OutputTree::end_frame`], including when the collection body fails, so
//! that later siblings are written into the right directory.

mod error;
mod filename;
mod index;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use error::OutputError;
pub use filename::{NameKind, numbered_component, sanitize_component};
pub use index::{INDEX_FILE_NAME, IndexDocument, IndexEntry};

/// One level of the output tree: a directory and its open index document.
///
/// The frame hands out the on-disk names of everything placed in its
/// directory, so two entries never share a path and no entry can take the
/// index document's name.
#[derive(Debug)]
pub struct OutputFrame {
    directory: PathBuf,
    index: IndexDocument,
    /// Lowercased names already taken in `directory`.
    taken: HashSet<String>,
}

impl OutputFrame {
    fn new(directory: PathBuf, index: IndexDocument) -> Self {
        let mut taken = HashSet::new();
        taken.insert(INDEX_FILE_NAME.to_string());
        Self {
            directory,
            index,
            taken,
        }
    }

    /// Directory receiving this level's files.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Marks `name` as unavailable for entries of this frame.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_lowercase());
    }

    /// Picks the on-disk name for an entry displayed as `name`.
    ///
    /// The name is sanitized; if it is reserved or already used in this
    /// directory (compared case-insensitively) it is numbered from `(2)` up.
    /// The same sequence of calls yields the same names on every run.
    pub fn claim_name(&mut self, name: &str, kind: NameKind) -> String {
        let base = sanitize_component(name);
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = numbered_component(&base, n, kind);
            n += 1;
        }
        if candidate != base {
            debug!(name, on_disk = %candidate, "name already taken in directory");
        }
        candidate
    }

    /// Appends an entry to this level's index document.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Filesystem`] if the write fails.
    pub async fn add_entry(&mut self, entry: &IndexEntry) -> Result<(), OutputError> {
        self.index.append(entry).await
    }
}

/// Stack of open output frames.
#[derive(Debug, Default)]
pub struct OutputTree {
    frames: Vec<OutputFrame>,
}

impl OutputTree {
    /// Creates an empty tree. [`begin_root`](Self::begin_root) opens the first frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the root frame at `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Filesystem`] if the directory or its index
    /// cannot be created.
    pub async fn begin_root(&mut self, directory: &Path, title: &str) -> Result<(), OutputError> {
        create_dir_idempotent(directory).await?;
        let index = IndexDocument::create(directory, title, None).await?;
        debug!(directory = %directory.display(), "opened root frame");
        self.frames.push(OutputFrame::new(directory.to_path_buf(), index));
        Ok(())
    }

    /// Opens a frame for collection `name` beneath the current frame and
    /// returns the directory name it was given.
    ///
    /// The directory name is claimed from the current frame with
    /// [`OutputFrame::claim_name`]; an existing directory of that name is
    /// reused. Nothing is pushed on failure.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::EmptyStack`] if no frame is open, or
    /// [`OutputError::Filesystem`] if the directory or index cannot be created.
    pub async fn begin_frame(
        &mut self,
        name: &str,
        parent_label: Option<&str>,
    ) -> Result<String, OutputError> {
        let parent = self.current_frame()?;
        let dir_name = parent.claim_name(name, NameKind::Directory);
        let directory = parent.directory.join(&dir_name);
        create_dir_idempotent(&directory).await?;
        let index = IndexDocument::create(&directory, name, parent_label).await?;

        debug!(directory = %directory.display(), depth = self.frames.len() + 1, "opened frame");
        self.frames.push(OutputFrame::new(directory, index));
        Ok(dir_name)
    }

    /// Closes the current frame's index and pops it.
    ///
    /// The frame is popped even when finishing its index fails.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::EmptyStack`] if no frame is open, or
    /// [`OutputError::Filesystem`] if the index cannot be finished.
    pub async fn end_frame(&mut self) -> Result<(), OutputError> {
        let frame = self.frames.pop().ok_or(OutputError::EmptyStack)?;
        debug!(index = %frame.index.path().display(), depth = self.frames.len(), "closing frame");
        frame.index.finish().await
    }

    /// Returns the frame output currently goes to.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::EmptyStack`] if no frame is open.
    pub fn current_frame(&mut self) -> Result<&mut OutputFrame, OutputError> {
        self.frames.last_mut().ok_or(OutputError::EmptyStack)
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

async fn create_dir_idempotent(directory: &Path) -> Result<(), OutputError> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| OutputError::filesystem(directory, e))
}
