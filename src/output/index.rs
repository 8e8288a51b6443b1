//! Per-directory `index.html` documents.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::error::OutputError;

/// File name of every generated index document.
pub const INDEX_FILE_NAME: &str = "index.html";

/// One `<li>` of an index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    /// A downloaded file beside the index.
    File {
        /// Name shown to the reader.
        name: String,
        /// On-disk file name.
        file_name: String,
    },
    /// A sub-collection directory beside the index.
    Collection {
        /// Name shown to the reader.
        name: String,
        /// On-disk directory name.
        dir_name: String,
    },
    /// An external hyperlink.
    Link {
        /// Link target.
        url: String,
        /// Text shown to the reader.
        text: String,
    },
}

impl IndexEntry {
    /// Renders the entry as a single HTML list item.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::File { name, file_name } => format!(
                "<li>File: <a href=\"./{}\">{}</a></li>\n",
                escape_html(&urlencoding::encode(file_name)),
                escape_html(name)
            ),
            Self::Collection { name, dir_name } => format!(
                "<li>Collection: <a href=\"./{}/{INDEX_FILE_NAME}\">{}</a></li>\n",
                escape_html(&urlencoding::encode(dir_name)),
                escape_html(name)
            ),
            Self::Link { url, text } => format!(
                "<li>Link: <a href=\"{}\">{}</a></li>\n",
                escape_html(url),
                escape_html(text)
            ),
        }
    }
}

/// An open index document, written incrementally while its directory is
/// being exported.
#[derive(Debug)]
pub struct IndexDocument {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl IndexDocument {
    /// Creates (or truncates) `directory/index.html` and writes the opening
    /// shell. With `parent_label`, a back-link to `../index.html` follows the
    /// heading.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Filesystem`] if the file cannot be created or
    /// written.
    pub async fn create(
        directory: &Path,
        title: &str,
        parent_label: Option<&str>,
    ) -> Result<Self, OutputError> {
        let path = directory.join(INDEX_FILE_NAME);
        let file = File::create(&path)
            .await
            .map_err(|e| OutputError::filesystem(path.clone(), e))?;
        let mut document = Self {
            path,
            writer: BufWriter::new(file),
        };

        let title = escape_html(title);
        let mut shell = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );
        if let Some(parent) = parent_label {
            shell.push_str(&format!(
                "<p><a href=\"../{INDEX_FILE_NAME}\">Back to {}</a></p>\n",
                escape_html(parent)
            ));
        }
        shell.push_str("<ul>\n");
        document.write(&shell).await?;
        Ok(document)
    }

    /// Appends one list entry.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Filesystem`] if the write fails.
    pub async fn append(&mut self, entry: &IndexEntry) -> Result<(), OutputError> {
        self.write(&entry.render()).await
    }

    /// Writes the closing shell and flushes the document to disk.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Filesystem`] if the write or flush fails.
    pub async fn finish(mut self) -> Result<(), OutputError> {
        self.write("</ul>\n</body>\n</html>\n").await?;
        self.writer
            .flush()
            .await
            .map_err(|e| OutputError::filesystem(self.path.clone(), e))
    }

    /// Location of the document on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&mut self, text: &str) -> Result<(), OutputError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(|e| OutputError::filesystem(self.path.clone(), e))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_file_entry() {
        let entry = IndexEntry::File {
            name: "a.pdf".into(),
            file_name: "a.pdf".into(),
        };
        assert_eq!(
            entry.render(),
            "<li>File: <a href=\"./a.pdf\">a.pdf</a></li>\n"
        );
    }

    #[test]
    fn test_render_file_entry_encodes_href() {
        let entry = IndexEntry::File {
            name: "my notes.txt".into(),
            file_name: "my notes.txt".into(),
        };
        assert!(entry.render().contains("href=\"./my%20notes.txt\">my notes.txt</a>"));
    }

    #[test]
    fn test_render_collection_entry() {
        let entry = IndexEntry::Collection {
            name: "Week 1".into(),
            dir_name: "Week 1".into(),
        };
        assert_eq!(
            entry.render(),
            "<li>Collection: <a href=\"./Week%201/index.html\">Week 1</a></li>\n"
        );
    }

    #[test]
    fn test_render_link_entry_escapes() {
        let entry = IndexEntry::Link {
            url: "https://example.com/?a=1&b=2".into(),
            text: "<Example>".into(),
        };
        assert_eq!(
            entry.render(),
            "<li>Link: <a href=\"https://example.com/?a=1&amp;b=2\">&lt;Example&gt;</a></li>\n"
        );
    }

    #[tokio::test]
    async fn test_index_document_shell_with_back_link() {
        let dir = TempDir::new().unwrap();
        let mut doc = IndexDocument::create(dir.path(), "Week 1", Some("Library"))
            .await
            .unwrap();
        doc.append(&IndexEntry::File {
            name: "a.pdf".into(),
            file_name: "a.pdf".into(),
        })
        .await
        .unwrap();
        doc.finish().await.unwrap();

        let html = std::fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Week 1</h1>"));
        assert!(html.contains("<a href=\"../index.html\">Back to Library</a>"));
        assert!(html.contains("<a href=\"./a.pdf\">a.pdf</a>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[tokio::test]
    async fn test_index_document_root_has_no_back_link() {
        let dir = TempDir::new().unwrap();
        let doc = IndexDocument::create(dir.path(), "alice", None).await.unwrap();
        doc.finish().await.unwrap();

        let html = std::fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(!html.contains("../index.html"));
        assert!(html.contains("<ul>\n</ul>"));
    }
}
