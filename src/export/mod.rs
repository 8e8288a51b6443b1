//! Recursive export engine.
//!
//! The [`Exporter`] lists a collection through the search endpoint, fetches
//! the full detail of every listed node, and dispatches on its kind:
//!
//! - files are downloaded beside the current index and listed in it
//! - collections get their own directory and index, and their members are
//!   exported into them recursively
//! - links to other nodes of the same service are followed as if the target
//!   had been listed directly; other links are listed in the index
//! - rich-text documents are skipped
//!
//! Traversal is depth-first and sequential: a collection is fully drained
//! before its parent continues with the next sibling.
//!
//! # Example
//!
//! ```no_run
//! use library_export_core::export::{ExportOptions, Exporter};
//! use library_export_core::fetch::{AuthenticatedFetcher, FetchOptions};
//! use library_export_core::session::{Credentials, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new("https://library.example.edu", "alice", Credentials::admin("secret"));
//! let fetcher = AuthenticatedFetcher::new(session.credentials().clone(), FetchOptions::default())?;
//! let exporter = Exporter::new(session, fetcher, "./output", ExportOptions::default());
//! let stats = exporter.process_library().await?;
//! println!("files: {}, collections: {}", stats.files(), stats.collections());
//! # Ok(())
//! # }
//! ```

mod endpoints;
mod error;
mod stats;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::StreamExt;
use reqwest::Response;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use crate::fetch::{AuthenticatedFetcher, FetchError};
use crate::library::{ContentNode, NodeSummary, ParseError, parse_listing};
use crate::output::{IndexEntry, NameKind, OutputError, OutputTree, sanitize_component};
use crate::session::Session;

pub use endpoints::{SORT_FIELD, file_url, internal_link_id, node_detail_url, search_url};
pub use error::ExportError;
pub use stats::ExportStats;

/// Items requested when listing the user's library.
pub const DEFAULT_LIBRARY_ITEMS: usize = 500;

/// Items requested when listing a collection's members.
pub const DEFAULT_COLLECTION_ITEMS: usize = 500;

/// Marker written into the user directory after a complete export.
pub const COMPLETION_MARKER: &str = ".export-complete";

/// Listing sizes for an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Page size of the top-level library listing.
    pub library_items: usize,
    /// Page size of each collection listing.
    pub collection_items: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            library_items: DEFAULT_LIBRARY_ITEMS,
            collection_items: DEFAULT_COLLECTION_ITEMS,
        }
    }
}

/// Walks a user's library and mirrors it under an output directory.
#[derive(Debug)]
pub struct Exporter {
    session: Session,
    fetcher: AuthenticatedFetcher,
    output_root: PathBuf,
    options: ExportOptions,
    tree: OutputTree,
    /// Label of the collection being exported; back-link text for its children.
    active_collection: String,
    /// Internal link ids currently being resolved, outermost first.
    alias_chain: Vec<String>,
    stats: ExportStats,
}

impl Exporter {
    /// Creates an exporter writing beneath `output_root`.
    pub fn new(
        session: Session,
        fetcher: AuthenticatedFetcher,
        output_root: impl Into<PathBuf>,
        options: ExportOptions,
    ) -> Self {
        let active_collection = session.user_id().to_string();
        Self {
            session,
            fetcher,
            output_root: output_root.into(),
            options,
            tree: OutputTree::new(),
            active_collection,
            alias_chain: Vec::new(),
            stats: ExportStats::new(),
        }
    }

    /// Directory the user's library is exported into: `{output_root}/{user_id}`.
    #[must_use]
    pub fn user_root(&self) -> PathBuf {
        self.output_root
            .join(sanitize_component(self.session.user_id()))
    }

    /// Exports the whole library of the session's user.
    ///
    /// Opens the root frame, exports the user's listing, closes the root
    /// index, and finally writes the completion marker. A marker left by a
    /// previous run is removed first, so its presence always means the last
    /// run into this directory finished.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExportError`] raised by any node; output written
    /// up to that point stays on disk without a completion marker.
    #[instrument(skip(self), fields(user_id = %self.session.user_id()))]
    pub async fn process_library(mut self) -> Result<ExportStats, ExportError> {
        let root = self.user_root();
        info!(root = %root.display(), "starting export");

        remove_stale_marker(&root).await?;
        self.tree
            .begin_root(&root, self.session.user_id())
            .await?;
        self.tree.current_frame()?.reserve(COMPLETION_MARKER);

        let user_id = self.session.user_id().to_string();
        let exported = self.export(&user_id, self.options.library_items).await;
        let closed = self.tree.end_frame().await;
        exported?;
        closed?;

        write_completion_marker(&root, &self.stats).await?;
        info!(
            files = self.stats.files(),
            bytes = self.stats.bytes(),
            collections = self.stats.collections(),
            links = self.stats.links(),
            aliases = self.stats.aliases(),
            documents_skipped = self.stats.documents_skipped(),
            "export complete"
        );
        Ok(self.stats)
    }

    /// Lists `group_id` (first page, up to `max_items`) and handles every entry in order.
    async fn export(&mut self, group_id: &str, max_items: usize) -> Result<(), ExportError> {
        let url = search_url(self.session.base_url(), group_id, max_items);
        debug!(group_id, max_items, "listing");

        let body = self.fetch_body(&url).await?;
        let entries = parse_listing(&body, &url)?;
        info!(group_id, count = entries.len(), "listed");
        if entries.len() >= max_items {
            warn!(
                group_id,
                max_items, "listing filled its only page; further items are not exported"
            );
        }

        for entry in &entries {
            self.handle_library_item(entry).await?;
        }
        Ok(())
    }

    /// Fetches a listed node's full detail and dispatches it.
    async fn handle_library_item(&mut self, summary: &NodeSummary) -> Result<(), ExportError> {
        debug!(path = %summary.path, mime_type = ?summary.mime_type, "fetching node detail");
        let node = self.fetch_node(&summary.path).await?;
        self.handle_node(node).await
    }

    async fn handle_node(&mut self, node: ContentNode) -> Result<(), ExportError> {
        debug!(kind = ?node.kind(), "dispatching node");
        match node {
            ContentNode::Document { path } => {
                info!(path = %path, "skipping document");
                self.stats.record_document_skipped();
                Ok(())
            }
            ContentNode::Collection { name, group_id, .. } => {
                self.handle_collection(name, group_id).await
            }
            ContentNode::Link {
                target_url,
                display_name,
            } => self.handle_link(target_url, display_name).await,
            ContentNode::File { name, path } => self.handle_file(&name, &path).await,
        }
    }

    async fn handle_file(&mut self, name: &str, path: &str) -> Result<(), ExportError> {
        let url = file_url(self.session.base_url(), path, name);
        let frame = self.tree.current_frame()?;
        let file_name = frame.claim_name(name, NameKind::File);
        let destination = frame.directory().join(&file_name);
        info!(url = %url, path = %destination.display(), "downloading file");

        let response = self.fetch_ok(&url).await?;
        let bytes = write_body(response, &url, &destination).await?;

        self.tree
            .current_frame()?
            .add_entry(&IndexEntry::File {
                name: name.to_string(),
                file_name,
            })
            .await?;
        self.stats.record_file(bytes);
        Ok(())
    }

    /// Exports a collection into its own frame.
    ///
    /// The frame is closed and the active label restored whether or not the
    /// members export succeeds; the parent's index only gains the collection
    /// entry on success.
    async fn handle_collection(
        &mut self,
        name: String,
        group_id: Option<String>,
    ) -> Result<(), ExportError> {
        let depth_on_entry = self.tree.depth();

        let saved_label = std::mem::replace(&mut self.active_collection, name.clone());
        let dir_name = match self.tree.begin_frame(&name, Some(&saved_label)).await {
            Ok(dir_name) => dir_name,
            Err(e) => {
                self.active_collection = saved_label;
                return Err(e.into());
            }
        };

        let body = match group_id {
            Some(group_id) => {
                info!(collection = %name, group_id = %group_id, "exporting collection");
                let items = self.options.collection_items;
                Box::pin(self.export(&group_id, items)).await
            }
            None => {
                info!(collection = %name, "collection has no member listing");
                Ok(())
            }
        };

        let closed = self.tree.end_frame().await;
        self.active_collection = saved_label;
        debug_assert_eq!(self.tree.depth(), depth_on_entry);
        body?;
        closed?;

        self.tree
            .current_frame()?
            .add_entry(&IndexEntry::Collection { name, dir_name })
            .await?;
        self.stats.record_collection();
        Ok(())
    }

    async fn handle_link(
        &mut self,
        target_url: String,
        display_name: String,
    ) -> Result<(), ExportError> {
        if let Some(id) = internal_link_id(self.session.base_url(), &target_url) {
            if self.alias_chain.contains(&id) {
                warn!(id = %id, "internal link cycle; recording as plain link");
            } else {
                debug!(id = %id, "resolving internal link");
                self.alias_chain.push(id);
                let resolved = self.resolve_alias().await;
                self.alias_chain.pop();
                resolved?;
                self.stats.record_alias();
                return Ok(());
            }
        }

        debug!(url = %target_url, "recording external link");
        self.tree
            .current_frame()?
            .add_entry(&IndexEntry::Link {
                url: target_url,
                text: display_name,
            })
            .await?;
        self.stats.record_link();
        Ok(())
    }

    /// Handles the node named by the innermost alias as if it had been listed.
    async fn resolve_alias(&mut self) -> Result<(), ExportError> {
        let Some(id) = self.alias_chain.last().cloned() else {
            return Ok(());
        };
        let node = self.fetch_node(&id).await?;
        Box::pin(self.handle_node(node)).await
    }

    async fn fetch_node(&self, path: &str) -> Result<ContentNode, ExportError> {
        let url = node_detail_url(self.session.base_url(), path);
        let body = self.fetch_body(&url).await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| ParseError::invalid_json(url.clone(), e))?;
        Ok(ContentNode::from_json(&value)?)
    }

    /// Fetches `url` and rejects non-success final statuses.
    async fn fetch_ok(&self, url: &str) -> Result<Response, FetchError> {
        let response = self.fetcher.fetch(url).await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::http_status(url, status.as_u16()))
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.fetch_ok(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        Ok(body.to_vec())
    }
}

/// Streams a response body into `destination`, replacing any existing file.
///
/// A partially written file is removed before the error is returned.
async fn write_body(
    response: Response,
    url: &str,
    destination: &Path,
) -> Result<u64, ExportError> {
    let file = File::create(destination)
        .await
        .map_err(|e| OutputError::filesystem(destination, e))?;

    let result = stream_to_file(file, response, url, destination).await;
    if result.is_err() {
        debug!(path = %destination.display(), "removing partial file after error");
        let _ = tokio::fs::remove_file(destination).await;
    }
    result
}

async fn stream_to_file(
    file: File,
    response: Response,
    url: &str,
    destination: &Path,
) -> Result<u64, ExportError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| OutputError::filesystem(destination, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| OutputError::filesystem(destination, e))?;
    Ok(bytes_written)
}

async fn remove_stale_marker(root: &Path) -> Result<(), OutputError> {
    let marker = root.join(COMPLETION_MARKER);
    match tokio::fs::remove_file(&marker).await {
        Ok(()) => {
            debug!(path = %marker.display(), "removed completion marker of previous run");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(OutputError::filesystem(marker, e)),
    }
}

async fn write_completion_marker(root: &Path, stats: &ExportStats) -> Result<(), OutputError> {
    let marker = root.join(COMPLETION_MARKER);
    let completed_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let contents = format!(
        "completed_at={completed_at}\nfiles={}\nbytes={}\ncollections={}\nlinks={}\naliases={}\ndocuments_skipped={}\n",
        stats.files(),
        stats.bytes(),
        stats.collections(),
        stats.links(),
        stats.aliases(),
        stats.documents_skipped()
    );
    tokio::fs::write(&marker, contents)
        .await
        .map_err(|e| OutputError::filesystem(marker, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::FetchOptions;
    use crate::session::Credentials;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn exporter_for(server: &MockServer, output_root: &Path) -> Exporter {
        let session = Session::new(server.uri(), "alice", Credentials::admin("pw"));
        let fetcher =
            AuthenticatedFetcher::new(session.credentials().clone(), FetchOptions::default())
                .unwrap();
        Exporter::new(session, fetcher, output_root, ExportOptions::default())
    }

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_handle_collection_unwinds_frame_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/var/search/pool/auth-all.json"))
            .and(query_param("userid", "c-broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let mut exporter = exporter_for(&server, temp.path());
        let root = exporter.user_root();
        exporter.tree.begin_root(&root, "alice").await.unwrap();

        let result = exporter
            .handle_collection("Broken".into(), Some("c-broken".into()))
            .await;

        assert!(
            matches!(result, Err(ExportError::Fetch(FetchError::HttpStatus { status: 500, .. }))),
            "unexpected result: {result:?}"
        );
        assert_eq!(exporter.tree.depth(), 1);
        assert_eq!(exporter.active_collection, "alice");
        assert_eq!(exporter.tree.current_frame().unwrap().directory(), root);
        assert!(root.join("Broken/index.html").exists());
    }

    #[tokio::test]
    async fn test_handle_collection_without_group_makes_no_listing_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/var/search/pool/auth-all.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let mut exporter = exporter_for(&server, temp.path());
        let root = exporter.user_root();
        exporter.tree.begin_root(&root, "alice").await.unwrap();

        exporter
            .handle_collection("Empty".into(), None)
            .await
            .unwrap();
        exporter.tree.end_frame().await.unwrap();

        assert_eq!(exporter.tree.depth(), 0);
        let index = std::fs::read_to_string(root.join("Empty/index.html")).unwrap();
        assert!(index.contains("<ul>\n</ul>"));
        let parent = std::fs::read_to_string(root.join("index.html")).unwrap();
        assert!(parent.contains("<a href=\"./Empty/index.html\">Empty</a>"));
        assert_eq!(exporter.stats.collections(), 1);
    }

    #[tokio::test]
    async fn test_handle_link_cycle_is_recorded_as_plain_link() {
        let server = MockServer::start().await;
        let target = format!("{}/content#p=loop1", server.uri());
        mount_json(
            &server,
            "/p/loop1.infinity.json",
            json!({
                "_path": "loop1",
                "_mimeType": "x-sakai/link",
                "sakai:pooled-content-url": target,
                "sakai:pooled-content-file-name": "Loop",
            }),
        )
        .await;

        let temp = TempDir::new().unwrap();
        let mut exporter = exporter_for(&server, temp.path());
        let root = exporter.user_root();
        exporter.tree.begin_root(&root, "alice").await.unwrap();

        exporter
            .handle_link(target.clone(), "Loop".into())
            .await
            .unwrap();
        exporter.tree.end_frame().await.unwrap();

        assert!(exporter.alias_chain.is_empty());
        assert_eq!(exporter.stats.links(), 1);
        assert_eq!(exporter.stats.aliases(), 1);
        let index = std::fs::read_to_string(root.join("index.html")).unwrap();
        assert_eq!(index.matches("Link:").count(), 1);
    }

    #[tokio::test]
    async fn test_handle_file_rejects_error_status_without_writing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/u/gone/gone.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let mut exporter = exporter_for(&server, temp.path());
        let root = exporter.user_root();
        exporter.tree.begin_root(&root, "alice").await.unwrap();

        let result = exporter.handle_file("gone.pdf", "u/gone").await;
        assert!(matches!(
            result,
            Err(ExportError::Fetch(FetchError::HttpStatus { status: 404, .. }))
        ));
        assert!(!root.join("gone.pdf").exists());
    }

    #[tokio::test]
    async fn test_handle_file_without_frame_is_empty_stack() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let mut exporter = exporter_for(&server, temp.path());

        let result = exporter.handle_file("a.pdf", "u/a").await;
        assert!(result.unwrap_err().is_empty_stack());
    }

    #[tokio::test]
    async fn test_completion_marker_records_every_counter() {
        let temp = TempDir::new().unwrap();
        let mut stats = ExportStats::new();
        stats.record_file(7);
        stats.record_collection();
        stats.record_link();
        stats.record_alias();
        stats.record_alias();
        stats.record_document_skipped();

        write_completion_marker(temp.path(), &stats).await.unwrap();

        let marker = std::fs::read_to_string(temp.path().join(COMPLETION_MARKER)).unwrap();
        for line in [
            "files=1",
            "bytes=7",
            "collections=1",
            "links=1",
            "aliases=2",
            "documents_skipped=1",
        ] {
            assert!(marker.lines().any(|l| l == line), "missing {line} in {marker}");
        }
    }
}
