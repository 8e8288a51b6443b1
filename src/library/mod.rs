//! Typed model of the content library's JSON nodes.
//!
//! Listing and node-detail payloads are decoded here, once, into
//! [`NodeSummary`] and [`ContentNode`]. Nothing downstream looks at the raw
//! `_mimeType` string again.
//!
//! # Example
//!
//! ```
//! use library_export_core::library::ContentNode;
//! use serde_json::json;
//!
//! let node = ContentNode::from_json(&json!({
//!     "_path": "u/a",
//!     "_mimeType": "application/pdf",
//!     "sakai:pooled-content-file-name": "a.pdf",
//! }))
//! .unwrap();
//! assert_eq!(
//!     node,
//!     ContentNode::File { name: "a.pdf".into(), path: "u/a".into() }
//! );
//! ```

mod error;
mod layout;

use serde::Deserialize;
use serde_json::{Map, Value};

pub use error::ParseError;
pub use layout::{COLLECTION_VIEWER_WIDGET, resolve_group_id};

/// Mime type of rich-text documents.
pub const MIME_DOCUMENT: &str = "x-sakai/document";
/// Mime type of collections.
pub const MIME_COLLECTION: &str = "x-sakai/collection";
/// Mime type of links.
pub const MIME_LINK: &str = "x-sakai/link";

const FIELD_PATH: &str = "_path";
const FIELD_MIME_TYPE: &str = "_mimeType";
const FIELD_FILE_NAME: &str = "sakai:pooled-content-file-name";
const FIELD_LINK_URL: &str = "sakai:pooled-content-url";

/// Handler selected for a node, decided by its mime type alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Downloadable resource (also the fallback for unknown mime types).
    File,
    /// Nested container.
    Collection,
    /// External or internal hyperlink.
    Link,
    /// Rich-text document, not exported.
    Document,
}

impl NodeKind {
    /// Classifies a node by its `_mimeType`. Unknown or absent types are files.
    #[must_use]
    pub fn from_mime_type(mime_type: Option<&str>) -> Self {
        match mime_type {
            Some(MIME_DOCUMENT) => Self::Document,
            Some(MIME_COLLECTION) => Self::Collection,
            Some(MIME_LINK) => Self::Link,
            _ => Self::File,
        }
    }
}

/// Listing entry as returned by the search endpoint.
///
/// The summary is too thin to act on; only its path is used, to fetch the
/// full node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeSummary {
    /// Canonical remote identifier.
    #[serde(rename = "_path")]
    pub path: String,
    /// Mime type, if the listing included it.
    #[serde(rename = "_mimeType", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    results: Vec<NodeSummary>,
}

/// Decodes a search endpoint response body into its result entries.
///
/// # Errors
///
/// Returns [`ParseError::InvalidJson`] when the body is not JSON, lacks a
/// `results` array, or an entry lacks `_path`.
pub fn parse_listing(body: &[u8], context: &str) -> Result<Vec<NodeSummary>, ParseError> {
    serde_json::from_slice::<SearchResults>(body)
        .map(|listing| listing.results)
        .map_err(|e| ParseError::invalid_json(context, e))
}

/// A fully decoded content node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// Downloadable binary or text resource.
    File {
        /// File name, also used as the on-disk name.
        name: String,
        /// Canonical remote identifier.
        path: String,
    },
    /// Folder-like container.
    Collection {
        /// Display name, also used as the directory name.
        name: String,
        /// Canonical remote identifier.
        path: String,
        /// Group listing the collection's members, when its layout names one.
        group_id: Option<String>,
    },
    /// Hyperlink to an external URL or to another node of this service.
    Link {
        /// Link target.
        target_url: String,
        /// Text shown in the index.
        display_name: String,
    },
    /// Rich-text document; recorded as skipped.
    Document {
        /// Canonical remote identifier.
        path: String,
    },
}

impl ContentNode {
    /// Decodes a node-detail JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the value is not an object, lacks `_path`,
    /// lacks the fields its kind requires, or is a collection with a
    /// malformed layout.
    pub fn from_json(value: &Value) -> Result<Self, ParseError> {
        let Value::Object(object) = value else {
            return Err(ParseError::missing_field("node detail", FIELD_PATH));
        };
        let path = string_field(object, FIELD_PATH, "node detail")?;
        let context = format!("node {path}");

        let node = match NodeKind::from_mime_type(object.get(FIELD_MIME_TYPE).and_then(Value::as_str)) {
            NodeKind::Document => Self::Document { path },
            NodeKind::Collection => Self::Collection {
                name: string_field(object, FIELD_FILE_NAME, &context)?,
                group_id: resolve_group_id(object, &path)?,
                path,
            },
            NodeKind::Link => {
                let target_url = string_field(object, FIELD_LINK_URL, &context)?;
                let display_name = object
                    .get(FIELD_FILE_NAME)
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map_or_else(|| target_url.clone(), ToString::to_string);
                Self::Link {
                    target_url,
                    display_name,
                }
            }
            NodeKind::File => Self::File {
                name: string_field(object, FIELD_FILE_NAME, &context)?,
                path,
            },
        };
        Ok(node)
    }

    /// Returns the handler kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File { .. } => NodeKind::File,
            Self::Collection { .. } => NodeKind::Collection,
            Self::Link { .. } => NodeKind::Link,
            Self::Document { .. } => NodeKind::Document,
        }
    }
}

fn string_field(
    object: &Map<String, Value>,
    field: &'static str,
    context: &str,
) -> Result<String, ParseError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ParseError::missing_field(context, field))
}
