//! Collection layout decoding.
//!
//! A collection node does not list its members directly. Its `structure0`
//! field is a JSON document encoded as a string; `main._ref` names a page
//! object stored on the node itself, and the first widget placed on that page
//! (`rows[0].columns[0].elements[0]`) is the collection viewer whose own
//! configuration, stored on the page under the widget id, carries the group
//! id used to list the collection's members.

use serde_json::{Map, Value};
use tracing::debug;

use super::error::ParseError;

/// Widget type that carries a collection's member group id.
pub const COLLECTION_VIEWER_WIDGET: &str = "collectionviewer";

/// Resolves the member group id of a collection node.
///
/// Returns `Ok(None)` when the layout is well-formed but holds no collection
/// viewer widget; such a collection is exported as an empty directory.
///
/// # Errors
///
/// Returns [`ParseError`] when `structure0` or `structure0.main._ref` is
/// missing, or when `structure0` is not valid JSON.
pub fn resolve_group_id(node: &Map<String, Value>, path: &str) -> Result<Option<String>, ParseError> {
    let structure = decode_structure(node, path)?;
    let page_ref = structure
        .get("main")
        .and_then(|main| main.get("_ref"))
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::missing_field(node_context(path), "structure0.main._ref"))?;

    let Some(page) = node.get(page_ref) else {
        debug!(path, page_ref, "layout page not present on node");
        return Ok(None);
    };

    let Some(element) = page.pointer("/rows/0/columns/0/elements/0") else {
        debug!(path, page_ref, "layout page has no widgets");
        return Ok(None);
    };

    let widget_type = element.get("type").and_then(Value::as_str);
    if widget_type != Some(COLLECTION_VIEWER_WIDGET) {
        debug!(path, ?widget_type, "first widget is not a collection viewer");
        return Ok(None);
    }

    let group_id = element
        .get("id")
        .and_then(Value::as_str)
        .and_then(|widget_id| page.get(widget_id))
        .and_then(|widget| widget.get(COLLECTION_VIEWER_WIDGET))
        .and_then(|viewer| viewer.get("groupid"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    if group_id.is_none() {
        debug!(path, "collection viewer has no group id");
    }
    Ok(group_id)
}

/// `structure0` is normally a JSON-encoded string; an inline object is also accepted.
fn decode_structure(node: &Map<String, Value>, path: &str) -> Result<Value, ParseError> {
    match node.get("structure0") {
        Some(Value::String(encoded)) => serde_json::from_str(encoded)
            .map_err(|e| ParseError::invalid_json(format!("structure0 of node {path}"), e)),
        Some(inline @ Value::Object(_)) => Ok(inline.clone()),
        _ => Err(ParseError::missing_field(node_context(path), "structure0")),
    }
}

fn node_context(path: &str) -> String {
    format!("node {path}")
}
