//! URL construction for the content service's endpoints.

/// Sort field of the search listing.
pub const SORT_FIELD: &str = "_lastModified";

/// Search listing of a user's or collection's members (first page only).
#[must_use]
pub fn search_url(base_url: &str, group_id: &str, items: usize) -> String {
    format!(
        "{base_url}/var/search/pool/auth-all.json?userid={}&sortOn={SORT_FIELD}&sortOrder=desc&q=*&page=0&items={items}",
        urlencoding::encode(group_id)
    )
}

/// Full JSON detail of one node.
#[must_use]
pub fn node_detail_url(base_url: &str, path: &str) -> String {
    format!("{base_url}/p/{path}.infinity.json")
}

/// Raw body of a file node.
#[must_use]
pub fn file_url(base_url: &str, path: &str, file_name: &str) -> String {
    format!("{base_url}/p/{path}/{}", urlencoding::encode(file_name))
}

/// Extracts the content id from an internal content-view URL
/// (`{base_url}/content#p={id}`). Any other URL yields `None`.
#[must_use]
pub fn internal_link_id(base_url: &str, target_url: &str) -> Option<String> {
    let prefix = format!("{base_url}/content#p=");
    let rest = target_url.trim().strip_prefix(&prefix)?;
    let raw_id = rest
        .split(|c: char| c == '&' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    if raw_id.is_empty() {
        return None;
    }
    let id = urlencoding::decode(raw_id).map_or_else(|_| raw_id.to_string(), |id| id.into_owned());
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://library.example.edu";

    #[test]
    fn test_search_url_shape() {
        assert_eq!(
            search_url(BASE, "alice", 500),
            "https://library.example.edu/var/search/pool/auth-all.json?userid=alice&sortOn=_lastModified&sortOrder=desc&q=*&page=0&items=500"
        );
    }

    #[test]
    fn test_node_detail_url_keeps_path_segments() {
        assert_eq!(
            node_detail_url(BASE, "u/a"),
            "https://library.example.edu/p/u/a.infinity.json"
        );
    }

    #[test]
    fn test_file_url_encodes_name() {
        assert_eq!(
            file_url(BASE, "u/a", "my notes.pdf"),
            "https://library.example.edu/p/u/a/my%20notes.pdf"
        );
    }

    #[test]
    fn test_internal_link_id_matches_content_view() {
        assert_eq!(
            internal_link_id(BASE, "https://library.example.edu/content#p=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            internal_link_id(BASE, "https://library.example.edu/content#p=abc123&view=list"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_internal_link_id_rejects_other_urls() {
        assert_eq!(internal_link_id(BASE, "https://rust-lang.org/"), None);
        assert_eq!(
            internal_link_id(BASE, "https://other.example.edu/content#p=abc123"),
            None
        );
        assert_eq!(internal_link_id(BASE, "https://library.example.edu/content#p="), None);
    }
}
