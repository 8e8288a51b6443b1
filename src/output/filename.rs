//! On-disk names for exported files and collection directories.

use std::path::{Component, Path};

/// Maps a remote display name to a single safe path component.
///
/// Path separators, characters Windows rejects, and control characters
/// become `_`. Names that would still be interpreted as `.`/`..` have their
/// dots replaced. An empty name becomes `_`.
#[must_use]
pub fn sanitize_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        return "_".to_string();
    }

    if is_single_normal_component(trimmed) {
        trimmed.to_string()
    } else {
        trimmed
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// What an on-disk name will hold; files keep their extension when numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A downloaded file.
    File,
    /// A collection directory.
    Directory,
}

/// Returns the `n`th alternative of an already sanitized `name`:
/// `Week (2)` for directories, `notes (2).txt` for files.
#[must_use]
pub fn numbered_component(name: &str, n: usize, kind: NameKind) -> String {
    if kind == NameKind::File {
        let path = Path::new(name);
        if let (Some(stem), Some(extension)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) {
            return format!("{stem} ({n}).{extension}");
        }
    }
    format!("{name} ({n})")
}

fn is_single_normal_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component_keeps_plain_names() {
        assert_eq!(sanitize_component("a.pdf"), "a.pdf");
        assert_eq!(sanitize_component("Week 1 readings"), "Week 1 readings");
    }

    #[test]
    fn test_sanitize_component_replaces_separators() {
        assert_eq!(sanitize_component("notes/2024\\draft.txt"), "notes_2024_draft.txt");
        assert_eq!(sanitize_component("what?.pdf"), "what_.pdf");
    }

    #[test]
    fn test_sanitize_component_blocks_traversal() {
        assert_eq!(sanitize_component(".."), "__");
        assert_eq!(sanitize_component("."), "_");
        assert_eq!(sanitize_component("../etc"), ".._etc");
    }

    #[test]
    fn test_sanitize_component_empty_name() {
        assert_eq!(sanitize_component(""), "_");
        assert_eq!(sanitize_component("   "), "_");
    }

    #[test]
    fn test_sanitize_component_control_chars() {
        assert_eq!(sanitize_component("a\u{0}b\nc"), "a_b_c");
    }

    #[test]
    fn test_numbered_component_keeps_file_extension() {
        assert_eq!(numbered_component("notes.txt", 2, NameKind::File), "notes (2).txt");
        assert_eq!(numbered_component("index.html", 2, NameKind::File), "index (2).html");
        assert_eq!(numbered_component("README", 3, NameKind::File), "README (3)");
        assert_eq!(numbered_component(".hidden", 2, NameKind::File), ".hidden (2)");
    }

    #[test]
    fn test_numbered_component_directories_append_suffix() {
        assert_eq!(numbered_component("Week", 2, NameKind::Directory), "Week (2)");
        assert_eq!(numbered_component("v1.2", 2, NameKind::Directory), "v1.2 (2)");
    }
}
