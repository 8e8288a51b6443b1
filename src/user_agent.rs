//! User-Agent string sent by the exporter.

/// Default User-Agent for export requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_export_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("library-export/{version} (content-library-export)")
}
