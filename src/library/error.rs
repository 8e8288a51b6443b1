//! Error types for decoding content nodes.

use thiserror::Error;

/// Errors raised while decoding listing or node-detail JSON.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload was not valid JSON.
    #[error("malformed JSON in {context}: {source}")]
    InvalidJson {
        /// What was being decoded (URL or field name).
        context: String,
        /// The underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A field the API contract guarantees was absent or had the wrong type.
    #[error("missing field `{field}` in {context}")]
    MissingField {
        /// What was being decoded (URL or node path).
        context: String,
        /// The dotted field name.
        field: &'static str,
    },
}

impl ParseError {
    /// Creates an invalid JSON error.
    pub fn invalid_json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            context: context.into(),
            source,
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(context: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            context: context.into(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let error = ParseError::missing_field("node u/a", "structure0.main._ref");
        assert_eq!(
            error.to_string(),
            "missing field `structure0.main._ref` in node u/a"
        );
    }
}
