//! Error types for JSON-LD to quad conversion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON syntax error at byte {offset}: {message}")]
    Syntax { offset: u64, message: String },

    #[error("Unsupported JSON-LD feature: {0}")]
    UnsupportedFeature(String),

    #[error("Cannot resolve IRI '{iri}': {reason}")]
    Resolution { iri: String, reason: String },

    #[error("Invalid JSON-LD structure: {0}")]
    InvalidStructure(String),

    #[error("Failed to load document from {location}: {reason}")]
    Load { location: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub(crate) fn syntax(offset: u64, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ParseError::InvalidStructure(message.into())
    }

    pub(crate) fn unsupported(feature: impl Into<String>) -> Self {
        ParseError::UnsupportedFeature(feature.into())
    }

    /// True for errors caused by the document itself rather than the reader
    pub fn is_document_error(&self) -> bool {
        !matches!(
            self,
            ParseError::Io(_) | ParseError::Load { .. } | ParseError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError::syntax(3, "unexpected '}'");
        assert_eq!(err.to_string(), "JSON syntax error at byte 3: unexpected '}'");

        let err = ParseError::unsupported("@context");
        assert_eq!(err.to_string(), "Unsupported JSON-LD feature: @context");
    }

    #[test]
    fn test_document_error() {
        assert!(ParseError::invalid("x").is_document_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(!ParseError::from(io).is_document_error());
    }
}
