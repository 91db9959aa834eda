//! IRI classification and base-IRI resolution
//!
//! Absolute IRIs pass through byte-for-byte; only relative references
//! go through RFC 3986 resolution against the configured base.

use url::Url;

use crate::error::{ParseError, Result};
use crate::term::NamedNode;

/// Returns true if the IRI starts with an RFC 3986 scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`).
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon) => {
            let scheme = &iri[..colon];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Resolves identifiers found in a document against an optional base
#[derive(Debug, Clone)]
pub struct IriResolver {
    base: Option<Url>,
}

impl IriResolver {
    /// Create a resolver; an empty base means no base is configured
    pub fn new(base: &str) -> Result<Self> {
        if base.is_empty() {
            return Ok(Self { base: None });
        }
        let url = Url::parse(base).map_err(|e| ParseError::Resolution {
            iri: base.to_string(),
            reason: format!("invalid base IRI: {}", e),
        })?;
        Ok(Self { base: Some(url) })
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_ref().map(|u| u.as_str())
    }

    /// Resolve a (possibly relative) reference to an absolute named node
    pub fn resolve(&self, reference: &str) -> Result<NamedNode> {
        if is_absolute(reference) {
            return Ok(NamedNode::new(reference));
        }

        let base = self.base.as_ref().ok_or_else(|| ParseError::Resolution {
            iri: reference.to_string(),
            reason: "relative IRI without a base IRI".to_string(),
        })?;

        let joined = base.join(reference).map_err(|e| ParseError::Resolution {
            iri: reference.to_string(),
            reason: e.to_string(),
        })?;
        Ok(NamedNode::new(joined.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("http://example.org"));
        assert!(is_absolute("urn:isbn:0451450523"));
        assert!(is_absolute("did:example:123"));
        assert!(is_absolute("mailto:user@example.com"));
        assert!(!is_absolute("subject"));
        assert!(!is_absolute("./data.csv"));
        assert!(!is_absolute("#frag"));
        assert!(!is_absolute("_:b0"));
        assert!(!is_absolute("1abc:x"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_relative_against_base() {
        let resolver = IriResolver::new("http://example.org/").unwrap();
        assert_eq!(
            resolver.resolve("subject").unwrap().as_str(),
            "http://example.org/subject"
        );
        assert_eq!(
            resolver.resolve("#frag").unwrap().as_str(),
            "http://example.org/#frag"
        );

        let resolver = IriResolver::new("http://example.org/a/b").unwrap();
        assert_eq!(
            resolver.resolve("../c").unwrap().as_str(),
            "http://example.org/c"
        );
    }

    #[test]
    fn test_absolute_passes_through_unchanged() {
        let resolver = IriResolver::new("http://example.org/").unwrap();
        assert_eq!(
            resolver.resolve("HTTP://Example.ORG/x").unwrap().as_str(),
            "HTTP://Example.ORG/x"
        );

        let resolver = IriResolver::new("").unwrap();
        assert_eq!(
            resolver.resolve("http://example.org/s").unwrap().as_str(),
            "http://example.org/s"
        );
    }

    #[test]
    fn test_relative_without_base_fails() {
        let resolver = IriResolver::new("").unwrap();
        assert!(resolver.base().is_none());
        assert!(matches!(
            resolver.resolve("subject"),
            Err(ParseError::Resolution { .. })
        ));
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            IriResolver::new("not a base"),
            Err(ParseError::Resolution { .. })
        ));
    }
}
