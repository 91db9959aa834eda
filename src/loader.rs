//! Opening document sources
//!
//! A source is a local file, standard input, or an `http(s)` URL. Remote
//! bodies are streamed into the parser rather than downloaded up front.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ParseError, Result};

/// Where a JSON-LD document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Stdin,
    File(PathBuf),
    Url(String),
}

/// Check if a source string is a URL
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

impl DocumentSource {
    /// Interpret a command-line style location; `-` means standard input
    pub fn parse(location: &str) -> Self {
        if location == "-" {
            DocumentSource::Stdin
        } else if is_url(location) {
            DocumentSource::Url(location.to_string())
        } else {
            DocumentSource::File(PathBuf::from(location))
        }
    }

    /// Base IRI implied by the source itself
    ///
    /// Only remote documents have one; local files are not given a `file:`
    /// base.
    pub fn default_base(&self) -> Option<&str> {
        match self {
            DocumentSource::Url(url) => Some(url),
            DocumentSource::Stdin | DocumentSource::File(_) => None,
        }
    }

    /// Human-readable location for diagnostics
    pub fn location(&self) -> String {
        match self {
            DocumentSource::Stdin => "<stdin>".to_string(),
            DocumentSource::File(path) => path.display().to_string(),
            DocumentSource::Url(url) => url.clone(),
        }
    }

    /// Open the source for reading
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            DocumentSource::Stdin => Ok(Box::new(io::stdin().lock())),
            DocumentSource::File(path) => {
                let file = File::open(path).map_err(|e| ParseError::Load {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            DocumentSource::Url(url) => fetch_url(url),
        }
    }
}

/// Start an HTTP GET and hand back the response body as a reader
fn fetch_url(url: &str) -> Result<Box<dyn Read>> {
    debug!(url, "fetching document");
    let response = reqwest::blocking::Client::new()
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "application/ld+json, application/json;q=0.9",
        )
        .send()
        .map_err(|e| ParseError::Load {
            location: url.to_string(),
            reason: format!("HTTP request failed: {}", e),
        })?
        .error_for_status()
        .map_err(|e| ParseError::Load {
            location: url.to_string(),
            reason: format!("HTTP error status: {}", e),
        })?;
    Ok(Box::new(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(DocumentSource::parse("-"), DocumentSource::Stdin);
        assert_eq!(
            DocumentSource::parse("https://example.org/doc.jsonld"),
            DocumentSource::Url("https://example.org/doc.jsonld".into())
        );
        assert_eq!(
            DocumentSource::parse("data/doc.jsonld"),
            DocumentSource::File(PathBuf::from("data/doc.jsonld"))
        );
    }

    #[test]
    fn test_default_base() {
        let source = DocumentSource::parse("http://example.org/doc");
        assert_eq!(source.default_base(), Some("http://example.org/doc"));
        assert_eq!(DocumentSource::parse("doc.jsonld").default_base(), None);
    }

    #[test]
    fn test_missing_file() {
        let source = DocumentSource::parse("/nonexistent/doc.jsonld");
        match source.open() {
            Err(ParseError::Load { location, .. }) => {
                assert_eq!(location, "/nonexistent/doc.jsonld")
            }
            other => panic!("expected load error, got {:?}", other.map(|_| ())),
        }
    }
}
