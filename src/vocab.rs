//! Vocabulary definitions for JSON-LD to RDF conversion
//!
//! JSON-LD keywords recognized in documents and the RDF/XSD IRIs
//! used when building literals and type statements.

/// Prefix marking a blank node identifier
pub const BLANK_NODE_PREFIX: &str = "_:";

/// Node identifier keyword
pub const ID: &str = "@id";

/// Literal value keyword
pub const VALUE: &str = "@value";

/// Language tag keyword
pub const LANGUAGE: &str = "@language";

/// Node type / literal datatype keyword
pub const TYPE: &str = "@type";

/// Named graph keyword
pub const GRAPH: &str = "@graph";

/// Context declaration keyword (not supported)
pub const CONTEXT: &str = "@context";

/// Datatype keyword for JSON literals (not supported)
pub const JSON: &str = "@json";

/// Keywords this reader recognizes but does not implement
pub const UNSUPPORTED_KEYWORDS: &[&str] = &[
    CONTEXT,
    "@list",
    "@set",
    "@reverse",
    "@included",
    "@nest",
    "@base",
    "@vocab",
    "@container",
    "@direction",
];

/// Keywords that are tolerated and skipped with their value
pub const IGNORED_KEYWORDS: &[&str] = &["@index"];

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
}

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_tables_disjoint() {
        for kw in IGNORED_KEYWORDS {
            assert!(!UNSUPPORTED_KEYWORDS.contains(kw));
        }
        for kw in [ID, VALUE, LANGUAGE, TYPE, GRAPH] {
            assert!(!UNSUPPORTED_KEYWORDS.contains(&kw));
            assert!(!IGNORED_KEYWORDS.contains(&kw));
        }
    }
}
