//! Term resolution rules
//!
//! Turns JSON fragments into RDF terms: member names into keywords or
//! predicates, scalars into literals, `@id`/`@type` strings into node
//! terms, and completed objects into the term they stand for.

use tracing::warn;

use crate::blank::BlankNodeRegistry;
use crate::error::{ParseError, Result};
use crate::iri::IriResolver;
use crate::term::{BlankNode, Literal, NamedNode, Subject, Term};
use crate::token::Token;
use crate::vocab::{self, xsd, BLANK_NODE_PREFIX};

/// Classification of an object member name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    Id,
    Value,
    Language,
    Type,
    Graph,
    /// Skipped together with its value
    Ignored,
    Predicate(NamedNode),
}

/// Classify a member name, rejecting keywords this reader cannot honour
pub fn classify_key(key: &str, iris: &IriResolver) -> Result<KeyKind> {
    match key {
        vocab::ID => return Ok(KeyKind::Id),
        vocab::VALUE => return Ok(KeyKind::Value),
        vocab::LANGUAGE => return Ok(KeyKind::Language),
        vocab::TYPE => return Ok(KeyKind::Type),
        vocab::GRAPH => return Ok(KeyKind::Graph),
        vocab::CONTEXT => {
            return Err(ParseError::unsupported(
                "@context (context processing is not performed)",
            ))
        }
        _ => {}
    }

    if vocab::UNSUPPORTED_KEYWORDS.contains(&key) {
        return Err(ParseError::unsupported(key));
    }
    if vocab::IGNORED_KEYWORDS.contains(&key) {
        return Ok(KeyKind::Ignored);
    }
    if is_keyword_like(key) {
        warn!(key, "ignoring unknown keyword-like member");
        return Ok(KeyKind::Ignored);
    }

    Ok(KeyKind::Predicate(iris.resolve(key)?))
}

/// `@` followed by one or more ASCII letters
fn is_keyword_like(key: &str) -> bool {
    key.strip_prefix('@')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphabetic()))
}

/// A JSON scalar in a value position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Number(String),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Extract a scalar from a token; structural tokens yield `None`
    pub fn from_token(token: Token) -> Option<Scalar> {
        match token {
            Token::String(s) => Some(Scalar::String(s)),
            Token::Number(n) => Some(Scalar::Number(n)),
            Token::Bool(b) => Some(Scalar::Bool(b)),
            Token::Null => Some(Scalar::Null),
            Token::StartObject
            | Token::EndObject
            | Token::StartArray
            | Token::EndArray
            | Token::Key(_) => None,
        }
    }

    fn lexical(&self) -> Option<String> {
        match self {
            Scalar::String(s) | Scalar::Number(s) => Some(s.clone()),
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Null => None,
        }
    }

    /// Native literal: strings, integers, doubles and booleans; `null` has none
    pub fn into_literal(self) -> Option<Literal> {
        match self {
            Scalar::String(s) => Some(Literal::string(s)),
            Scalar::Number(n) => {
                let datatype = number_datatype(&n);
                Some(Literal::typed(n, NamedNode::new(datatype)))
            }
            Scalar::Bool(b) => Some(Literal::typed(
                b.to_string(),
                NamedNode::new(xsd::BOOLEAN),
            )),
            Scalar::Null => None,
        }
    }
}

/// `xsd:integer` for plain integers, `xsd:double` for anything with a
/// fraction or exponent
pub fn number_datatype(lexical: &str) -> &'static str {
    if lexical.contains(['.', 'e', 'E']) {
        xsd::DOUBLE
    } else {
        xsd::INTEGER
    }
}

/// The keyword members of a `{"@value": ...}` object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueObject {
    pub value: Option<Scalar>,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

impl ValueObject {
    /// Build the literal; a `null` value produces no literal
    ///
    /// A language tag wins over an explicit datatype. Keyword datatypes
    /// such as `@json` are rejected.
    pub fn into_literal(self, iris: &IriResolver) -> Result<Option<Literal>> {
        if let Some(datatype) = self.datatype.as_deref().filter(|dt| dt.starts_with('@')) {
            return Err(if datatype == vocab::JSON {
                ParseError::unsupported("@json literals")
            } else {
                ParseError::unsupported(format!("keyword datatype {}", datatype))
            });
        }
        let Some(value) = self.value else {
            return Ok(None);
        };

        if let Some(language) = self.language {
            return Ok(value
                .lexical()
                .map(|lexical| Literal::lang_string(lexical, language)));
        }
        if let Some(datatype) = self.datatype {
            let datatype = iris.resolve(&datatype)?;
            return Ok(value
                .lexical()
                .map(|lexical| Literal::typed(lexical, datatype)));
        }
        Ok(value.into_literal())
    }
}

/// What a completed object in a value position stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Object with `@id`
    Identified(Subject),
    /// Object with `@value`
    Value(ValueObject),
    /// Object with neither; named by a generated blank node
    Anonymous(BlankNode),
}

impl Fragment {
    /// Resolve to an object term; `None` when nothing is to be emitted
    pub fn into_term(self, iris: &IriResolver) -> Result<Option<Term>> {
        match self {
            Fragment::Identified(subject) => Ok(Some(subject.into())),
            Fragment::Value(value) => Ok(value.into_literal(iris)?.map(Term::from)),
            Fragment::Anonymous(blank) => Ok(Some(blank.into())),
        }
    }
}

/// Resolve an `@id` (or `@type`) string to a node term
pub fn resolve_node(
    id: &str,
    blanks: &mut BlankNodeRegistry,
    iris: &IriResolver,
) -> Result<Subject> {
    if id.starts_with(BLANK_NODE_PREFIX) {
        Ok(blanks.resolve(id).into())
    } else {
        Ok(iris.resolve(id)?.into())
    }
}
