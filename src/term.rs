//! RDF term and quad types
//!
//! Terms are plain values compared structurally. Each quad position has
//! its own enum so a quad can only be built from terms that are legal in
//! that position; every position converts into the general [`Term`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab::{rdf, xsd};

/// An IRI-identified resource
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedNode(String);

impl NamedNode {
    pub fn new(iri: impl AsRef<str>) -> Self {
        Self(iri.as_ref().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// An unnamed resource, scoped to one parse
///
/// The label is stored without the `_:` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankNode(String);

impl BlankNode {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().to_string())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// A literal value with language tag and datatype
///
/// `language` is empty unless the literal is language-tagged, in which
/// case the datatype is always `rdf:langString`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    language: String,
    datatype: NamedNode,
}

impl Literal {
    /// A plain `xsd:string` literal
    pub fn string(value: impl AsRef<str>) -> Self {
        Self::typed(value, NamedNode::new(xsd::STRING))
    }

    pub fn typed(value: impl AsRef<str>, datatype: NamedNode) -> Self {
        Self {
            value: value.as_ref().to_string(),
            language: String::new(),
            datatype,
        }
    }

    pub fn lang_string(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            value: value.as_ref().to_string(),
            language: language.as_ref().to_string(),
            datatype: NamedNode::new(rdf::LANG_STRING),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn datatype(&self) -> &NamedNode {
        &self.datatype
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        write_escaped(f, &self.value)?;
        f.write_str("\"")?;
        if !self.language.is_empty() {
            write!(f, "@{}", self.language)
        } else if self.datatype.as_str() != xsd::STRING {
            write!(f, "^^{}", self.datatype)
        } else {
            Ok(())
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

/// Any RDF term
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "termType", content = "value")]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    DefaultGraph,
}

impl Term {
    pub fn named(iri: impl AsRef<str>) -> Self {
        Term::NamedNode(NamedNode::new(iri))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankNode::new(label))
    }

    pub fn literal(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::string(value))
    }

    /// The term's lexical value (IRI, label, or literal text)
    pub fn value(&self) -> &str {
        match self {
            Term::NamedNode(n) => n.as_str(),
            Term::BlankNode(b) => b.label(),
            Term::Literal(l) => l.value(),
            Term::DefaultGraph => "",
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => n.fmt(f),
            Term::BlankNode(b) => b.fmt(f),
            Term::Literal(l) => l.fmt(f),
            Term::DefaultGraph => Ok(()),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(n: NamedNode) -> Self {
        Term::NamedNode(n)
    }
}

impl From<BlankNode> for Term {
    fn from(b: BlankNode) -> Self {
        Term::BlankNode(b)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

/// Terms allowed in subject position
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "termType", content = "value")]
pub enum Subject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl Subject {
    pub fn value(&self) -> &str {
        match self {
            Subject::NamedNode(n) => n.as_str(),
            Subject::BlankNode(b) => b.label(),
        }
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Subject::BlankNode(_))
    }

    /// Term equality against a general term
    pub fn matches(&self, term: &Term) -> bool {
        match (self, term) {
            (Subject::NamedNode(a), Term::NamedNode(b)) => a == b,
            (Subject::BlankNode(a), Term::BlankNode(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::NamedNode(n) => n.fmt(f),
            Subject::BlankNode(b) => b.fmt(f),
        }
    }
}

impl From<NamedNode> for Subject {
    fn from(n: NamedNode) -> Self {
        Subject::NamedNode(n)
    }
}

impl From<BlankNode> for Subject {
    fn from(b: BlankNode) -> Self {
        Subject::BlankNode(b)
    }
}

impl From<Subject> for Term {
    fn from(s: Subject) -> Self {
        match s {
            Subject::NamedNode(n) => Term::NamedNode(n),
            Subject::BlankNode(b) => Term::BlankNode(b),
        }
    }
}

/// Terms allowed in graph position
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "termType", content = "value")]
pub enum GraphName {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    #[default]
    DefaultGraph,
}

impl GraphName {
    pub fn is_default_graph(&self) -> bool {
        matches!(self, GraphName::DefaultGraph)
    }

    /// Term equality against a general term
    pub fn matches(&self, term: &Term) -> bool {
        match (self, term) {
            (GraphName::NamedNode(a), Term::NamedNode(b)) => a == b,
            (GraphName::BlankNode(a), Term::BlankNode(b)) => a == b,
            (GraphName::DefaultGraph, Term::DefaultGraph) => true,
            _ => false,
        }
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphName::NamedNode(n) => n.fmt(f),
            GraphName::BlankNode(b) => b.fmt(f),
            GraphName::DefaultGraph => Ok(()),
        }
    }
}

impl From<Subject> for GraphName {
    fn from(s: Subject) -> Self {
        match s {
            Subject::NamedNode(n) => GraphName::NamedNode(n),
            Subject::BlankNode(b) => GraphName::BlankNode(b),
        }
    }
}

impl From<GraphName> for Term {
    fn from(g: GraphName) -> Self {
        match g {
            GraphName::NamedNode(n) => Term::NamedNode(n),
            GraphName::BlankNode(b) => Term::BlankNode(b),
            GraphName::DefaultGraph => Term::DefaultGraph,
        }
    }
}

/// A subject/predicate/object/graph statement
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Subject,
    pub predicate: NamedNode,
    pub object: Term,
    pub graph: GraphName,
}

impl Quad {
    pub fn new(subject: Subject, predicate: NamedNode, object: Term, graph: GraphName) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ", self.subject, self.predicate, self.object)?;
        if !self.graph.is_default_graph() {
            write!(f, "{} ", self.graph)?;
        }
        f.write_str(".")
    }
}
