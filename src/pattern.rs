//! Quad patterns for match views
//!
//! Each component is either a wildcard (`None`) or a term that the quad's
//! component must equal.

use crate::term::{Quad, Term};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadPattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
    pub graph: Option<Term>,
}

impl QuadPattern {
    /// Pattern matching every quad
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(
        subject: Option<Term>,
        predicate: Option<Term>,
        object: Option<Term>,
        graph: Option<Term>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    pub fn with_subject(mut self, term: impl Into<Term>) -> Self {
        self.subject = Some(term.into());
        self
    }

    pub fn with_predicate(mut self, term: impl Into<Term>) -> Self {
        self.predicate = Some(term.into());
        self
    }

    pub fn with_object(mut self, term: impl Into<Term>) -> Self {
        self.object = Some(term.into());
        self
    }

    pub fn with_graph(mut self, term: impl Into<Term>) -> Self {
        self.graph = Some(term.into());
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
            && self.graph.is_none()
    }

    pub fn matches(&self, quad: &Quad) -> bool {
        self.subject.as_ref().map_or(true, |t| quad.subject.matches(t))
            && self.predicate.as_ref().map_or(true, |t| match t {
                Term::NamedNode(n) => *n == quad.predicate,
                _ => false,
            })
            && self.object.as_ref().map_or(true, |t| *t == quad.object)
            && self.graph.as_ref().map_or(true, |t| quad.graph.matches(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{BlankNode, GraphName, Literal, NamedNode};

    fn quad(object: Term, graph: GraphName) -> Quad {
        Quad::new(
            BlankNode::new("b0").into(),
            NamedNode::new("http://example.org/predicate"),
            object,
            graph,
        )
    }

    #[test]
    fn test_wildcard_matches_all() {
        let pattern = QuadPattern::any();
        assert!(pattern.is_wildcard());
        assert!(pattern.matches(&quad(Term::literal("x"), GraphName::DefaultGraph)));
    }

    #[test]
    fn test_object_literal_equality() {
        let pattern = QuadPattern::new(None, None, Some(Term::literal("object1")), None);
        assert!(pattern.matches(&quad(Term::literal("object1"), GraphName::DefaultGraph)));
        assert!(!pattern.matches(&quad(Term::literal("object2"), GraphName::DefaultGraph)));
        assert!(!pattern.matches(&quad(
            Literal::lang_string("object1", "en").into(),
            GraphName::DefaultGraph
        )));
    }

    #[test]
    fn test_subject_predicate_graph_components() {
        let q = quad(
            Term::literal("x"),
            GraphName::NamedNode(NamedNode::new("http://example.org/g")),
        );

        assert!(QuadPattern::any().with_subject(BlankNode::new("b0")).matches(&q));
        assert!(!QuadPattern::any().with_subject(BlankNode::new("b1")).matches(&q));
        assert!(QuadPattern::any()
            .with_predicate(NamedNode::new("http://example.org/predicate"))
            .matches(&q));
        assert!(!QuadPattern::any()
            .with_predicate(Term::literal("http://example.org/predicate"))
            .matches(&q));
        assert!(QuadPattern::any()
            .with_graph(NamedNode::new("http://example.org/g"))
            .matches(&q));
        assert!(!QuadPattern::any().with_graph(Term::DefaultGraph).matches(&q));
    }
}
