//! Blank node label registry
//!
//! Maps document blank node labels (`_:b0`) to canonical [`BlankNode`]
//! terms for the lifetime of one parse and generates synthetic labels for
//! anonymous nodes.

use std::collections::{HashMap, HashSet};

use crate::term::BlankNode;
use crate::vocab::BLANK_NODE_PREFIX;

/// Per-parse blank node identity
///
/// Document labels keep their own text unless it was already handed out
/// as a synthetic label; in that case the document label is bound to a
/// fresh synthetic term instead, so identity within the document and
/// uniqueness of anonymous nodes both hold.
#[derive(Debug, Default)]
pub struct BlankNodeRegistry {
    /// Document label -> canonical term
    labels: HashMap<String, BlankNode>,
    /// Every label already used by some canonical term
    taken: HashSet<String>,
    counter: u64,
}

impl BlankNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a document label, with or without its `_:` prefix
    pub fn resolve(&mut self, label: &str) -> BlankNode {
        let label = label.strip_prefix(BLANK_NODE_PREFIX).unwrap_or(label);
        if let Some(node) = self.labels.get(label) {
            return node.clone();
        }

        let node = if self.taken.contains(label) {
            self.fresh()
        } else {
            self.taken.insert(label.to_string());
            BlankNode::new(label)
        };
        self.labels.insert(label.to_string(), node.clone());
        node
    }

    /// Generate a blank node that no other term of this parse uses
    pub fn fresh(&mut self) -> BlankNode {
        loop {
            let label = format!("b{}", self.counter);
            self.counter += 1;
            if self.taken.insert(label.clone()) {
                return BlankNode::new(label);
            }
        }
    }

    /// Number of distinct blank nodes handed out so far
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_idempotent() {
        let mut registry = BlankNodeRegistry::new();
        let a = registry.resolve("_:b0");
        let b = registry.resolve("_:b0");
        let c = registry.resolve("b0");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.label(), "b0");
    }

    #[test]
    fn test_fresh_skips_document_labels() {
        let mut registry = BlankNodeRegistry::new();
        let doc = registry.resolve("_:b0");
        let anon = registry.fresh();
        assert_ne!(doc, anon);
        assert_eq!(anon.label(), "b1");
    }

    #[test]
    fn test_later_document_label_does_not_reuse_synthetic() {
        let mut registry = BlankNodeRegistry::new();
        let anon = registry.fresh();
        assert_eq!(anon.label(), "b0");

        let doc = registry.resolve("_:b0");
        assert_ne!(anon, doc);
        // Still stable for repeated references
        assert_eq!(doc, registry.resolve("_:b0"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_fresh_is_unique() {
        let mut registry = BlankNodeRegistry::new();
        let labels: HashSet<String> = (0..100)
            .map(|_| registry.fresh().label().to_string())
            .collect();
        assert_eq!(labels.len(), 100);
    }
}
