//! Tree walker and quad emitter
//!
//! Consumes tokens one at a time and keeps a stack of open frames. Each
//! JSON object gets a subject *slot* when it opens; the slot is filled
//! when its `@id` arrives, or with a fresh blank node when the object
//! closes without one. Graph positions are slots too, so a `@graph` whose
//! enclosing `@id` has not been read yet can still be traversed.
//!
//! A quad is handed to the sink the moment both its subject slot and its
//! graph slot are filled. Until then it waits in `pending`, filed under one
//! empty slot it depends on; filling a slot only revisits the quads filed
//! under it. Quads of unrelated nodes never wait on each other.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::blank::BlankNodeRegistry;
use crate::error::{ParseError, Result};
use crate::iri::IriResolver;
use crate::resolve::{self, classify_key, Fragment, KeyKind, Scalar, ValueObject};
use crate::sink::{Flow, QuadSink};
use crate::term::{GraphName, NamedNode, Quad, Subject, Term};
use crate::token::Token;
use crate::vocab::{self, rdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId(usize);

/// Slot 0 always holds the default graph
const DEFAULT_GRAPH: SlotId = SlotId(0);

#[derive(Debug, Clone)]
enum Slot {
    Empty,
    Node(Subject),
    DefaultGraph,
}

#[derive(Debug)]
struct PendingQuad {
    subject: SlotId,
    predicate: NamedNode,
    object: Term,
    graph: SlotId,
}

/// Where the terms found in a value position are attached
#[derive(Debug, Clone)]
struct Link {
    subject: SlotId,
    predicate: NamedNode,
    graph: SlotId,
}

/// What the next token inside a node object means
#[derive(Debug, Clone, Default)]
enum Expect {
    #[default]
    Key,
    Id,
    Value,
    Language,
    Type,
    Graph,
    Property(NamedNode),
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    /// Only ambiguous keywords (`@type`, `@language`) seen so far
    Undecided,
    Node,
    Value,
}

/// One open JSON object
#[derive(Debug)]
struct NodeFrame {
    subject: SlotId,
    graph: SlotId,
    /// Graph of this node's `@graph` members, allocated on first use
    member_graph: Option<SlotId>,
    /// Attachment to the enclosing property, if any
    link: Option<Link>,
    top_level: bool,
    expect: Expect,
    kind: NodeKind,
    has_id: bool,
    has_properties: bool,
    /// `@type` values read before the object's kind was known
    types: Vec<String>,
    value: ValueObject,
}

impl NodeFrame {
    fn new(subject: SlotId, graph: SlotId, link: Option<Link>, top_level: bool) -> Self {
        Self {
            subject,
            graph,
            member_graph: None,
            link,
            top_level,
            expect: Expect::Key,
            kind: NodeKind::Undecided,
            has_id: false,
            has_properties: false,
            types: Vec::new(),
            value: ValueObject::default(),
        }
    }
}

#[derive(Debug)]
enum Frame {
    Node(NodeFrame),
    /// Array under a predicate
    Values(Link),
    /// Array of node objects sharing one graph
    Members { graph: SlotId, top_level: bool },
    /// Array under a node's `@type`
    Types,
    /// Nesting depth inside an ignored value
    Skip(usize),
}

/// Counters reported once a parse completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub quads: u64,
    pub nodes: u64,
    pub blank_nodes: usize,
}

/// Per-parse traversal state
#[derive(Debug)]
pub struct Walker {
    iris: IriResolver,
    blanks: BlankNodeRegistry,
    frames: Vec<Frame>,
    slots: Vec<Slot>,
    /// Waiting quads keyed by an empty slot they depend on
    pending: HashMap<SlotId, Vec<PendingQuad>>,
    root_seen: bool,
    /// Set once the sink asked to stop receiving quads
    detached: bool,
    quads: u64,
    nodes: u64,
}

impl Walker {
    pub fn new(iris: IriResolver) -> Self {
        Self {
            iris,
            blanks: BlankNodeRegistry::new(),
            frames: Vec::new(),
            slots: vec![Slot::DefaultGraph],
            pending: HashMap::new(),
            root_seen: false,
            detached: false,
            quads: 0,
            nodes: 0,
        }
    }

    /// Process one token, emitting every quad it completes
    pub fn token<S: QuadSink + ?Sized>(&mut self, token: Token, sink: &mut S) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return self.root(token);
        };
        match frame {
            Frame::Node(node) => self.node_token(node, token, sink),
            Frame::Values(link) => self.values_token(link, token, sink),
            Frame::Members { graph, top_level } => self.members_token(graph, top_level, token),
            Frame::Types => self.types_token(token, sink),
            Frame::Skip(depth) => self.skip_token(depth, token),
        }
    }

    /// Check that the document was closed and report counters
    ///
    /// `offset` is the number of input bytes consumed, used to locate an
    /// unexpected end of input.
    pub fn finish(&self, offset: u64) -> Result<WalkStats> {
        if !self.root_seen || !self.frames.is_empty() {
            return Err(ParseError::syntax(offset, "unexpected end of input"));
        }
        debug_assert!(self.pending.is_empty(), "quads left waiting on empty slots");
        Ok(WalkStats {
            quads: self.quads,
            nodes: self.nodes,
            blank_nodes: self.blanks.len(),
        })
    }

    fn root(&mut self, token: Token) -> Result<()> {
        if self.root_seen {
            return Err(ParseError::invalid("more than one top-level value"));
        }
        self.root_seen = true;
        match token {
            Token::StartObject => {
                let subject = self.new_slot();
                self.frames.push(Frame::Node(NodeFrame::new(
                    subject,
                    DEFAULT_GRAPH,
                    None,
                    true,
                )));
                Ok(())
            }
            Token::StartArray => {
                self.frames.push(Frame::Members {
                    graph: DEFAULT_GRAPH,
                    top_level: true,
                });
                Ok(())
            }
            _ => Err(ParseError::invalid(
                "top-level value must be an object or an array",
            )),
        }
    }

    fn node_token<S: QuadSink + ?Sized>(
        &mut self,
        mut node: NodeFrame,
        token: Token,
        sink: &mut S,
    ) -> Result<()> {
        match (std::mem::take(&mut node.expect), token) {
            (Expect::Key, Token::Key(key)) => {
                node.expect = self.classify(&mut node, &key, sink)?;
                self.frames.push(Frame::Node(node));
                Ok(())
            }
            (Expect::Key, Token::EndObject) => self.close_node(node, sink),
            (Expect::Key, _) => Err(ParseError::invalid("expected an object member")),

            (Expect::Id, Token::String(id)) => {
                let subject = resolve::resolve_node(&id, &mut self.blanks, &self.iris)?;
                self.fill(node.subject, Slot::Node(subject.clone()), sink)?;
                if let Some(graph) = node.member_graph.filter(|g| *g != node.subject) {
                    self.fill(graph, Slot::Node(subject), sink)?;
                }
                self.frames.push(Frame::Node(node));
                Ok(())
            }
            (Expect::Id, _) => Err(ParseError::invalid("@id must be a string")),

            (Expect::Value, token) => match Scalar::from_token(token) {
                Some(scalar) => {
                    node.value.value = Some(scalar);
                    self.frames.push(Frame::Node(node));
                    Ok(())
                }
                None => Err(ParseError::unsupported(
                    "non-scalar @value (JSON literals)",
                )),
            },

            (Expect::Language, Token::String(language)) => {
                if node.kind == NodeKind::Node {
                    return Err(ParseError::invalid(
                        "@language is only allowed in value objects",
                    ));
                }
                node.value.language = Some(language);
                self.frames.push(Frame::Node(node));
                Ok(())
            }
            (Expect::Language, _) => Err(ParseError::invalid("@language must be a string")),

            (Expect::Type, Token::String(ty)) => {
                self.add_type(&mut node, ty, sink)?;
                self.frames.push(Frame::Node(node));
                Ok(())
            }
            (Expect::Type, Token::StartArray) => {
                self.frames.push(Frame::Node(node));
                self.frames.push(Frame::Types);
                Ok(())
            }
            (Expect::Type, _) => Err(ParseError::invalid(
                "@type must be a string or an array of strings",
            )),

            (Expect::Graph, token) => {
                let graph = self.member_graph(&mut node);
                self.frames.push(Frame::Node(node));
                match token {
                    Token::StartObject => {
                        self.open_node(graph, None, false);
                        Ok(())
                    }
                    Token::StartArray => {
                        self.frames.push(Frame::Members {
                            graph,
                            top_level: false,
                        });
                        Ok(())
                    }
                    Token::Null => Ok(()),
                    _ => Err(ParseError::invalid(
                        "@graph must be a node object or an array of node objects",
                    )),
                }
            }

            (Expect::Property(predicate), token) => {
                let link = Link {
                    subject: node.subject,
                    predicate,
                    graph: node.graph,
                };
                self.frames.push(Frame::Node(node));
                self.value_in(link, token, sink)
            }

            (Expect::Ignore, token) => {
                self.frames.push(Frame::Node(node));
                if matches!(token, Token::StartObject | Token::StartArray) {
                    self.frames.push(Frame::Skip(1));
                }
                Ok(())
            }
        }
    }

    fn classify<S: QuadSink + ?Sized>(
        &mut self,
        node: &mut NodeFrame,
        key: &str,
        sink: &mut S,
    ) -> Result<Expect> {
        let expect = match classify_key(key, &self.iris)? {
            KeyKind::Id => {
                if node.has_id {
                    return Err(ParseError::invalid("duplicate @id member"));
                }
                self.mark_node(node, sink)?;
                node.has_id = true;
                Expect::Id
            }
            KeyKind::Value => {
                self.mark_value(node)?;
                Expect::Value
            }
            KeyKind::Language => Expect::Language,
            KeyKind::Type => Expect::Type,
            KeyKind::Graph => {
                self.mark_node(node, sink)?;
                Expect::Graph
            }
            KeyKind::Ignored => Expect::Ignore,
            KeyKind::Predicate(predicate) => {
                self.mark_node(node, sink)?;
                node.has_properties = true;
                Expect::Property(predicate)
            }
        };
        Ok(expect)
    }

    /// Settle the object as a node; buffered types become `rdf:type` quads
    fn mark_node<S: QuadSink + ?Sized>(&mut self, node: &mut NodeFrame, sink: &mut S) -> Result<()> {
        match node.kind {
            NodeKind::Node => Ok(()),
            NodeKind::Value => Err(ParseError::invalid(
                "a value object cannot carry @id, @graph or properties",
            )),
            NodeKind::Undecided => {
                if node.value.language.is_some() {
                    return Err(ParseError::invalid(
                        "@language is only allowed in value objects",
                    ));
                }
                node.kind = NodeKind::Node;
                for ty in std::mem::take(&mut node.types) {
                    self.emit_type(node, &ty, sink)?;
                }
                Ok(())
            }
        }
    }

    /// Settle the object as a `@value` leaf
    fn mark_value(&mut self, node: &mut NodeFrame) -> Result<()> {
        match node.kind {
            NodeKind::Value => Err(ParseError::invalid("duplicate @value member")),
            NodeKind::Node => Err(ParseError::invalid(
                "a value object cannot carry @id, @graph or properties",
            )),
            NodeKind::Undecided => {
                if node.link.is_none() {
                    return Err(ParseError::invalid(
                        "a value object must be the value of a property",
                    ));
                }
                node.kind = NodeKind::Value;
                let types = std::mem::take(&mut node.types);
                for ty in types {
                    Self::set_datatype(node, ty)?;
                }
                Ok(())
            }
        }
    }

    fn set_datatype(node: &mut NodeFrame, ty: String) -> Result<()> {
        if node.value.datatype.is_some() {
            return Err(ParseError::invalid(
                "@type of a value object must be a single IRI",
            ));
        }
        node.value.datatype = Some(ty);
        Ok(())
    }

    fn add_type<S: QuadSink + ?Sized>(
        &mut self,
        node: &mut NodeFrame,
        ty: String,
        sink: &mut S,
    ) -> Result<()> {
        match node.kind {
            NodeKind::Undecided => {
                node.types.push(ty);
                Ok(())
            }
            NodeKind::Node => self.emit_type(node, &ty, sink),
            NodeKind::Value => Self::set_datatype(node, ty),
        }
    }

    fn emit_type<S: QuadSink + ?Sized>(&mut self, node: &mut NodeFrame, ty: &str, sink: &mut S) -> Result<()> {
        node.has_properties = true;
        let object = resolve::resolve_node(ty, &mut self.blanks, &self.iris)?;
        self.queue(
            node.subject,
            NamedNode::new(rdf::TYPE),
            object.into(),
            node.graph,
            sink,
        )
    }

    /// Graph slot for the node's `@graph` members
    fn member_graph(&mut self, node: &mut NodeFrame) -> SlotId {
        if let Some(graph) = node.member_graph {
            return graph;
        }
        let graph = if self.is_filled(node.subject) {
            node.subject
        } else {
            self.new_slot()
        };
        node.member_graph = Some(graph);
        graph
    }

    fn open_node(&mut self, graph: SlotId, link: Option<Link>, top_level: bool) {
        let subject = self.new_slot();
        self.frames
            .push(Frame::Node(NodeFrame::new(subject, graph, link, top_level)));
    }

    fn close_node<S: QuadSink + ?Sized>(&mut self, mut node: NodeFrame, sink: &mut S) -> Result<()> {
        let fragment = match node.kind {
            NodeKind::Value => Fragment::Value(std::mem::take(&mut node.value)),
            NodeKind::Undecided | NodeKind::Node => {
                self.mark_node(&mut node, sink)?;
                self.nodes += 1;
                let fragment = match self.subject(node.subject) {
                    Some(subject) => Fragment::Identified(subject),
                    None => {
                        let blank = self.blanks.fresh();
                        self.fill(node.subject, Slot::Node(blank.clone().into()), sink)?;
                        Fragment::Anonymous(blank)
                    }
                };
                if let Some(graph) = node.member_graph.filter(|g| !self.is_filled(*g)) {
                    // A bare top-level {"@graph": ...} describes the default graph
                    let slot = if node.top_level && !node.has_id && !node.has_properties {
                        Slot::DefaultGraph
                    } else {
                        self.slots[node.subject.0].clone()
                    };
                    self.fill(graph, slot, sink)?;
                }
                fragment
            }
        };

        let Some(link) = node.link else {
            return Ok(());
        };
        match fragment.into_term(&self.iris)? {
            Some(object) => self.queue(link.subject, link.predicate, object, link.graph, sink),
            None => Ok(()),
        }
    }

    /// A token in a predicate's value position
    fn value_in<S: QuadSink + ?Sized>(&mut self, link: Link, token: Token, sink: &mut S) -> Result<()> {
        match token {
            Token::StartObject => {
                let graph = link.graph;
                self.open_node(graph, Some(link), false);
                Ok(())
            }
            Token::StartArray => {
                self.frames.push(Frame::Values(link));
                Ok(())
            }
            token => match Scalar::from_token(token).and_then(Scalar::into_literal) {
                Some(literal) => {
                    self.queue(link.subject, link.predicate, literal.into(), link.graph, sink)
                }
                None => Ok(()),
            },
        }
    }

    fn values_token<S: QuadSink + ?Sized>(&mut self, link: Link, token: Token, sink: &mut S) -> Result<()> {
        if token == Token::EndArray {
            return Ok(());
        }
        self.frames.push(Frame::Values(link.clone()));
        self.value_in(link, token, sink)
    }

    fn members_token(&mut self, graph: SlotId, top_level: bool, token: Token) -> Result<()> {
        match token {
            Token::EndArray => Ok(()),
            Token::StartObject => {
                self.frames.push(Frame::Members { graph, top_level });
                self.open_node(graph, None, top_level);
                Ok(())
            }
            Token::StartArray => {
                self.frames.push(Frame::Members { graph, top_level });
                self.frames.push(Frame::Members { graph, top_level });
                Ok(())
            }
            Token::Null => {
                self.frames.push(Frame::Members { graph, top_level });
                Ok(())
            }
            _ => Err(ParseError::invalid("@graph members must be node objects")),
        }
    }

    fn types_token<S: QuadSink + ?Sized>(&mut self, token: Token, sink: &mut S) -> Result<()> {
        match token {
            Token::EndArray => Ok(()),
            Token::String(ty) => {
                let Some(Frame::Node(mut node)) = self.frames.pop() else {
                    return Err(ParseError::invalid("@type array outside of an object"));
                };
                self.add_type(&mut node, ty, sink)?;
                self.frames.push(Frame::Node(node));
                self.frames.push(Frame::Types);
                Ok(())
            }
            _ => Err(ParseError::invalid("@type values must be strings")),
        }
    }

    /// Ignored values are not interpreted, but unsupported keywords are
    /// still rejected wherever they appear
    fn skip_token(&mut self, depth: usize, token: Token) -> Result<()> {
        match token {
            Token::StartObject | Token::StartArray => self.frames.push(Frame::Skip(depth + 1)),
            Token::EndObject | Token::EndArray if depth == 1 => {}
            Token::EndObject | Token::EndArray => self.frames.push(Frame::Skip(depth - 1)),
            Token::Key(key) if vocab::UNSUPPORTED_KEYWORDS.contains(&key.as_str()) => {
                return Err(ParseError::unsupported(key));
            }
            _ => self.frames.push(Frame::Skip(depth)),
        }
        Ok(())
    }

    fn new_slot(&mut self) -> SlotId {
        self.slots.push(Slot::Empty);
        SlotId(self.slots.len() - 1)
    }

    fn is_filled(&self, slot: SlotId) -> bool {
        !matches!(self.slots[slot.0], Slot::Empty)
    }

    fn subject(&self, slot: SlotId) -> Option<Subject> {
        match &self.slots[slot.0] {
            Slot::Node(subject) => Some(subject.clone()),
            Slot::Empty | Slot::DefaultGraph => None,
        }
    }

    fn graph(&self, slot: SlotId) -> Option<GraphName> {
        match &self.slots[slot.0] {
            Slot::Node(subject) => Some(subject.clone().into()),
            Slot::DefaultGraph => Some(GraphName::DefaultGraph),
            Slot::Empty => None,
        }
    }

    /// Fill a slot and release the quads that were waiting on it
    fn fill<S: QuadSink + ?Sized>(&mut self, slot: SlotId, value: Slot, sink: &mut S) -> Result<()> {
        self.slots[slot.0] = value;
        let Some(waiting) = self.pending.remove(&slot) else {
            return Ok(());
        };
        for quad in waiting {
            self.release(quad, sink);
        }
        Ok(())
    }

    /// Emit a waiting quad, or file it under the slot it still needs
    fn release<S: QuadSink + ?Sized>(&mut self, quad: PendingQuad, sink: &mut S) {
        match (self.subject(quad.subject), self.graph(quad.graph)) {
            (Some(subject), Some(graph)) => {
                self.emit(Quad::new(subject, quad.predicate, quad.object, graph), sink)
            }
            (None, _) => self.pending.entry(quad.subject).or_default().push(quad),
            (Some(_), None) => self.pending.entry(quad.graph).or_default().push(quad),
        }
    }

    fn queue<S: QuadSink + ?Sized>(
        &mut self,
        subject: SlotId,
        predicate: NamedNode,
        object: Term,
        graph: SlotId,
        sink: &mut S,
    ) -> Result<()> {
        let quad = PendingQuad {
            subject,
            predicate,
            object,
            graph,
        };
        self.release(quad, sink);
        Ok(())
    }

    /// Deliver a quad; after a detach the walk continues but the sink is
    /// no longer called
    fn emit<S: QuadSink + ?Sized>(&mut self, quad: Quad, sink: &mut S) {
        self.quads += 1;
        trace!(quad = %quad, "emit");
        if self.detached {
            return;
        }
        if sink.on_quad(&quad) == Flow::Detach {
            debug!(emitted = self.quads, "sink detached from walker");
            self.detached = true;
        }
    }
}
