//! Streaming JSON-LD to RDF Quads
//!
//! This library reads JSON-LD documents incrementally and emits RDF quads
//! as soon as the input read so far determines them, without building a
//! document tree in memory.
//!
//! # Overview
//!
//! The input is restricted to expanded, context-free JSON-LD: property
//! names are IRIs (or relative references resolved against a base IRI) and
//! `@context` is rejected. Supported structure:
//!
//! 1. Node objects with `@id`, `@type` and properties
//! 2. Nested node objects, linked to their parent by a quad
//! 3. Value objects with `@value`, `@language` and `@type`
//! 4. Native strings, numbers and booleans
//! 5. `@graph`, both at the top level and on named nodes
//!
//! Blank node labels are kept consistent for the whole document, and nodes
//! without `@id` get fresh labels that never collide with the document's.
//!
//! # Usage
//!
//! ## Subscribe to quads
//!
//! ```ignore
//! use jsonld_quads::{JsonLdParser, ParserOptions, QuadCollector, Term};
//!
//! let mut all = QuadCollector::new();
//! let mut hits = QuadCollector::new();
//!
//! let mut parser = JsonLdParser::new(file, ParserOptions::default());
//! parser.subscribe(&mut all);
//! let view = parser.matching(None, None, Some(Term::literal("object1")), None);
//! parser.subscribe_to(view, &mut hits);
//! let summary = parser.run()?;
//! ```
//!
//! ## Pull quads
//!
//! ```ignore
//! use jsonld_quads::{ParserOptions, QuadReader};
//!
//! let options = ParserOptions::default().with_base_iri("http://example.org/");
//! for quad in QuadReader::new(file, options) {
//!     println!("{}", quad?);
//! }
//! ```

pub mod blank;
pub mod error;
pub mod iri;
pub mod loader;
pub mod parser;
pub mod pattern;
pub mod resolve;
pub mod sink;
pub mod stream;
pub mod term;
pub mod token;
pub mod vocab;
pub mod walker;

// Re-export main types for convenience
pub use crate::error::{ParseError, Result};
pub use crate::loader::DocumentSource;
pub use crate::parser::{parse_str, JsonLdParser, ParseSummary, ParserOptions, QuadReader};
pub use crate::pattern::QuadPattern;
pub use crate::sink::{from_fn, Flow, QuadCollector, QuadSink};
pub use crate::stream::{QuadStream, SubscriberId, ViewId};
pub use crate::term::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
