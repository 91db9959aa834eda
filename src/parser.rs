//! Public parsing entry points
//!
//! [`JsonLdParser`] pushes quads to subscribers as it reads, [`QuadReader`]
//! lets the caller pull them, and [`parse_str`] collects a whole document.
//! All three share the same engine: a [`Tokenizer`] feeding a [`Walker`],
//! one chunk of input at a time.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ParseError, Result};
use crate::iri::IriResolver;
use crate::pattern::QuadPattern;
use crate::sink::QuadSink;
use crate::stream::{QuadStream, SubscriberId, ViewId};
use crate::term::{Quad, Term};
use crate::token::{Token, Tokenizer};
use crate::walker::Walker;

const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Base IRI for relative `@id`s, property names and datatypes; empty
    /// means none
    pub base_iri: String,
    /// Bytes read from the source per step
    pub chunk_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            base_iri: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ParserOptions {
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = base_iri.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Read options from a JSON object such as `{"baseIri": "..."}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Counters for a completed parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub quads: u64,
    pub nodes: u64,
    pub blank_nodes: usize,
    pub bytes: u64,
}

struct Engine {
    tokenizer: Tokenizer,
    walker: Walker,
}

impl Engine {
    fn new(options: &ParserOptions) -> Result<Self> {
        let iris = IriResolver::new(&options.base_iri)?;
        debug!(
            base = iris.base().unwrap_or(""),
            chunk_size = options.chunk_size,
            "starting JSON-LD parse"
        );
        Ok(Self {
            tokenizer: Tokenizer::new(),
            walker: Walker::new(iris),
        })
    }

    fn feed<S: QuadSink + ?Sized>(&mut self, chunk: &[u8], sink: &mut S) -> Result<()> {
        trace!(bytes = chunk.len(), offset = self.tokenizer.offset(), "chunk");
        let Engine { tokenizer, walker } = self;
        tokenizer.feed(chunk, &mut |token: Token| walker.token(token, &mut *sink))
    }

    fn finish<S: QuadSink + ?Sized>(&mut self, sink: &mut S) -> Result<ParseSummary> {
        let Engine { tokenizer, walker } = self;
        tokenizer.finish(&mut |token: Token| walker.token(token, &mut *sink))?;
        let stats = walker.finish(tokenizer.offset())?;

        let summary = ParseSummary {
            quads: stats.quads,
            nodes: stats.nodes,
            blank_nodes: stats.blank_nodes,
            bytes: tokenizer.offset(),
        };
        debug!(
            quads = summary.quads,
            nodes = summary.nodes,
            bytes = summary.bytes,
            "finished JSON-LD parse"
        );
        Ok(summary)
    }
}

/// Read into `buf`, retrying reads interrupted by a signal
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Push-mode parser broadcasting quads to its subscribers
///
/// ```ignore
/// let mut parser = JsonLdParser::new(file, ParserOptions::default());
/// let view = parser.matching(None, None, Some(Term::literal("object1")), None);
/// parser.subscribe_to(view, &mut hits);
/// parser.run()?;
/// ```
pub struct JsonLdParser<'a, R> {
    reader: R,
    options: ParserOptions,
    stream: QuadStream<'a>,
}

impl<'a, R: Read> JsonLdParser<'a, R> {
    pub fn new(reader: R, options: ParserOptions) -> Self {
        Self {
            reader,
            options,
            stream: QuadStream::new(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Receive every quad plus the completion or error signal
    pub fn subscribe(&mut self, sink: impl QuadSink + 'a) -> SubscriberId {
        self.stream.subscribe(sink)
    }

    pub fn match_view(&mut self, pattern: QuadPattern) -> ViewId {
        self.stream.match_view(pattern)
    }

    /// Match view from optional components; `None` matches anything
    pub fn matching(
        &mut self,
        subject: Option<Term>,
        predicate: Option<Term>,
        object: Option<Term>,
        graph: Option<Term>,
    ) -> ViewId {
        self.match_view(QuadPattern::new(subject, predicate, object, graph))
    }

    pub fn subscribe_to(&mut self, view: ViewId, sink: impl QuadSink + 'a) -> Option<SubscriberId> {
        self.stream.subscribe_to(view, sink)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.stream.unsubscribe(id)
    }

    pub fn close_view(&mut self, view: ViewId) -> bool {
        self.stream.close_view(view)
    }

    /// Parse the whole source
    ///
    /// Subscribers still attached at the end get `on_end`, or `on_error`
    /// with the same error that is returned here.
    pub fn run(mut self) -> Result<ParseSummary> {
        let result = self.drive();
        match &result {
            Ok(_) => self.stream.end(),
            Err(e) => self.stream.fail(e),
        }
        result
    }

    fn drive(&mut self) -> Result<ParseSummary> {
        let mut engine = Engine::new(&self.options)?;
        let mut buf = vec![0u8; self.options.chunk_size.max(1)];
        loop {
            let n = read_chunk(&mut self.reader, &mut buf)?;
            if n == 0 {
                return engine.finish(&mut self.stream);
            }
            engine.feed(&buf[..n], &mut self.stream)?;
        }
    }
}

/// Pull-mode parser
///
/// Yields quads as each chunk of input makes them available. A failure is
/// yielded once, after the quads emitted before it; the iterator is fused
/// from then on.
pub struct QuadReader<R> {
    reader: R,
    engine: Option<Engine>,
    buf: Vec<u8>,
    queue: VecDeque<Quad>,
    error: Option<ParseError>,
    summary: Option<ParseSummary>,
}

impl<R: Read> QuadReader<R> {
    pub fn new(reader: R, options: ParserOptions) -> Self {
        let buf = vec![0u8; options.chunk_size.max(1)];
        let (engine, error) = match Engine::new(&options) {
            Ok(engine) => (Some(engine), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            reader,
            engine,
            buf,
            queue: VecDeque::new(),
            error,
            summary: None,
        }
    }

    /// Counters, available once the document has been read to the end
    pub fn summary(&self) -> Option<&ParseSummary> {
        self.summary.as_ref()
    }

    /// Advance by one chunk
    fn fill(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let step = match read_chunk(&mut self.reader, &mut self.buf) {
            Ok(0) => match engine.finish(&mut self.queue) {
                Ok(summary) => {
                    self.summary = Some(summary);
                    self.engine = None;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Ok(n) => engine.feed(&self.buf[..n], &mut self.queue),
            Err(e) => Err(e),
        };
        if let Err(e) = step {
            self.engine = None;
            self.error = Some(e);
        }
    }
}

impl<R: Read> Iterator for QuadReader<R> {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(quad) = self.queue.pop_front() {
                return Some(Ok(quad));
            }
            if let Some(e) = self.error.take() {
                return Some(Err(e));
            }
            if self.engine.is_none() {
                return None;
            }
            self.fill();
        }
    }
}

impl<R: Read> FusedIterator for QuadReader<R> {}

/// Parse a complete document held in memory
pub fn parse_str(input: &str, options: ParserOptions) -> Result<Vec<Quad>> {
    let mut quads = Vec::new();
    let mut engine = Engine::new(&options)?;
    engine.feed(input.as_bytes(), &mut quads)?;
    engine.finish(&mut quads)?;
    Ok(quads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::QuadCollector;
    use crate::term::NamedNode;

    const DOC: &str = r#"{
        "@id": "http://example.org/subject",
        "http://example.org/predicate": ["object1", "object2"]
    }"#;

    #[test]
    fn test_options_from_json() {
        let options =
            ParserOptions::from_json(r#"{"baseIri": "http://example.org/"}"#).unwrap();
        assert_eq!(options.base_iri, "http://example.org/");
        assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);

        let options = ParserOptions::from_json("{}").unwrap();
        assert_eq!(options, ParserOptions::default());
        assert!(matches!(
            ParserOptions::from_json(r#"{"chunkSize": "large"}"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_run_with_match_view() {
        let mut all = QuadCollector::new();
        let mut hits = QuadCollector::new();
        let summary = {
            let mut parser = JsonLdParser::new(DOC.as_bytes(), ParserOptions::default());
            parser.subscribe(&mut all);
            let view = parser.matching(None, None, Some(Term::literal("object1")), None);
            parser.subscribe_to(view, &mut hits).unwrap();
            parser.run().unwrap()
        };

        assert_eq!(all.len(), 2);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.quads[0].object, Term::literal("object1"));
        assert!(all.completed && hits.completed);
        assert_eq!(summary.quads, 2);
        assert_eq!(summary.bytes, DOC.len() as u64);
    }

    #[test]
    fn test_run_signals_error() {
        let mut all = QuadCollector::new();
        let result = {
            let mut parser = JsonLdParser::new(
                r#"{"@id": "http://example.org/s", "http://example.org/p": "o", "#.as_bytes(),
                ParserOptions::default().with_chunk_size(4),
            );
            parser.subscribe(&mut all);
            parser.run()
        };

        assert!(matches!(result, Err(ParseError::Syntax { .. })));
        assert_eq!(all.len(), 1);
        assert!(all.failed());
        assert!(!all.completed);
    }

    #[test]
    fn test_invalid_base_fails_run() {
        let mut all = QuadCollector::new();
        let result = {
            let mut parser =
                JsonLdParser::new(DOC.as_bytes(), ParserOptions::default().with_base_iri("::"));
            parser.subscribe(&mut all);
            parser.run()
        };
        assert!(matches!(result, Err(ParseError::Resolution { .. })));
        assert!(all.failed());
    }

    #[test]
    fn test_chunk_size_does_not_change_output() {
        let whole = parse_str(DOC, ParserOptions::default()).unwrap();
        for size in [1, 2, 7, 64] {
            let quads: Vec<Quad> =
                QuadReader::new(DOC.as_bytes(), ParserOptions::default().with_chunk_size(size))
                    .collect::<Result<_>>()
                    .unwrap();
            assert_eq!(quads, whole, "chunk size {size}");
        }
    }

    #[test]
    fn test_reader_yields_quads_before_error() {
        let doc = r#"[{"@id": "http://example.org/a", "http://example.org/p": "x"}, {"@context": {}}]"#;
        let mut reader = QuadReader::new(doc.as_bytes(), ParserOptions::default());

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.predicate, NamedNode::new("http://example.org/p"));
        assert!(matches!(
            reader.next(),
            Some(Err(ParseError::UnsupportedFeature(_)))
        ));
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert!(reader.summary().is_none());
    }

    #[test]
    fn test_reader_summary() {
        let mut reader = QuadReader::new(DOC.as_bytes(), ParserOptions::default());
        assert_eq!(reader.by_ref().count(), 2);
        let summary = reader.summary().unwrap();
        assert_eq!(summary.quads, 2);
        assert_eq!(summary.nodes, 1);
    }
}
