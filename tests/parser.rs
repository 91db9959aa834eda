use std::cell::Cell;
use std::io::Read;
use std::rc::Rc;

use serde_json::{json, Value};

use jsonld_quads::{
    from_fn, parse_str, Flow, GraphName, JsonLdParser, ParseError, ParserOptions, Quad,
    QuadCollector, QuadReader, Term,
};

fn parse(doc: Value) -> Vec<Quad> {
    parse_str(&doc.to_string(), ParserOptions::default()).unwrap()
}

fn parse_err(doc: &str) -> ParseError {
    parse_str(doc, ParserOptions::default()).unwrap_err()
}

#[test]
fn test_named_node_subject() {
    let quads = parse(json!({
        "@id": "http://example.org/subject",
        "http://example.org/predicate": "object"
    }));
    assert_eq!(quads.len(), 1);
    assert!(!quads[0].subject.is_blank_node());
    assert_eq!(quads[0].subject.value(), "http://example.org/subject");
}

#[test]
fn test_blank_node_subject() {
    let quads = parse(json!({"http://example.org/predicate": "object"}));
    assert_eq!(quads.len(), 1);
    assert!(quads[0].subject.is_blank_node());
}

#[test]
fn test_predicate() {
    let quads = parse(json!({"http://example.org/predicate": "object"}));
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0].predicate.as_str(), "http://example.org/predicate");
}

#[test]
fn test_named_node_object() {
    let quads = parse(json!({
        "http://example.org/predicate": {"@id": "http://example.org/object"}
    }));
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0].object, Term::named("http://example.org/object"));
}

#[test]
fn test_blank_node_object() {
    let quads = parse(json!({"http://example.org/predicate": {}}));
    assert_eq!(quads.len(), 1);
    assert!(quads[0].object.is_blank_node());
}

#[test]
fn test_blank_node_labels_are_consistent() {
    let quads = parse(json!({
        "http://example.org/predicate1": {"@id": "_:b0"},
        "http://example.org/predicate2": {"@id": "_:b0"}
    }));
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[0].object, quads[1].object);
    // The subject has no @id and must not be confused with _:b0
    assert!(!quads[0].subject.matches(&quads[0].object));
}

#[test]
fn test_literal_object() {
    let quads = parse(json!({"http://example.org/predicate": {"@value": "object"}}));
    assert_eq!(quads.len(), 1);
    let literal = quads[0].object.as_literal().unwrap();
    assert_eq!(literal.value(), "object");
    assert_eq!(literal.language(), "");
    assert_eq!(
        literal.datatype().as_str(),
        "http://www.w3.org/2001/XMLSchema#string"
    );
}

#[test]
fn test_literal_language() {
    let quads = parse(json!({
        "http://example.org/predicate": {"@value": "object", "@language": "en"}
    }));
    assert_eq!(quads.len(), 1);
    let literal = quads[0].object.as_literal().unwrap();
    assert_eq!(literal.value(), "object");
    assert_eq!(literal.language(), "en");
    assert_eq!(
        literal.datatype().as_str(),
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString"
    );
}

#[test]
fn test_literal_datatype() {
    let quads = parse(json!({
        "http://example.org/predicate": {
            "@value": "object",
            "@type": "http://example.org/datatype"
        }
    }));
    assert_eq!(quads.len(), 1);
    let literal = quads[0].object.as_literal().unwrap();
    assert_eq!(literal.value(), "object");
    assert_eq!(literal.language(), "");
    assert_eq!(literal.datatype().as_str(), "http://example.org/datatype");
}

#[test]
fn test_default_graph() {
    let quads = parse(json!({"http://example.org/predicate": "object"}));
    assert_eq!(quads[0].graph, GraphName::DefaultGraph);
}

#[test]
fn test_named_graph() {
    let quads = parse(json!({
        "@id": "http://example.org/graph",
        "@graph": {"http://example.org/predicate": "object"}
    }));
    assert_eq!(quads.len(), 1);
    assert!(quads[0]
        .graph
        .matches(&Term::named("http://example.org/graph")));
}

#[test]
fn test_match_view() {
    let doc = json!({"http://example.org/predicate": ["object1", "object2"]}).to_string();
    let mut hits = QuadCollector::new();
    {
        let mut parser = JsonLdParser::new(doc.as_bytes(), ParserOptions::default());
        let view = parser.matching(None, None, Some(Term::literal("object1")), None);
        parser.subscribe_to(view, &mut hits).unwrap();
        parser.run().unwrap();
    }
    assert_eq!(hits.len(), 1);
    assert_eq!(hits.quads[0].object, Term::literal("object1"));
    assert!(hits.completed);
}

#[test]
fn test_base_iri_option() {
    let doc = json!({
        "@id": "subject",
        "http://example.org/predicate": "object"
    });
    let quads = parse_str(
        &doc.to_string(),
        ParserOptions::default().with_base_iri("http://example.org/"),
    )
    .unwrap();
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0].subject.value(), "http://example.org/subject");
}

#[test]
fn test_relative_id_without_base() {
    let err = parse_err(r#"{"@id": "subject", "http://example.org/predicate": "object"}"#);
    assert!(matches!(err, ParseError::Resolution { .. }));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(parse_err("{"), ParseError::Syntax { .. }));
    assert!(matches!(parse_err(""), ParseError::Syntax { .. }));
}

#[test]
fn test_context_is_rejected() {
    let mut all = QuadCollector::new();
    let result = {
        let mut parser = JsonLdParser::new(
            r#"{"@context": "object"}"#.as_bytes(),
            ParserOptions::default(),
        );
        parser.subscribe(&mut all);
        parser.run()
    };
    assert!(matches!(result, Err(ParseError::UnsupportedFeature(_))));
    assert!(all.failed());
    assert!(all.is_empty());
}

/// Reader that hands out at most `step` bytes per call and records progress
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
    consumed: Rc<Cell<usize>>,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.consumed.set(self.pos);
        Ok(n)
    }
}

#[test]
fn test_quads_emitted_before_document_ends() {
    let mut nodes = Vec::new();
    for i in 0..50 {
        nodes.push(json!({
            "@id": format!("http://example.org/node{i}"),
            "http://example.org/value": i
        }));
    }
    let doc = Value::Array(nodes).to_string();
    let total = doc.len();

    let consumed = Rc::new(Cell::new(0));
    let first_seen_at = Rc::new(Cell::new(None));
    let reader = Trickle {
        data: doc.into_bytes(),
        pos: 0,
        step: 16,
        consumed: consumed.clone(),
    };

    let summary = {
        let mut parser = JsonLdParser::new(reader, ParserOptions::default().with_chunk_size(16));
        let seen = first_seen_at.clone();
        parser.subscribe(from_fn(move |_quad: &Quad| {
            if seen.get().is_none() {
                seen.set(Some(consumed.get()));
            }
            Flow::Continue
        }));
        parser.run().unwrap()
    };

    assert_eq!(summary.quads, 50);
    let first = first_seen_at.get().unwrap();
    assert!(first < total / 10, "first quad after {first} of {total} bytes");
}

#[test]
fn test_detached_subscriber_does_not_stop_parse() {
    let doc = json!({
        "http://example.org/predicate": ["a", "b", "c", "d"]
    })
    .to_string();

    let mut received = 0;
    let mut all = QuadCollector::new();
    let summary = {
        let mut parser = JsonLdParser::new(doc.as_bytes(), ParserOptions::default());
        parser.subscribe(from_fn(|_quad: &Quad| {
            received += 1;
            if received == 2 {
                Flow::Detach
            } else {
                Flow::Continue
            }
        }));
        parser.subscribe(&mut all);
        parser.run().unwrap()
    };

    assert_eq!(received, 2);
    assert_eq!(all.len(), 4);
    assert!(all.completed);
    assert_eq!(summary.quads, 4);
}

#[test]
fn test_reader_matches_push_output() {
    let doc = json!({
        "@id": "http://example.org/graph",
        "@graph": [
            {"@id": "_:a", "http://example.org/knows": {"@id": "_:b"}},
            {"http://example.org/name": {"@value": "b", "@language": "en"}}
        ],
        "@type": "http://example.org/Graph"
    })
    .to_string();

    let pushed = parse_str(&doc, ParserOptions::default()).unwrap();
    let pulled: Vec<Quad> = QuadReader::new(doc.as_bytes(), ParserOptions::default().with_chunk_size(3))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(pushed, pulled);
    assert_eq!(pushed.len(), 3);

    let in_graph = pushed
        .iter()
        .filter(|q| q.graph.matches(&Term::named("http://example.org/graph")))
        .count();
    assert_eq!(in_graph, 2);
}

#[test]
fn test_context_rejected_inside_ignored_member() {
    let err = parse_err(r#"{"@index": {"@context": {}}, "http://example.org/p": "o"}"#);
    assert!(matches!(err, ParseError::UnsupportedFeature(_)));
}

#[test]
fn test_json_literal_rejected() {
    let doc = json!({"http://example.org/p": {"@value": "x", "@type": "@json"}}).to_string();
    for options in [
        ParserOptions::default(),
        ParserOptions::default().with_base_iri("http://example.org/"),
    ] {
        assert!(matches!(
            parse_str(&doc, options),
            Err(ParseError::UnsupportedFeature(_))
        ));
    }
}
