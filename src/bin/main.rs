//! JSON-LD to N-Quads CLI
//!
//! Command-line tool that streams the quads of a JSON-LD document to a file
//! or stdout while the document is still being read.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::debug;

use jsonld_quads::{
    DocumentSource, Flow, JsonLdParser, ParseError, ParserOptions, Quad, QuadPattern, QuadSink,
    Term,
};

#[derive(Parser)]
#[command(name = "jsonld-quads")]
#[command(about = "Convert context-free JSON-LD into RDF quads as it streams in")]
#[command(version)]
struct Cli {
    /// Path to a JSON-LD document, `-` for stdin, or an http(s) URL
    source: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base IRI for relative identifiers (default: the URL for remote sources)
    #[arg(long, value_name = "IRI")]
    base: Option<String>,

    /// JSON file with parser options, e.g. {"baseIri": "...", "chunkSize": 4096}
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bytes read per step
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Only emit quads with this subject (IRI or _:label)
    #[arg(long, value_name = "TERM")]
    subject: Option<String>,

    /// Only emit quads with this predicate IRI
    #[arg(long, value_name = "IRI")]
    predicate: Option<String>,

    /// Only emit quads with this object (IRI, _:label or "quoted literal")
    #[arg(long, value_name = "TERM")]
    object: Option<String>,

    /// Only emit quads in this graph (IRI, _:label or `default`)
    #[arg(long, value_name = "TERM")]
    graph: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Nquads)]
    format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// One N-Quads statement per line
    Nquads,
    /// One JSON object per line
    Jsonl,
}

/// Parse a filter term given on the command line
fn parse_term(value: &str, graph: bool) -> Term {
    if graph && value == "default" {
        Term::DefaultGraph
    } else if let Some(label) = value.strip_prefix("_:") {
        Term::blank(label)
    } else if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Term::literal(&value[1..value.len() - 1])
    } else {
        Term::named(value)
    }
}

impl Cli {
    fn pattern(&self) -> QuadPattern {
        QuadPattern::new(
            self.subject.as_deref().map(|v| parse_term(v, false)),
            self.predicate.as_deref().map(Term::named),
            self.object.as_deref().map(|v| parse_term(v, false)),
            self.graph.as_deref().map(|v| parse_term(v, true)),
        )
    }

    fn options(&self, source: &DocumentSource) -> Result<ParserOptions, ParseError> {
        let mut options = match &self.config {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ParseError::Load {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                ParserOptions::from_json(&content)?
            }
            None => ParserOptions::default(),
        };
        if let Some(base) = &self.base {
            options.base_iri = base.clone();
        } else if options.base_iri.is_empty() {
            if let Some(base) = source.default_base() {
                options.base_iri = base.to_string();
            }
        }
        if let Some(size) = self.chunk_size {
            options.chunk_size = size;
        }
        Ok(options)
    }
}

/// Writes each quad as it arrives; detaches on the first write failure
struct QuadWriter<W: Write> {
    out: W,
    format: Format,
    error: Option<ParseError>,
}

impl<W: Write> QuadWriter<W> {
    fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            error: None,
        }
    }

    fn write(&mut self, quad: &Quad) -> Result<(), ParseError> {
        match self.format {
            Format::Nquads => writeln!(self.out, "{}", quad)?,
            Format::Jsonl => {
                serde_json::to_writer(&mut self.out, quad)?;
                self.out.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

impl<W: Write> QuadSink for QuadWriter<W> {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        match self.write(quad) {
            Ok(()) => Flow::Continue,
            Err(e) => {
                self.error = Some(e);
                Flow::Detach
            }
        }
    }

    fn on_end(&mut self) {
        if let Err(e) = self.out.flush() {
            self.error = Some(e.into());
        }
    }

    fn on_error(&mut self, _error: &ParseError) {
        // Keep what was written before the failure
        let _ = self.out.flush();
    }
}

fn run(cli: Cli) -> Result<(), ParseError> {
    let source = DocumentSource::parse(&cli.source);
    let options = cli.options(&source)?;
    let pattern = cli.pattern();

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = QuadWriter::new(out, cli.format);

    let reader = source.open()?;
    let summary = {
        let mut parser = JsonLdParser::new(reader, options);
        if pattern.is_wildcard() {
            parser.subscribe(&mut writer);
        } else {
            let view = parser.match_view(pattern);
            parser.subscribe_to(view, &mut writer);
        }
        parser.run()?
    };

    if let Some(e) = writer.error.take() {
        return Err(e);
    }

    debug!(
        quads = summary.quads,
        bytes = summary.bytes,
        "converted {}",
        source.location()
    );
    if let Some(path) = &cli.output {
        eprintln!("Parsed {} quads, output written to {}", summary.quads, path.display());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
