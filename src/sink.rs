//! Consumer side of the quad stream
//!
//! A [`QuadSink`] receives each quad synchronously. The producer cannot
//! move on until `on_quad` returns, which is the flow-control contract:
//! a slow sink slows the parse down instead of growing a buffer.

use std::collections::VecDeque;

use crate::error::ParseError;
use crate::term::Quad;

/// What a sink wants after receiving a quad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop delivering to this sink; it receives no end or error signal
    Detach,
}

/// Receiver of quads plus the terminal completion/error signal
///
/// Exactly one of `on_end` or `on_error` is called, once, unless the
/// sink detached first.
pub trait QuadSink {
    fn on_quad(&mut self, quad: &Quad) -> Flow;

    fn on_end(&mut self) {}

    fn on_error(&mut self, _error: &ParseError) {}
}

impl<S: QuadSink + ?Sized> QuadSink for &mut S {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        (**self).on_quad(quad)
    }

    fn on_end(&mut self) {
        (**self).on_end()
    }

    fn on_error(&mut self, error: &ParseError) {
        (**self).on_error(error)
    }
}

impl<S: QuadSink + ?Sized> QuadSink for Box<S> {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        (**self).on_quad(quad)
    }

    fn on_end(&mut self) {
        (**self).on_end()
    }

    fn on_error(&mut self, error: &ParseError) {
        (**self).on_error(error)
    }
}

impl QuadSink for Vec<Quad> {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        self.push(quad.clone());
        Flow::Continue
    }
}

impl QuadSink for VecDeque<Quad> {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        self.push_back(quad.clone());
        Flow::Continue
    }
}

/// Collects quads and records how the stream terminated
#[derive(Debug, Default)]
pub struct QuadCollector {
    pub quads: Vec<Quad>,
    /// Set when the stream completed normally
    pub completed: bool,
    /// Message of the terminal error, if any
    pub error: Option<String>,
}

impl QuadCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

impl QuadSink for QuadCollector {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        self.quads.push(quad.clone());
        Flow::Continue
    }

    fn on_end(&mut self) {
        self.completed = true;
    }

    fn on_error(&mut self, error: &ParseError) {
        self.error = Some(error.to_string());
    }
}

/// Sink backed by a closure
pub struct FnSink<F>(F);

/// Wrap a closure as a sink; it decides per quad whether to stay attached
pub fn from_fn<F>(f: F) -> FnSink<F>
where
    F: FnMut(&Quad) -> Flow,
{
    FnSink(f)
}

impl<F> QuadSink for FnSink<F>
where
    F: FnMut(&Quad) -> Flow,
{
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        (self.0)(quad)
    }
}
