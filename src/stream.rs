//! Broadcast point for produced quads
//!
//! Every quad is offered to each attached subscriber in subscription
//! order. Subscribers hang off a *view*: the primary view passes
//! everything through, match views only pass quads satisfying their
//! pattern. Views are filters on delivery, not buffering stages.

use tracing::debug;

use crate::error::ParseError;
use crate::pattern::QuadPattern;
use crate::sink::{Flow, QuadSink};
use crate::term::Quad;

/// Handle of a view (primary or match view)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

/// Handle of an attached subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug)]
struct View {
    id: ViewId,
    pattern: QuadPattern,
}

struct Subscriber<'a> {
    id: SubscriberId,
    view: ViewId,
    sink: Box<dyn QuadSink + 'a>,
}

/// Ordered set of subscribers grouped by view
pub struct QuadStream<'a> {
    views: Vec<View>,
    subscribers: Vec<Subscriber<'a>>,
    next_id: u64,
}

impl Default for QuadStream<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> QuadStream<'a> {
    /// The unfiltered view every stream starts with
    pub const PRIMARY: ViewId = ViewId(0);

    pub fn new() -> Self {
        Self {
            views: vec![View {
                id: Self::PRIMARY,
                pattern: QuadPattern::any(),
            }],
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a filtered view; it has no subscribers yet
    pub fn match_view(&mut self, pattern: QuadPattern) -> ViewId {
        let id = ViewId(self.next_id());
        self.views.push(View { id, pattern });
        id
    }

    /// Attach a sink to the primary view
    pub fn subscribe(&mut self, sink: impl QuadSink + 'a) -> SubscriberId {
        let id = SubscriberId(self.next_id());
        self.subscribers.push(Subscriber {
            id,
            view: Self::PRIMARY,
            sink: Box::new(sink),
        });
        id
    }

    /// Attach a sink to a view; `None` if the view does not exist
    pub fn subscribe_to(&mut self, view: ViewId, sink: impl QuadSink + 'a) -> Option<SubscriberId> {
        if !self.views.iter().any(|v| v.id == view) {
            return None;
        }
        let id = SubscriberId(self.next_id());
        self.subscribers.push(Subscriber {
            id,
            view,
            sink: Box::new(sink),
        });
        Some(id)
    }

    /// Detach a subscriber without signalling it
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Remove a match view and detach its subscribers
    ///
    /// The primary view cannot be closed.
    pub fn close_view(&mut self, view: ViewId) -> bool {
        if view == Self::PRIMARY {
            return false;
        }
        let before = self.views.len();
        self.views.retain(|v| v.id != view);
        if self.views.len() == before {
            return false;
        }
        self.subscribers.retain(|s| s.view != view);
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn pattern(&self, view: ViewId) -> Option<&QuadPattern> {
        self.views.iter().find(|v| v.id == view).map(|v| &v.pattern)
    }

    /// Offer a quad to every subscriber whose view matches it
    pub fn deliver(&mut self, quad: &Quad) {
        let views = &self.views;
        self.subscribers.retain_mut(|subscriber| {
            let Some(view) = views.iter().find(|v| v.id == subscriber.view) else {
                return false;
            };
            if !view.pattern.matches(quad) {
                return true;
            }
            match subscriber.sink.on_quad(quad) {
                Flow::Continue => true,
                Flow::Detach => {
                    debug!(subscriber = subscriber.id.0, "subscriber detached");
                    false
                }
            }
        });
    }

    /// Signal normal completion and release all subscribers
    pub fn end(&mut self) {
        for mut subscriber in self.subscribers.drain(..) {
            subscriber.sink.on_end();
        }
    }

    /// Signal a terminal error and release all subscribers
    pub fn fail(&mut self, error: &ParseError) {
        for mut subscriber in self.subscribers.drain(..) {
            subscriber.sink.on_error(error);
        }
    }
}

impl QuadSink for QuadStream<'_> {
    fn on_quad(&mut self, quad: &Quad) -> Flow {
        self.deliver(quad);
        Flow::Continue
    }

    fn on_end(&mut self) {
        self.end();
    }

    fn on_error(&mut self, error: &ParseError) {
        self.fail(error);
    }
}
