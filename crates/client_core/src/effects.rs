//! Outgoing effects of one core step, and the capability seams they are
//! delivered through.

use std::{collections::VecDeque, sync::Arc};

use shared::protocol::{NavCommand, RequestDescriptor, StorageWrite};

use crate::explorer::Snapshot;

const SCROLL_HISTORY: usize = 16;

/// Everything one event asks of the outside world.
#[derive(Debug, Default)]
pub struct Effects {
    pub snapshot: Option<Snapshot>,
    pub requests: Vec<RequestDescriptor>,
    pub navigation: Vec<NavCommand>,
    pub storage: Vec<StorageWrite>,
    pub searches: Vec<String>,
    pub clipboard: Option<String>,
    pub scroll_to_top: bool,
    /// Transient, non-fatal notice such as an empty search.
    pub advisory: Option<String>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
            && self.requests.is_empty()
            && self.navigation.is_empty()
            && self.storage.is_empty()
            && self.searches.is_empty()
            && self.clipboard.is_none()
            && !self.scroll_to_top
            && self.advisory.is_none()
    }
}

/// Pure projection of a snapshot into a render tree.
pub trait Renderer: Send {
    type Tree;

    fn render(&self, snapshot: &Snapshot) -> Option<Self::Tree>;
}

/// Hands the snapshot itself to subscribers.
pub struct SnapshotRenderer;

impl Renderer for SnapshotRenderer {
    type Tree = Snapshot;

    fn render(&self, snapshot: &Snapshot) -> Option<Snapshot> {
        Some(snapshot.clone())
    }
}

pub trait PageVisibility: Send + Sync {
    fn is_visible(&self) -> bool;
}

pub trait ScrollSink: Send + Sync {
    fn scroll_to_top(&self);
}

pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str);
}

pub trait AdvisorySink: Send + Sync {
    fn show(&self, message: &str);
}

pub struct AlwaysVisible;

impl PageVisibility for AlwaysVisible {
    fn is_visible(&self) -> bool {
        true
    }
}

/// Sink for hosts without the capability.
pub struct Discard;

impl ScrollSink for Discard {
    fn scroll_to_top(&self) {}
}

impl ClipboardSink for Discard {
    fn write_text(&self, _text: &str) {}
}

impl AdvisorySink for Discard {
    fn show(&self, _message: &str) {}
}

/// Recognises history keys seen recently so back/forward keeps the scroll
/// position while new pages start at the top.
#[derive(Debug, Default, Clone)]
pub struct ScrollTracker {
    recent: VecDeque<String>,
}

impl ScrollTracker {
    pub fn observe(&mut self, key: Option<&str>) -> bool {
        let Some(key) = key else {
            return true;
        };
        if self.recent.iter().any(|seen| seen == key) {
            return false;
        }
        if self.recent.len() == SCROLL_HISTORY {
            self.recent.pop_front();
        }
        self.recent.push_back(key.to_string());
        true
    }
}

/// Delivers the synchronous effects: render, scroll, clipboard, advisory.
pub struct EffectDispatcher<R> {
    renderer: R,
    scroll: Arc<dyn ScrollSink>,
    clipboard: Arc<dyn ClipboardSink>,
    advisory: Arc<dyn AdvisorySink>,
}

impl<R: Renderer> EffectDispatcher<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            scroll: Arc::new(Discard),
            clipboard: Arc::new(Discard),
            advisory: Arc::new(Discard),
        }
    }

    pub fn with_scroll(mut self, scroll: Arc<dyn ScrollSink>) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_advisory(mut self, advisory: Arc<dyn AdvisorySink>) -> Self {
        self.advisory = advisory;
        self
    }

    /// Returns the render tree for the step's snapshot, if any.
    pub fn dispatch(&self, effects: &Effects) -> Option<R::Tree> {
        if effects.scroll_to_top {
            self.scroll.scroll_to_top();
        }
        if let Some(text) = &effects.clipboard {
            self.clipboard.write_text(text);
        }
        if let Some(message) = &effects.advisory {
            self.advisory.show(message);
        }
        effects
            .snapshot
            .as_ref()
            .and_then(|snapshot| self.renderer.render(snapshot))
    }
}

#[cfg(test)]
#[path = "tests/effects_tests.rs"]
mod tests;
