//! Async host for [`ExplorerCore`].
//!
//! The runtime owns the core and a single input queue. Requests, searches and
//! preference writes run as spawned tasks whose results re-enter the queue, so
//! the core only ever sees one event at a time.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::StreamExt;
use shared::protocol::{NavCommand, PrefKey};
use tokio::{
    sync::{broadcast, mpsc},
    time::{interval, MissedTickBehavior},
};
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, info, warn};

use crate::{
    effects::{AlwaysVisible, EffectDispatcher, Effects, PageVisibility, Renderer},
    explorer::{ClickAction, Event, EventKind, ExplorerCore},
    preferences::{MemoryPreferenceStore, PreferenceStore},
    router::Router,
    search::{SearchProvider, TransportSearch},
    transport::Transport,
};

const RENDER_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
enum Input {
    Event(EventKind),
    Navigate(NavCommand),
    Back,
    Forward,
    Shutdown,
}

/// Outside capabilities the runtime drives.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub router: Arc<dyn Router>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub search: Arc<dyn SearchProvider>,
    pub visibility: Arc<dyn PageVisibility>,
}

impl Collaborators {
    /// Memory-backed preferences, API-probing search and an always visible page.
    pub fn new(transport: Arc<dyn Transport>, router: Arc<dyn Router>) -> Self {
        Self {
            search: Arc::new(TransportSearch::new(Arc::clone(&transport))),
            transport,
            router,
            preferences: Arc::new(MemoryPreferenceStore::new()),
            visibility: Arc::new(AlwaysVisible),
        }
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = search;
        self
    }

    pub fn with_visibility(mut self, visibility: Arc<dyn PageVisibility>) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Cloneable control surface of a running [`ExplorerRuntime`].
#[derive(Clone)]
pub struct RuntimeHandle<T> {
    inputs: mpsc::UnboundedSender<Input>,
    rendered: broadcast::Sender<T>,
}

impl<T> RuntimeHandle<T> {
    fn send(&self, input: Input) -> Result<()> {
        self.inputs
            .send(input)
            .map_err(|_| anyhow!("explorer runtime has stopped"))
    }

    pub fn click(&self, action: ClickAction) -> Result<()> {
        self.send(Input::Event(EventKind::Click(action)))
    }

    /// Follows a link, pushing a history entry.
    pub fn navigate(&self, href: &str) -> Result<()> {
        self.send(Input::Navigate(NavCommand::push(href)))
    }

    pub fn back(&self) -> Result<()> {
        self.send(Input::Back)
    }

    pub fn forward(&self) -> Result<()> {
        self.send(Input::Forward)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Input::Shutdown)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.rendered.subscribe()
    }
}

pub struct ExplorerRuntime<R: Renderer> {
    core: ExplorerCore,
    collaborators: Collaborators,
    dispatcher: EffectDispatcher<R>,
    inputs_tx: mpsc::UnboundedSender<Input>,
    inputs_rx: mpsc::UnboundedReceiver<Input>,
    rendered: broadcast::Sender<R::Tree>,
}

impl<R> ExplorerRuntime<R>
where
    R: Renderer,
    R::Tree: Clone + Send + 'static,
{
    pub fn new(
        core: ExplorerCore,
        collaborators: Collaborators,
        dispatcher: EffectDispatcher<R>,
    ) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        let (rendered, _) = broadcast::channel(RENDER_CHANNEL_CAPACITY);
        Self {
            core,
            collaborators,
            dispatcher,
            inputs_tx,
            inputs_rx,
            rendered,
        }
    }

    pub fn handle(&self) -> RuntimeHandle<R::Tree> {
        RuntimeHandle {
            inputs: self.inputs_tx.clone(),
            rendered: self.rendered.clone(),
        }
    }

    /// Loads preferences, enters the router's current location and processes
    /// inputs until shut down.
    pub async fn run(mut self) -> Result<()> {
        for key in [PrefKey::Lang, PrefKey::Theme] {
            let value = match self.collaborators.preferences.get_item(key).await {
                Ok(value) => value,
                Err(err) => {
                    warn!(key = key.as_str(), "failed to read preference: {err}");
                    None
                }
            };
            self.step(EventKind::PreferenceLoaded { key, value });
        }
        let location = self.collaborators.router.current();
        info!(path = %location.href(), "explorer runtime started");
        self.step(EventKind::Navigated(location));

        // First tick is immediate; the shared throttle absorbs it when the
        // initial navigation already fetched the tip.
        let mut timer = interval(self.core.tip_interval());
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(timer);

        loop {
            tokio::select! {
                input = self.inputs_rx.recv() => match input {
                    Some(Input::Event(kind)) => self.step(kind),
                    Some(Input::Navigate(command)) => self.navigate(&command),
                    Some(Input::Back) => {
                        if let Some(location) = self.collaborators.router.back() {
                            self.step(EventKind::Navigated(location));
                        }
                    }
                    Some(Input::Forward) => {
                        if let Some(location) = self.collaborators.router.forward() {
                            self.step(EventKind::Navigated(location));
                        }
                    }
                    Some(Input::Shutdown) | None => break,
                },
                Some(_) = ticks.next() => {
                    let visible = self.collaborators.visibility.is_visible();
                    self.step(EventKind::Tick { visible });
                }
            }
        }
        info!("explorer runtime stopped");
        Ok(())
    }

    fn step(&mut self, kind: EventKind) {
        let effects = self.core.handle(Event::now(kind));
        self.apply(effects);
    }

    fn navigate(&mut self, command: &NavCommand) {
        if let Some(location) = self.collaborators.router.apply(command) {
            self.step(EventKind::Navigated(location));
        }
    }

    fn apply(&mut self, effects: Effects) {
        if let Some(tree) = self.dispatcher.dispatch(&effects) {
            let _ = self.rendered.send(tree);
        }

        for request in effects.requests {
            let transport = Arc::clone(&self.collaborators.transport);
            let inputs = self.inputs_tx.clone();
            tokio::spawn(async move {
                let envelope = transport.exchange(request).await;
                let _ = inputs.send(Input::Event(EventKind::Response(envelope)));
            });
        }

        for query in effects.searches {
            let search = Arc::clone(&self.collaborators.search);
            let inputs = self.inputs_tx.clone();
            tokio::spawn(async move {
                let found = search.search(&query).await;
                debug!(%query, ?found, "search resolved");
                let _ = inputs.send(Input::Event(EventKind::SearchResult(found)));
            });
        }

        for write in effects.storage {
            let preferences = Arc::clone(&self.collaborators.preferences);
            tokio::spawn(async move {
                if let Err(err) = preferences.set_item(write.key, &write.value).await {
                    warn!(key = write.key.as_str(), "failed to store preference: {err}");
                }
            });
        }

        for command in effects.navigation {
            self.navigate(&command);
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
