//! The explorer state machine.
//!
//! [`ExplorerCore::handle`] consumes one [`Event`] and returns the [`Effects`]
//! it causes. Every event updates only the inputs it touches; derived inputs
//! (cursors, view) are recomputed only when one of their dependencies moved.
//! All updates of one event are committed together, so each event yields at
//! most one [`Snapshot`], and none before language, theme and page are known.

use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};

use serde::Serialize;
use shared::{
    domain::{
        AddressId, AddressInfo, Block, BlockHash, BlockStatus, Outspend, Theme, Transaction, Txid,
    },
    protocol::{
        Location, NavCommand, PrefKey, RequestDescriptor, RequestKind, ResponseEnvelope,
        StorageWrite,
    },
    route::Route,
};
use tracing::{debug, info};

use crate::{
    accumulator::{Accumulator, CacheTransform, ListState, ListTransform},
    combinator::{Combinator, Input},
    correlator::{Correlator, Reply, Settlement},
    effects::{Effects, ScrollTracker},
    error::CombinatorError,
    l10n::{Translator, Untranslated, DEFAULT_LANG},
    pagination::{next_address_txs_cursor, next_block_txs_cursor, next_blocks_cursor},
    refresh::{TipRefresh, DEFAULT_TIP_INTERVAL, DEFAULT_TIP_MIN_SPACING},
    toggle::{mirror_expand, ExpandController},
    view::{select_view, PageKind, View},
};

pub type SpendCache = HashMap<Txid, Vec<Outspend>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    ToggleTx(Txid),
    ToggleBlock(BlockHash),
    ToggleTheme,
    Copy(String),
    LoadMoreBlocks { start_height: u64 },
    LoadMoreBlockTxs { hash: BlockHash, start_index: u64 },
    LoadMoreAddrTxs { addr: AddressId, last_txid: Txid },
    SelectLang(String),
    SubmitSearch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Navigated(Location),
    Click(ClickAction),
    Response(ResponseEnvelope),
    PreferenceLoaded { key: PrefKey, value: Option<String> },
    /// Path of the search hit, or `None` when nothing matched.
    SearchResult(Option<String>),
    Tick { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Router,
    User,
    Transport,
    Preferences,
    Search,
    Timer,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub at: Instant,
    pub kind: EventKind,
}

impl Event {
    pub fn new(at: Instant, kind: EventKind) -> Self {
        Self { at, kind }
    }

    pub fn now(kind: EventKind) -> Self {
        Self::new(Instant::now(), kind)
    }

    pub fn source(&self) -> Source {
        match self.kind {
            EventKind::Navigated(_) => Source::Router,
            EventKind::Click(_) => Source::User,
            EventKind::Response(_) => Source::Transport,
            EventKind::PreferenceLoaded { .. } => Source::Preferences,
            EventKind::SearchResult(_) => Source::Search,
            EventKind::Tick { .. } => Source::Timer,
        }
    }
}

/// Fully populated application state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub lang: String,
    pub error: Option<String>,
    pub tip_height: Option<u64>,
    pub spends: SpendCache,
    pub blocks: ListState<Block>,
    pub next_more_blocks: Option<u64>,
    pub block: Option<Block>,
    pub block_status: Option<BlockStatus>,
    pub block_txs: ListState<Transaction>,
    pub next_more_block_txs: Option<u64>,
    pub open_block: Option<BlockHash>,
    pub tx: Option<Transaction>,
    pub open_tx: Option<Txid>,
    pub addr: Option<AddressInfo>,
    pub addr_txs: ListState<Transaction>,
    pub next_more_addr_txs: Option<Txid>,
    pub loading: u32,
    pub page: Location,
    pub view: View,
    pub title: Option<String>,
    pub theme: Theme,
}

struct Inputs {
    lang: Input<String>,
    error: Input<Option<String>>,
    tip_height: Input<Option<u64>>,
    spends: Input<SpendCache>,
    blocks: Input<ListState<Block>>,
    next_more_blocks: Input<Option<u64>>,
    block: Input<Option<Block>>,
    block_status: Input<Option<BlockStatus>>,
    block_txs: Input<ListState<Transaction>>,
    next_more_block_txs: Input<Option<u64>>,
    open_block: Input<Option<BlockHash>>,
    tx: Input<Option<Transaction>>,
    open_tx: Input<Option<Txid>>,
    addr: Input<Option<AddressInfo>>,
    addr_txs: Input<ListState<Transaction>>,
    next_more_addr_txs: Input<Option<Txid>>,
    loading: Input<u32>,
    page: Input<Location>,
    view: Input<View>,
    title: Input<Option<String>>,
    theme: Input<Theme>,
}

impl Inputs {
    fn register(c: &mut Combinator) -> Result<Self, CombinatorError> {
        Ok(Self {
            lang: c.input("lang")?,
            error: c.input("error")?,
            tip_height: c.input("tip_height")?,
            spends: c.input("spends")?,
            blocks: c.input("blocks")?,
            next_more_blocks: c.input("next_more_blocks")?,
            block: c.input("block")?,
            block_status: c.input("block_status")?,
            block_txs: c.input("block_txs")?,
            next_more_block_txs: c.input("next_more_block_txs")?,
            open_block: c.input("open_block")?,
            tx: c.input("tx")?,
            open_tx: c.input("open_tx")?,
            addr: c.input("addr")?,
            addr_txs: c.input("addr_txs")?,
            next_more_addr_txs: c.input("next_more_addr_txs")?,
            loading: c.input("loading")?,
            page: c.input("page")?,
            view: c.input("view")?,
            title: c.input("title")?,
            theme: c.input("theme")?,
        })
    }
}

#[derive(Clone)]
pub struct CoreOptions {
    pub default_lang: String,
    pub tip_interval: Duration,
    pub tip_min_spacing: Duration,
    pub translator: Arc<dyn Translator>,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            default_lang: DEFAULT_LANG.to_string(),
            tip_interval: DEFAULT_TIP_INTERVAL,
            tip_min_spacing: DEFAULT_TIP_MIN_SPACING,
            translator: Arc::new(Untranslated),
        }
    }
}

pub struct ExplorerCore {
    combinator: Combinator,
    inputs: Inputs,
    correlator: Correlator,
    translator: Arc<dyn Translator>,
    default_lang: String,
    tip: TipRefresh,
    scroll: ScrollTracker,

    nav_epoch: u64,
    location: Option<Location>,
    domain_view: Option<PageKind>,
    /// A redirect was issued and its navigation has not arrived yet.
    redirecting: bool,
    view: View,
    loading: u32,
    error: Option<String>,
    lang: Option<String>,
    theme: Option<Theme>,

    blocks: Accumulator<ListState<Block>>,
    block: Option<Block>,
    block_txs: Accumulator<ListState<Transaction>>,
    addr: Option<AddressInfo>,
    addr_txs: Accumulator<ListState<Transaction>>,
    spends: Accumulator<SpendCache>,
    open_tx: ExpandController<Txid>,
    open_block: ExpandController<BlockHash>,
}

impl ExplorerCore {
    pub fn new(options: CoreOptions) -> Result<Self, CombinatorError> {
        let mut combinator = Combinator::new();
        let inputs = Inputs::register(&mut combinator)?;
        let view = select_view(None, None, 0);

        // Everything except language, theme and page starts out empty.
        let mut seed = combinator.batch();
        seed.set(&inputs.error, None)
            .set(&inputs.tip_height, None)
            .set(&inputs.spends, SpendCache::new())
            .set(&inputs.blocks, None)
            .set(&inputs.next_more_blocks, None)
            .set(&inputs.block, None)
            .set(&inputs.block_status, None)
            .set(&inputs.block_txs, None)
            .set(&inputs.next_more_block_txs, None)
            .set(&inputs.open_block, None)
            .set(&inputs.tx, None)
            .set(&inputs.open_tx, None)
            .set(&inputs.addr, None)
            .set(&inputs.addr_txs, None)
            .set(&inputs.next_more_addr_txs, None)
            .set(&inputs.loading, 0)
            .set(&inputs.view, view)
            .set(&inputs.title, None);
        seed.commit();

        Ok(Self {
            combinator,
            inputs,
            correlator: Correlator::new(),
            translator: options.translator,
            default_lang: options.default_lang,
            tip: TipRefresh::new(options.tip_interval, options.tip_min_spacing),
            scroll: ScrollTracker::default(),
            nav_epoch: 0,
            location: None,
            domain_view: None,
            redirecting: false,
            view,
            loading: 0,
            error: None,
            lang: None,
            theme: None,
            blocks: Accumulator::default(),
            block: None,
            block_txs: Accumulator::default(),
            addr: None,
            addr_txs: Accumulator::default(),
            spends: Accumulator::default(),
            open_tx: ExpandController::new(),
            open_block: ExpandController::new(),
        })
    }

    pub fn handle(&mut self, event: Event) -> Effects {
        let mut effects = Effects::default();
        let at = event.at;
        match event.kind {
            EventKind::Navigated(location) => self.on_navigated(at, location, &mut effects),
            EventKind::Click(action) => self.on_click(action, &mut effects),
            EventKind::Response(envelope) => self.on_response(envelope, &mut effects),
            EventKind::PreferenceLoaded { key, value } => self.on_preference(key, value),
            EventKind::SearchResult(found) => self.on_search_result(found, &mut effects),
            EventKind::Tick { visible } => {
                if self.tip.on_tick(at, visible) {
                    self.request(RequestKind::TipHeight, &mut effects);
                }
            }
        }
        self.sync_loading();

        if self.combinator.commit() {
            effects.snapshot = self.snapshot();
        }
        effects
    }

    /// Latest snapshot, once every input has produced a value.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let c = &self.combinator;
        let i = &self.inputs;
        Some(Snapshot {
            lang: c.get(&i.lang)?.clone(),
            error: c.get(&i.error)?.clone(),
            tip_height: *c.get(&i.tip_height)?,
            spends: c.get(&i.spends)?.clone(),
            blocks: c.get(&i.blocks)?.clone(),
            next_more_blocks: *c.get(&i.next_more_blocks)?,
            block: c.get(&i.block)?.clone(),
            block_status: c.get(&i.block_status)?.clone(),
            block_txs: c.get(&i.block_txs)?.clone(),
            next_more_block_txs: *c.get(&i.next_more_block_txs)?,
            open_block: c.get(&i.open_block)?.clone(),
            tx: c.get(&i.tx)?.clone(),
            open_tx: c.get(&i.open_tx)?.clone(),
            addr: c.get(&i.addr)?.clone(),
            addr_txs: c.get(&i.addr_txs)?.clone(),
            next_more_addr_txs: c.get(&i.next_more_addr_txs)?.clone(),
            loading: *c.get(&i.loading)?,
            page: c.get(&i.page)?.clone(),
            view: *c.get(&i.view)?,
            title: c.get(&i.title)?.clone(),
            theme: *c.get(&i.theme)?,
        })
    }

    /// Inputs that still gate the first snapshot.
    pub fn pending_inputs(&self) -> Vec<&'static str> {
        self.combinator.pending()
    }

    pub fn loading(&self) -> u32 {
        self.correlator.loading()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn nav_epoch(&self) -> u64 {
        self.nav_epoch
    }

    pub fn tip_interval(&self) -> Duration {
        self.tip.interval()
    }

    fn on_navigated(&mut self, at: Instant, location: Location, effects: &mut Effects) {
        self.nav_epoch += 1;
        let route = Route::resolve(&location);
        info!(
            nav_epoch = self.nav_epoch,
            path = %location.href(),
            ?route,
            "navigated"
        );
        effects.scroll_to_top = self.scroll.observe(location.key.as_deref());

        self.combinator.stage(&self.inputs.page, location.clone());
        self.domain_view = None;
        self.redirecting = false;
        self.set_error(None);
        self.set_title(None);
        self.spends.apply(CacheTransform::Reset);
        self.combinator
            .stage(&self.inputs.spends, self.spends.state().clone());
        self.open_tx.navigate();
        self.open_block.navigate();

        match &route {
            Route::Home { start_height } => {
                self.apply_blocks(ListTransform::Reset);
                self.request(
                    RequestKind::Blocks {
                        start_height: *start_height,
                    },
                    effects,
                );
            }
            Route::Block { hash } => {
                self.set_block(None);
                self.combinator.stage(&self.inputs.block_status, None);
                self.apply_block_txs(ListTransform::Reset);
                self.request(RequestKind::Block { hash: hash.clone() }, effects);
                self.request(RequestKind::BlockStatus { hash: hash.clone() }, effects);
                self.request(
                    RequestKind::BlockTxs {
                        hash: hash.clone(),
                        start_index: None,
                    },
                    effects,
                );
                if location.expand_flag() {
                    self.open_block.deep_link(hash.clone());
                }
            }
            Route::BlockHeight { height } => {
                self.request(RequestKind::Height { height: *height }, effects);
            }
            Route::Tx { txid } => {
                self.set_tx(None);
                self.request(RequestKind::Tx { txid: txid.clone() }, effects);
                if location.expand_flag() {
                    self.open_tx.deep_link(txid.clone());
                    self.request(RequestKind::TxSpends { txid: txid.clone() }, effects);
                }
            }
            Route::Address { addr } => {
                self.set_addr(None);
                self.apply_addr_txs(ListTransform::Reset);
                self.request(RequestKind::Address { addr: addr.clone() }, effects);
                self.request(RequestKind::AddrTxs { addr: addr.clone() }, effects);
            }
            Route::Search { query } => self.search(query.clone(), effects),
            Route::NotFound => debug!(path = %location.pathname, "no route matched"),
        }

        self.combinator
            .stage(&self.inputs.open_tx, self.open_tx.expanded().cloned());
        self.combinator
            .stage(&self.inputs.open_block, self.open_block.expanded().cloned());

        if route.refreshes_tip() && self.tip.on_navigation(at) {
            self.request(RequestKind::TipHeight, effects);
        }
        self.location = Some(location);
    }

    fn on_click(&mut self, action: ClickAction, effects: &mut Effects) {
        debug!(?action, "click");
        match action {
            ClickAction::ToggleTx(txid) => {
                let expanded = self.open_tx.toggle(txid).cloned();
                self.combinator.stage(&self.inputs.open_tx, expanded.clone());
                if let Some(txid) = &expanded {
                    self.request(RequestKind::TxSpends { txid: txid.clone() }, effects);
                }
                if self.view == View::Tx {
                    self.mirror_expand(expanded.is_some(), effects);
                }
            }
            ClickAction::ToggleBlock(hash) => {
                let expanded = self.open_block.toggle(hash).cloned();
                let is_expanded = expanded.is_some();
                self.combinator.stage(&self.inputs.open_block, expanded);
                if self.view == View::Block {
                    self.mirror_expand(is_expanded, effects);
                }
            }
            ClickAction::ToggleTheme => {
                // Toggles before the stored theme is known are dropped.
                if let Some(theme) = self.theme {
                    let theme = theme.toggled();
                    self.theme = Some(theme);
                    self.combinator.stage(&self.inputs.theme, theme);
                    effects.storage.push(StorageWrite {
                        key: PrefKey::Theme,
                        value: theme.as_str().to_string(),
                    });
                }
            }
            ClickAction::Copy(text) => effects.clipboard = Some(text),
            ClickAction::LoadMoreBlocks { start_height } => {
                self.request(
                    RequestKind::Blocks {
                        start_height: Some(start_height),
                    },
                    effects,
                );
            }
            ClickAction::LoadMoreBlockTxs { hash, start_index } => {
                self.request(
                    RequestKind::BlockTxs {
                        hash,
                        start_index: Some(start_index),
                    },
                    effects,
                );
            }
            ClickAction::LoadMoreAddrTxs { addr, last_txid } => {
                self.request(RequestKind::AddrTxsChain { addr, last_txid }, effects);
            }
            ClickAction::SelectLang(lang) => {
                if self.lang.is_some() && self.lang.as_deref() != Some(lang.as_str()) {
                    self.lang = Some(lang.clone());
                    self.combinator.stage(&self.inputs.lang, lang.clone());
                    effects.storage.push(StorageWrite {
                        key: PrefKey::Lang,
                        value: lang,
                    });
                }
            }
            ClickAction::SubmitSearch(query) => {
                let query = query.trim();
                if !query.is_empty() {
                    self.search(query.to_string(), effects);
                }
            }
        }
    }

    fn on_response(&mut self, envelope: ResponseEnvelope, effects: &mut Effects) {
        match self.correlator.settle(envelope) {
            Settlement::Success { request, reply } => {
                if self.is_current(&request) {
                    self.apply_reply(reply, effects);
                } else {
                    debug!(
                        category = %request.category(),
                        request_epoch = request.nav_epoch,
                        nav_epoch = self.nav_epoch,
                        "discarding stale reply"
                    );
                }
            }
            Settlement::Failure { request, message } => {
                if self.is_current(&request) {
                    self.set_error(Some(message));
                    self.refresh_view();
                }
            }
            Settlement::Dropped { .. } | Settlement::Unknown(_) => {}
        }
    }

    fn on_preference(&mut self, key: PrefKey, value: Option<String>) {
        let value = value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        match key {
            PrefKey::Lang if self.lang.is_none() => {
                let lang = value.unwrap_or_else(|| self.default_lang.clone());
                self.lang = Some(lang.clone());
                self.combinator.stage(&self.inputs.lang, lang);
            }
            PrefKey::Theme if self.theme.is_none() => {
                let theme = value.map(|raw| Theme::parse(&raw)).unwrap_or_default();
                self.theme = Some(theme);
                self.combinator.stage(&self.inputs.theme, theme);
            }
            _ => debug!(key = key.as_str(), "ignoring repeated preference load"),
        }
    }

    fn on_search_result(&mut self, found: Option<String>, effects: &mut Effects) {
        self.correlator.end_search();
        match found {
            Some(path) => {
                self.redirecting = true;
                effects.navigation.push(NavCommand::push(&path));
            }
            None => effects.advisory = Some(self.translate("No results found", &[])),
        }
    }

    fn apply_reply(&mut self, reply: Reply, effects: &mut Effects) {
        match reply {
            Reply::TipHeight(height) => {
                self.combinator.stage(&self.inputs.tip_height, Some(height));
            }
            Reply::Blocks(blocks) => self.apply_blocks(ListTransform::Append(blocks)),
            Reply::Block(block) => self.set_block(Some(block)),
            Reply::BlockStatus(status) => {
                self.combinator.stage(&self.inputs.block_status, Some(status));
            }
            Reply::BlockTxs(txs) => self.apply_block_txs(ListTransform::Append(txs)),
            Reply::Tx(tx) => self.set_tx(Some(tx)),
            Reply::TxSpends { txid, outspends } => {
                self.spends.apply(CacheTransform::MergeKey(txid, outspends));
                self.combinator
                    .stage(&self.inputs.spends, self.spends.state().clone());
            }
            Reply::Address(addr) => self.set_addr(Some(addr)),
            Reply::AddrTxs(txs) => self.apply_addr_txs(ListTransform::Replace(txs)),
            Reply::AddrTxsChain(txs) => self.apply_addr_txs(ListTransform::Append(txs)),
            Reply::Height(hash) => {
                self.redirecting = true;
                effects
                    .navigation
                    .push(NavCommand::replace(&format!("/block/{hash}")));
            }
        }
    }

    fn apply_blocks(&mut self, transform: ListTransform<Block>) {
        let blocks = self.blocks.apply(transform).clone();
        let next = next_blocks_cursor(blocks.as_deref());
        let loaded = blocks.is_some();
        self.combinator.stage(&self.inputs.blocks, blocks);
        self.combinator.stage(&self.inputs.next_more_blocks, next);
        if loaded {
            self.observe_page(PageKind::Home);
        }
    }

    fn set_block(&mut self, block: Option<Block>) {
        if let Some(block) = &block {
            let title = self.translate(
                "Block #{}: {}",
                &[&block.height.to_string(), block.id.as_str()],
            );
            self.set_title(Some(title));
        }
        let loaded = block.is_some();
        self.block = block;
        self.combinator.stage(&self.inputs.block, self.block.clone());
        self.refresh_block_txs_cursor();
        if loaded {
            self.observe_page(PageKind::Block);
        }
    }

    fn apply_block_txs(&mut self, transform: ListTransform<Transaction>) {
        self.block_txs.apply(transform);
        self.combinator
            .stage(&self.inputs.block_txs, self.block_txs.state().clone());
        self.refresh_block_txs_cursor();
    }

    fn refresh_block_txs_cursor(&mut self) {
        let next = next_block_txs_cursor(self.block.as_ref(), self.block_txs.state().as_deref());
        self.combinator.stage(&self.inputs.next_more_block_txs, next);
    }

    fn set_tx(&mut self, tx: Option<Transaction>) {
        if let Some(tx) = &tx {
            let title = self.translate("Transaction: {}", &[tx.txid.as_str()]);
            self.set_title(Some(title));
        }
        let loaded = tx.is_some();
        self.combinator.stage(&self.inputs.tx, tx);
        if loaded {
            self.observe_page(PageKind::Tx);
        }
    }

    fn set_addr(&mut self, addr: Option<AddressInfo>) {
        if let Some(addr) = &addr {
            let title = self.translate("Address: {}", &[addr.address.as_str()]);
            self.set_title(Some(title));
        }
        let loaded = addr.is_some();
        self.addr = addr;
        self.combinator.stage(&self.inputs.addr, self.addr.clone());
        self.refresh_addr_txs_cursor();
        if loaded {
            self.observe_page(PageKind::Addr);
        }
    }

    fn apply_addr_txs(&mut self, transform: ListTransform<Transaction>) {
        self.addr_txs.apply(transform);
        self.combinator
            .stage(&self.inputs.addr_txs, self.addr_txs.state().clone());
        self.refresh_addr_txs_cursor();
    }

    fn refresh_addr_txs_cursor(&mut self) {
        let next = next_address_txs_cursor(self.addr.as_ref(), self.addr_txs.state().as_deref());
        self.combinator.stage(&self.inputs.next_more_addr_txs, next);
    }

    fn set_error(&mut self, error: Option<String>) {
        if self.error.is_none() && error.is_none() {
            return;
        }
        self.error = error;
        self.combinator.stage(&self.inputs.error, self.error.clone());
    }

    fn set_title(&mut self, title: Option<String>) {
        self.combinator.stage(&self.inputs.title, title);
    }

    fn observe_page(&mut self, kind: PageKind) {
        self.domain_view = Some(kind);
        self.refresh_view();
    }

    fn sync_loading(&mut self) {
        let loading = self.correlator.loading();
        if loading != self.loading {
            self.loading = loading;
            self.combinator.stage(&self.inputs.loading, loading);
        }
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let pending = self.loading + u32::from(self.redirecting);
        let view = select_view(self.domain_view, self.error.as_deref(), pending);
        if view != self.view {
            debug!(from = self.view.as_str(), to = view.as_str(), "view changed");
            self.view = view;
            self.combinator.stage(&self.inputs.view, view);
        }
    }

    fn mirror_expand(&mut self, expanded: bool, effects: &mut Effects) {
        let Some(location) = self.location.as_mut() else {
            return;
        };
        if let Some(command) = mirror_expand(expanded, location) {
            location.query = command.query.clone();
            effects.navigation.push(command);
        }
    }

    fn request(&mut self, kind: RequestKind, effects: &mut Effects) {
        let descriptor = self.correlator.dispatch(kind, self.nav_epoch);
        effects.requests.push(descriptor);
    }

    fn search(&mut self, query: String, effects: &mut Effects) {
        debug!(%query, "searching");
        self.correlator.begin_search();
        effects.searches.push(query);
    }

    /// Page-scoped replies only apply to the navigation that requested them.
    fn is_current(&self, request: &RequestDescriptor) -> bool {
        !request.category().is_page_scoped() || request.nav_epoch == self.nav_epoch
    }

    fn translate(&self, template: &str, args: &[&str]) -> String {
        let lang = self.lang.as_deref().unwrap_or(&self.default_lang);
        self.translator.translate(lang, template, args)
    }
}

#[cfg(test)]
#[path = "tests/explorer_tests.rs"]
mod tests;
