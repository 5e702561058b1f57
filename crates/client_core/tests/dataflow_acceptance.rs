//! End-to-end behaviour of the explorer core driven through its public API,
//! with responses delivered synchronously or deliberately late.

use std::collections::{HashMap, VecDeque};

use client_core::{
    error_messages, select, ClickAction, CoreOptions, Effects, Event, EventKind, ExplorerCore, HistoryRouter, Router,
    Snapshot, View,
};
use shared::{
    domain::{Theme, Txid},
    error::FetchFailure,
    protocol::{Category, Location, PrefKey, RequestDescriptor, ResponseEnvelope},
};

const BLOCKS: &str = r#"[{"id":"0a","height":2,"tx_count":1},{"id":"09","height":1,"tx_count":1}]"#;
const TX_AA: &str = r#"{"txid":"aa","vin":[],"vout":[],"status":{"confirmed":true}}"#;
const TX_BB: &str = r#"{"txid":"bb","vin":[],"vout":[],"status":{"confirmed":true}}"#;

/// Synchronous host: answers requests from a path table, either at once or
/// when explicitly released.
struct Driver {
    core: ExplorerCore,
    router: HistoryRouter,
    api: HashMap<String, Result<String, FetchFailure>>,
    held: VecDeque<RequestDescriptor>,
    hold: bool,
    snapshots: Vec<Snapshot>,
    envelopes: Vec<ResponseEnvelope>,
    scrolls: usize,
}

impl Driver {
    fn new(initial_href: &str) -> Self {
        let mut api = HashMap::new();
        api.insert("/blocks/tip/height".to_string(), Ok("100".to_string()));
        api.insert("/blocks/".to_string(), Ok(BLOCKS.to_string()));
        api.insert("/tx/aa".to_string(), Ok(TX_AA.to_string()));
        api.insert("/tx/bb".to_string(), Ok(TX_BB.to_string()));
        api.insert("/tx/aa/outspends".to_string(), Ok("[]".to_string()));

        let mut driver = Self {
            core: ExplorerCore::new(CoreOptions::default()).expect("core"),
            router: HistoryRouter::new(initial_href),
            api,
            held: VecDeque::new(),
            hold: false,
            snapshots: Vec::new(),
            envelopes: Vec::new(),
            scrolls: 0,
        };
        for key in [PrefKey::Lang, PrefKey::Theme] {
            driver.send(EventKind::PreferenceLoaded { key, value: None });
        }
        let location = driver.router.current();
        driver.send(EventKind::Navigated(location));
        driver
    }

    fn send(&mut self, kind: EventKind) {
        let effects = self.core.handle(Event::now(kind));
        self.apply(effects);
    }

    fn apply(&mut self, effects: Effects) {
        if let Some(snapshot) = effects.snapshot {
            self.snapshots.push(snapshot);
        }
        if effects.scroll_to_top {
            self.scrolls += 1;
        }
        for request in effects.requests {
            if self.hold {
                self.held.push_back(request);
            } else {
                self.answer(request);
            }
        }
        for command in effects.navigation {
            if let Some(location) = self.router.apply(&command) {
                self.send(EventKind::Navigated(location));
            }
        }
    }

    fn answer(&mut self, request: RequestDescriptor) {
        let outcome = self
            .api
            .get(&request.path())
            .cloned()
            .unwrap_or_else(|| Err(FetchFailure::http(404, "not found")));
        let envelope = match outcome {
            Ok(body) => ResponseEnvelope::success(request, body),
            Err(failure) => ResponseEnvelope::failure(request, failure),
        };
        self.envelopes.push(envelope.clone());
        self.send(EventKind::Response(envelope));
    }

    fn release_all(&mut self) {
        while let Some(request) = self.held.pop_front() {
            self.answer(request);
        }
    }

    fn follow(&mut self, href: &str) {
        let location = self
            .router
            .apply(&shared::protocol::NavCommand::push(href))
            .expect("push navigates");
        self.send(EventKind::Navigated(location));
    }

    fn back(&mut self) {
        let location = self.router.back().expect("history entry");
        self.send(EventKind::Navigated(location));
    }

    fn latest(&self) -> &Snapshot {
        self.snapshots.last().expect("a snapshot")
    }
}

#[test]
fn browsing_session_keeps_state_consistent() {
    let mut driver = Driver::new("/");
    let home = driver.latest();
    assert_eq!(home.view, View::Home);
    assert_eq!(home.theme, Theme::Dark);
    assert_eq!(home.loading, 0);
    assert_eq!(home.next_more_blocks, Some(0));
    assert_eq!(home.tip_height, None);

    driver.follow("/tx/aa");
    let tx = driver.latest();
    assert_eq!(tx.view, View::Tx);
    assert_eq!(tx.tip_height, Some(100));
    assert_eq!(tx.loading, 0);

    driver.send(EventKind::Click(ClickAction::ToggleTx(Txid::from("aa"))));
    let expanded = driver.latest();
    assert_eq!(expanded.open_tx, Some(Txid::from("aa")));
    assert!(expanded.spends.contains_key(&Txid::from("aa")));
    assert!(driver.router.current().expand_flag());

    driver.back();
    let back_home = driver.latest();
    assert_eq!(back_home.view, View::Home);
    assert_eq!(back_home.open_tx, None);
    assert!(back_home.spends.is_empty());
    assert_eq!(driver.scrolls, 2);
}

#[test]
fn late_replies_never_reach_the_new_page() {
    let mut driver = Driver::new("/");
    driver.hold = true;

    driver.follow("/tx/aa");
    driver.follow("/tx/bb");
    assert_eq!(driver.core.loading(), 2);

    driver.release_all();
    let snapshot = driver.latest();
    assert_eq!(snapshot.loading, 0);
    assert_eq!(snapshot.view, View::Tx);
    assert_eq!(snapshot.tx.as_ref().map(|tx| tx.txid.as_str()), Some("bb"));
    assert_eq!(snapshot.title.as_deref(), Some("Transaction: bb"));
}

#[test]
fn missing_pages_error_out_and_recover_on_navigation() {
    let mut driver = Driver::new("/tx/zz");
    let snapshot = driver.latest();
    assert_eq!(snapshot.view, View::Error);
    assert_eq!(snapshot.error.as_deref(), Some("HTTP 404: not found"));
    assert_eq!(snapshot.loading, 0);

    driver.follow("/");
    assert_eq!(driver.latest().view, View::Home);
    assert_eq!(driver.latest().error, None);
}

#[test]
fn background_failures_stay_invisible() {
    let mut driver = Driver::new("/");
    driver
        .api
        .insert("/blocks/tip/height".to_string(), Err(FetchFailure::http(503, "down")));

    driver.follow("/tx/aa");
    let snapshot = driver.latest();
    assert_eq!(snapshot.view, View::Tx);
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.tip_height, None);
}

#[test]
fn response_log_filters_by_category_and_error_channel() {
    let mut driver = Driver::new("/");
    driver
        .api
        .insert("/blocks/tip/height".to_string(), Err(FetchFailure::http(503, "down")));
    driver.follow("/tx/zz");

    assert_eq!(select(&driver.envelopes, Some(Category::Blocks)).count(), 1);
    assert_eq!(select(&driver.envelopes, Some(Category::Tx)).count(), 1);
    assert_eq!(select(&driver.envelopes, None).count(), driver.envelopes.len());
    assert_eq!(
        error_messages(&driver.envelopes).collect::<Vec<_>>(),
        vec!["HTTP 404: not found".to_string()]
    );
    assert_eq!(driver.latest().error.as_deref(), Some("HTTP 404: not found"));
}

#[test]
fn unmatched_paths_are_not_found_without_requests() {
    let mut driver = Driver::new("/");
    let before = driver.snapshots.len();
    driver.follow("/block-height/not-a-number");

    assert_eq!(driver.snapshots.len(), before + 1);
    assert_eq!(driver.latest().view, View::NotFound);
    assert_eq!(driver.latest().page, {
        let mut location = Location::parse("/block-height/not-a-number");
        location.key = driver.router.current().key;
        location
    });
}
