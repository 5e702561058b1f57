use std::sync::Mutex;

use super::*;
use crate::explorer::{CoreOptions, Event, EventKind, ExplorerCore};
use shared::protocol::{Location, PrefKey};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl ScrollSink for Recorder {
    fn scroll_to_top(&self) {
        self.record("scroll".into());
    }
}

impl ClipboardSink for Recorder {
    fn write_text(&self, text: &str) {
        self.record(format!("copy:{text}"));
    }
}

impl AdvisorySink for Recorder {
    fn show(&self, message: &str) {
        self.record(format!("advise:{message}"));
    }
}

struct ViewName;

impl Renderer for ViewName {
    type Tree = String;

    fn render(&self, snapshot: &Snapshot) -> Option<String> {
        Some(format!("{}:{}", snapshot.view.as_str(), snapshot.page.pathname))
    }
}

fn snapshot_for(href: &str) -> Snapshot {
    let mut core = ExplorerCore::new(CoreOptions::default()).expect("core");
    for key in [PrefKey::Lang, PrefKey::Theme] {
        core.handle(Event::now(EventKind::PreferenceLoaded { key, value: None }));
    }
    core.handle(Event::now(EventKind::Navigated(Location::parse(href))))
        .snapshot
        .expect("snapshot")
}

#[test]
fn unkeyed_locations_always_scroll() {
    let mut tracker = ScrollTracker::default();
    assert!(tracker.observe(None));
    assert!(tracker.observe(None));
}

#[test]
fn revisited_keys_keep_their_position() {
    let mut tracker = ScrollTracker::default();
    assert!(tracker.observe(Some("a")));
    assert!(tracker.observe(Some("b")));
    assert!(!tracker.observe(Some("a")));
}

#[test]
fn old_keys_fall_out_of_the_window() {
    let mut tracker = ScrollTracker::default();
    tracker.observe(Some("first"));
    for i in 0..SCROLL_HISTORY {
        tracker.observe(Some(&format!("k{i}")));
    }
    assert!(tracker.observe(Some("first")));
}

#[test]
fn default_effects_are_empty() {
    assert!(Effects::default().is_empty());
    let effects = Effects {
        scroll_to_top: true,
        ..Effects::default()
    };
    assert!(!effects.is_empty());
}

#[test]
fn dispatcher_routes_each_effect_to_its_sink() {
    let recorder = Arc::new(Recorder::default());
    let dispatcher = EffectDispatcher::new(ViewName)
        .with_scroll(recorder.clone())
        .with_clipboard(recorder.clone())
        .with_advisory(recorder.clone());

    let effects = Effects {
        snapshot: Some(snapshot_for("/nope/nope")),
        scroll_to_top: true,
        clipboard: Some("00ab".into()),
        advisory: Some("No results found".into()),
        ..Effects::default()
    };
    let tree = dispatcher.dispatch(&effects);

    assert_eq!(tree.as_deref(), Some("notFound:/nope/nope"));
    assert_eq!(
        recorder.calls(),
        vec!["scroll", "copy:00ab", "advise:No results found"]
    );
}

#[test]
fn dispatcher_without_snapshot_renders_nothing() {
    let dispatcher = EffectDispatcher::new(ViewName);
    let effects = Effects {
        clipboard: Some("x".into()),
        ..Effects::default()
    };
    assert_eq!(dispatcher.dispatch(&effects), None);
}
