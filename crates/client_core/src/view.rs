//! Derivation of the visible page from domain values and the loading counter.

use serde::Serialize;

/// Page announced by the first non-empty domain value of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    Home,
    Block,
    Tx,
    Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    Home,
    Block,
    Tx,
    Addr,
    Error,
    Loading,
    NotFound,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Block => "block",
            View::Tx => "tx",
            View::Addr => "addr",
            View::Error => "error",
            View::Loading => "loading",
            View::NotFound => "notFound",
        }
    }
}

impl From<PageKind> for View {
    fn from(kind: PageKind) -> Self {
        match kind {
            PageKind::Home => View::Home,
            PageKind::Block => View::Block,
            PageKind::Tx => View::Tx,
            PageKind::Addr => View::Addr,
        }
    }
}

/// An error for the current navigation supersedes any domain page; without a
/// domain page the view is `loading` while anything is in flight and
/// `notFound` otherwise.
pub fn select_view(domain: Option<PageKind>, error: Option<&str>, loading: u32) -> View {
    if error.is_some() {
        return View::Error;
    }
    match domain {
        Some(kind) => kind.into(),
        None if loading > 0 => View::Loading,
        None => View::NotFound,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
