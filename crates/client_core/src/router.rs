//! In-memory browser-style history.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::protocol::{Location, NavCommand, NavMode};

/// Applies navigation commands and reports locations the core must see.
pub trait Router: Send + Sync {
    fn current(&self) -> Location;

    /// New location to feed back as a navigation event, or `None` when the
    /// command only rewrites the address.
    fn apply(&self, command: &NavCommand) -> Option<Location>;

    /// Steps back one entry, keeping that entry's key.
    fn back(&self) -> Option<Location>;

    fn forward(&self) -> Option<Location>;
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    index: usize,
    next_key: u64,
}

impl History {
    fn key(&mut self) -> String {
        self.next_key += 1;
        format!("{:08x}", self.next_key)
    }
}

#[derive(Debug)]
pub struct HistoryRouter {
    history: Mutex<History>,
}

impl HistoryRouter {
    pub fn new(initial_href: &str) -> Self {
        let mut history = History {
            entries: Vec::new(),
            index: 0,
            next_key: 0,
        };
        let key = history.key();
        history
            .entries
            .push(Location::parse(initial_href).with_key(key));
        Self {
            history: Mutex::new(history),
        }
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl Router for HistoryRouter {
    fn current(&self) -> Location {
        let history = self.lock();
        history.entries[history.index].clone()
    }

    fn apply(&self, command: &NavCommand) -> Option<Location> {
        let mut history = self.lock();
        let index = history.index;
        let key = match command.mode {
            // A silent rewrite keeps the entry's identity.
            NavMode::Replace if command.suppress_side_effects => history.entries[index].key.clone(),
            _ => Some(history.key()),
        };
        let location = Location {
            pathname: command.pathname.clone(),
            query: command.query.clone(),
            key,
        };
        match command.mode {
            NavMode::Push => {
                history.entries.truncate(index + 1);
                history.entries.push(location.clone());
                history.index = index + 1;
            }
            NavMode::Replace => history.entries[index] = location.clone(),
        }
        (!command.suppress_side_effects).then_some(location)
    }

    fn back(&self) -> Option<Location> {
        let mut history = self.lock();
        let index = history.index.checked_sub(1)?;
        history.index = index;
        Some(history.entries[index].clone())
    }

    fn forward(&self) -> Option<Location> {
        let mut history = self.lock();
        let index = history.index + 1;
        let location = history.entries.get(index)?.clone();
        history.index = index;
        Some(location)
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
