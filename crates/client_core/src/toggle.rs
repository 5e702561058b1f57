//! At-most-one expanded item per entity kind, mirrored into `?expand`.

use shared::protocol::{with_expand, Location, NavCommand, NavMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandController<Id> {
    expanded: Option<Id>,
}

impl<Id> Default for ExpandController<Id> {
    fn default() -> Self {
        Self { expanded: None }
    }
}

impl<Id: PartialEq> ExpandController<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<&Id> {
        self.expanded.as_ref()
    }

    /// Collapses `id` if it is the expanded item, otherwise expands it.
    pub fn toggle(&mut self, id: Id) -> Option<&Id> {
        if self.expanded.as_ref() == Some(&id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id);
        }
        self.expanded.as_ref()
    }

    /// Full-page navigation collapses everything.
    pub fn navigate(&mut self) {
        self.expanded = None;
    }

    /// Expansion requested by the navigation target itself.
    pub fn deep_link(&mut self, id: Id) {
        self.expanded = Some(id);
    }
}

/// History-replace command that brings `?expand` in line with `expanded`, or
/// `None` when the location already agrees.
pub fn mirror_expand(expanded: bool, location: &Location) -> Option<NavCommand> {
    if location.expand_flag() == expanded {
        return None;
    }
    Some(NavCommand {
        mode: NavMode::Replace,
        pathname: location.pathname.clone(),
        query: with_expand(&location.query, expanded),
        suppress_side_effects: true,
    })
}

#[cfg(test)]
#[path = "tests/toggle_tests.rs"]
mod tests;
