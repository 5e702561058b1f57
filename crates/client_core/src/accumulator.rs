//! Reducers over ordered streams of named state transforms.
//!
//! Two state shapes are used by the explorer: an optional list (`None` until
//! the first page of items arrives, used for paginated lists) and a keyed
//! cache. Both are only ever changed by applying a [`Transform`], so replaying
//! the same transforms from the same initial state always yields the same
//! final state.

use std::{collections::HashMap, hash::Hash};

/// `None` means "nothing loaded for the current page".
pub type ListState<T> = Option<Vec<T>>;

pub trait Transform<S> {
    fn apply(self, state: S) -> S;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTransform<T> {
    /// Extends the list, treating an unloaded list as empty.
    Append(Vec<T>),
    Replace(Vec<T>),
    Reset,
}

impl<T> Transform<ListState<T>> for ListTransform<T> {
    fn apply(self, state: ListState<T>) -> ListState<T> {
        match self {
            ListTransform::Append(items) => {
                let mut list = state.unwrap_or_default();
                list.extend(items);
                Some(list)
            }
            ListTransform::Replace(items) => Some(items),
            ListTransform::Reset => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheTransform<K, V> {
    MergeKey(K, V),
    Reset,
}

impl<K: Eq + Hash, V> Transform<HashMap<K, V>> for CacheTransform<K, V> {
    fn apply(self, mut state: HashMap<K, V>) -> HashMap<K, V> {
        match self {
            CacheTransform::MergeKey(key, value) => {
                state.insert(key, value);
                state
            }
            CacheTransform::Reset => HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Accumulator<S> {
    state: S,
    applied: u64,
}

impl<S: Default> Accumulator<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            applied: 0,
        }
    }

    pub fn apply<T: Transform<S>>(&mut self, transform: T) -> &S {
        let state = std::mem::take(&mut self.state);
        self.state = transform.apply(state);
        self.applied += 1;
        &self.state
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Number of transforms applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: Default> Default for Accumulator<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Yields the state after each transform, in order.
pub fn scan<S, T, I>(initial: S, transforms: I) -> impl Iterator<Item = S>
where
    S: Clone,
    T: Transform<S>,
    I: IntoIterator<Item = T>,
{
    transforms.into_iter().scan(initial, |state, transform| {
        let next = transform.apply(state.clone());
        *state = next.clone();
        Some(next)
    })
}

/// Final state after applying every transform.
pub fn replay<S, T, I>(initial: S, transforms: I) -> S
where
    T: Transform<S>,
    I: IntoIterator<Item = T>,
{
    transforms
        .into_iter()
        .fold(initial, |state, transform| transform.apply(state))
}

#[cfg(test)]
#[path = "tests/accumulator_tests.rs"]
mod tests;
