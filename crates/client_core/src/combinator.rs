//! Latest-value combination of a fixed set of named inputs.
//!
//! Inputs are registered up front and return a typed [`Input`] handle. Once
//! any value has been pushed the set is sealed. A snapshot is due on every
//! update, but only after every registered input has produced at least one
//! value; until then updates are stored and nothing is emitted.

use std::{
    any::Any,
    fmt,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::warn;

use crate::error::CombinatorError;

static NEXT_COMBINATOR_ID: AtomicU64 = AtomicU64::new(1);

pub struct Input<T> {
    owner: u64,
    index: usize,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Input<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Input<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Input<T> {}

impl<T> fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

struct Slot {
    name: &'static str,
    value: Option<Box<dyn Any + Send>>,
    updates: u64,
}

pub struct Combinator {
    id: u64,
    slots: Vec<Slot>,
    sealed: bool,
    dirty: bool,
    emitted: u64,
}

impl Default for Combinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Combinator {
    pub fn new() -> Self {
        Self {
            id: NEXT_COMBINATOR_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            sealed: false,
            dirty: false,
            emitted: 0,
        }
    }

    pub fn input<T: Send + 'static>(
        &mut self,
        name: &'static str,
    ) -> Result<Input<T>, CombinatorError> {
        if self.sealed {
            return Err(CombinatorError::Sealed(name));
        }
        if self.slots.iter().any(|slot| slot.name == name) {
            return Err(CombinatorError::DuplicateInput(name));
        }
        self.slots.push(Slot {
            name,
            value: None,
            updates: 0,
        });
        Ok(Input {
            owner: self.id,
            index: self.slots.len() - 1,
            name,
            _marker: PhantomData,
        })
    }

    /// Stores `value` and reports whether a snapshot is due.
    pub fn push<T: Send + 'static>(&mut self, input: &Input<T>, value: T) -> bool {
        self.stage(input, value);
        self.commit()
    }

    /// Stores `value` without emitting; see [`Combinator::commit`].
    pub fn stage<T: Send + 'static>(&mut self, input: &Input<T>, value: T) {
        if self.store(input, value) {
            self.dirty = true;
        }
    }

    /// Reports whether the updates staged since the last commit produce a
    /// snapshot. At most one snapshot is due per commit.
    pub fn commit(&mut self) -> bool {
        let dirty = std::mem::take(&mut self.dirty);
        dirty && self.emit_if_primed()
    }

    /// Groups several updates so they produce at most one snapshot.
    pub fn batch(&mut self) -> Batch<'_> {
        Batch { combinator: self }
    }

    pub fn get<T: 'static>(&self, input: &Input<T>) -> Option<&T> {
        if input.owner != self.id {
            return None;
        }
        self.slots
            .get(input.index)?
            .value
            .as_ref()?
            .downcast_ref::<T>()
    }

    pub fn is_primed(&self) -> bool {
        self.slots.iter().all(|slot| slot.value.is_some())
    }

    /// Names of inputs that have not produced a value yet.
    pub fn pending(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .filter(|slot| slot.value.is_none())
            .map(|slot| slot.name)
            .collect()
    }

    /// Number of values pushed to `input` so far.
    pub fn updates<T>(&self, input: &Input<T>) -> u64 {
        if input.owner != self.id {
            return 0;
        }
        self.slots.get(input.index).map_or(0, |slot| slot.updates)
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn store<T: Send + 'static>(&mut self, input: &Input<T>, value: T) -> bool {
        if input.owner != self.id {
            warn!(input = input.name, "ignoring value for input of another combinator");
            return false;
        }
        let Some(slot) = self.slots.get_mut(input.index) else {
            return false;
        };
        slot.value = Some(Box::new(value));
        slot.updates += 1;
        self.sealed = true;
        true
    }

    fn emit_if_primed(&mut self) -> bool {
        if !self.is_primed() {
            return false;
        }
        self.emitted += 1;
        true
    }
}

pub struct Batch<'a> {
    combinator: &'a mut Combinator,
}

impl Batch<'_> {
    pub fn set<T: Send + 'static>(&mut self, input: &Input<T>, value: T) -> &mut Self {
        self.combinator.stage(input, value);
        self
    }

    pub fn get<T: 'static>(&self, input: &Input<T>) -> Option<&T> {
        self.combinator.get(input)
    }

    /// Reports whether the batch produced a snapshot.
    pub fn commit(self) -> bool {
        self.combinator.commit()
    }
}

#[cfg(test)]
#[path = "tests/combinator_tests.rs"]
mod tests;
