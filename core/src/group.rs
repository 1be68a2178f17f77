//! Keyed accumulator table used by both aggregators.
//!
//! A None key is a real group (unattributed / unassigned), not a
//! missing value. Iteration follows the order keys were first seeded
//! or touched; callers sort explicitly afterwards.

use crate::types::EntityId;
use std::collections::HashMap;

pub type GroupKey = Option<EntityId>;

#[derive(Debug, Clone)]
pub struct Groups<A> {
    index: HashMap<GroupKey, usize>,
    entries: Vec<(GroupKey, A)>,
}

impl<A: Default> Groups<A> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Accumulator for `key`, created on first use.
    pub fn entry(&mut self, key: Option<&str>) -> &mut A {
        let key: GroupKey = key.map(str::to_string);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), A::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(GroupKey, A)> {
        self.entries
    }
}

impl<A: Default> Default for Groups<A> {
    fn default() -> Self {
        Self::new()
    }
}
