//! Calendar override records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single dated override: which schedule applies (or none), and whether
/// the entry survives past its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub schedule: Option<String>,
    pub repeating: bool,
}

/// The full override collection for a room, keyed by the year-agnostic
/// date key (see [`crate::domain::foundation::date_key`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarOverrides(BTreeMap<u32, OverrideEntry>);

impl CalendarOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u32) -> Option<&OverrideEntry> {
        self.0.get(&key)
    }

    pub fn insert(&mut self, key: u32, entry: OverrideEntry) {
        self.0.insert(key, entry);
    }

    pub fn remove(&mut self, key: u32) -> Option<OverrideEntry> {
        self.0.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &OverrideEntry)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &u32> {
        self.0.keys()
    }

    /// Keep only the entries the predicate accepts.
    pub fn retain(&mut self, f: impl FnMut(&u32, &mut OverrideEntry) -> bool) {
        self.0.retain(f);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
