//! The live-instance table: activity id -> live host handle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::host::LiveHandle;
use crate::kind::KindDescriptor;

/// One live activity as the bridge tracks it.
///
/// The descriptor is captured at creation, so re-registering a kind under
/// the same name does not change the schema of activities already live.
#[derive(Debug, Clone)]
pub struct LiveActivity {
    pub id: String,
    pub kind: &'static str,
    pub descriptor: KindDescriptor,
    pub handle: LiveHandle,
    pub started_at: DateTime<Utc>,
}

/// Memory-only table of activities that have not been ended.
#[derive(Debug, Default)]
pub struct ActivityTable {
    entries: HashMap<String, LiveActivity>,
}

impl ActivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new activity. Returns `false` (and leaves the table
    /// untouched) if the id is already live.
    pub fn insert(&mut self, activity: LiveActivity) -> bool {
        if self.entries.contains_key(&activity.id) {
            return false;
        }
        self.entries.insert(activity.id.clone(), activity);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&LiveActivity> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LiveActivity> {
        self.entries.remove(id)
    }

    /// Live ids, oldest first (ties broken by id).
    pub fn ids(&self) -> Vec<String> {
        let mut live: Vec<&LiveActivity> = self.entries.values().collect();
        live.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        live.into_iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
