//! In-process cache of list responses
//!
//! Entries are keyed by data type and query parameters. A mutation marks
//! every entry of its data type stale so the next read refetches.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;

use super::envelope::Page;
use super::query::QueryKey;
use crate::models::DataType;

/// Entries older than this are refetched even when not invalidated
pub const DEFAULT_MAX_AGE_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct CacheEntry {
    page: Page<Value>,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    max_age: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_MAX_AGE_SECS))
    }
}

impl QueryCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    /// A fresh cached page, if there is one
    pub fn get(&self, key: &QueryKey) -> Option<&Page<Value>> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<&Page<Value>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.stale && now - entry.fetched_at <= self.max_age)
            .map(|entry| &entry.page)
    }

    pub fn insert(&mut self, key: QueryKey, page: Page<Value>) {
        self.insert_at(key, page, Utc::now());
    }

    fn insert_at(&mut self, key: QueryKey, page: Page<Value>, fetched_at: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                page,
                fetched_at,
                stale: false,
            },
        );
    }

    /// Mark every entry of a data type stale; returns how many were affected
    pub fn invalidate(&mut self, data_type: DataType) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.data_type == data_type && !entry.stale {
                entry.stale = true;
                count += 1;
            }
        }
        count
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).map(|e| e.stale).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
