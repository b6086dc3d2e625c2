//! Bounded in-memory log stores
//!
//! A [`LogStore`] is a ring buffer that keeps the most recent `capacity`
//! entries: appending past the cap evicts the oldest entries first.
//! [`LogStores`] bundles one store per log type behind `RwLock`s so the
//! HTTP handlers can share them.

use crate::log_entry::{ClickLog, ClientLog, SearchLog};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Largest capacity a single store accepts
pub const MAX_STORE_CAPACITY: usize = 1_000_000;

// entries beyond this are allocated as the store fills
const INITIAL_ALLOCATION: usize = 256;

/// FIFO-evicting store holding at most `capacity` entries
#[derive(Debug, Clone)]
pub struct LogStore<T> {
    entries: VecDeque<T>,
    capacity: usize,
    total_appended: u64,
    total_evicted: u64,
}

impl<T> LogStore<T> {
    /// Create an empty store; `capacity` must be in `1..=MAX_STORE_CAPACITY`
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_STORE_CAPACITY {
            return Err(Error::InvalidCapacity(capacity));
        }

        Ok(Self {
            entries: VecDeque::with_capacity(capacity.min(INITIAL_ALLOCATION)),
            capacity,
            total_appended: 0,
            total_evicted: 0,
        })
    }

    /// Append an entry, returning how many old entries were evicted
    pub fn append(&mut self, entry: T) -> usize {
        self.entries.push_back(entry);
        self.total_appended += 1;

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.total_evicted += evicted as u64;
        evicted
    }

    /// Append a batch in order, returning the total number evicted
    pub fn extend<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        entries.into_iter().map(|entry| self.append(entry)).sum()
    }

    /// Iterate entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries ever appended, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Number of entries dropped to stay within capacity
    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> LogStore<T> {
    /// Snapshot of all entries, oldest first
    pub fn list(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// Per-type capacities for [`LogStores`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCapacities {
    #[serde(default = "default_search_capacity")]
    pub search_capacity: usize,
    #[serde(default = "default_click_capacity")]
    pub click_capacity: usize,
    #[serde(default = "default_client_capacity")]
    pub client_capacity: usize,
}

fn default_search_capacity() -> usize {
    100
}

fn default_click_capacity() -> usize {
    100
}

fn default_client_capacity() -> usize {
    200
}

impl Default for StoreCapacities {
    fn default() -> Self {
        Self {
            search_capacity: default_search_capacity(),
            click_capacity: default_click_capacity(),
            client_capacity: default_client_capacity(),
        }
    }
}

/// Fill level of one store, used by readiness reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub name: String,
    pub entries: usize,
    pub capacity: usize,
    pub total_appended: u64,
    pub total_evicted: u64,
}

/// The three log stores kept by the service
#[derive(Debug)]
pub struct LogStores {
    search: RwLock<LogStore<SearchLog>>,
    click: RwLock<LogStore<ClickLog>>,
    client: RwLock<LogStore<ClientLog>>,
}

fn poisoned(name: &str) -> Error {
    Error::Internal(format!("{} log store lock poisoned", name))
}

impl LogStores {
    pub fn new(capacities: StoreCapacities) -> Result<Self> {
        Ok(Self {
            search: RwLock::new(LogStore::new(capacities.search_capacity)?),
            click: RwLock::new(LogStore::new(capacities.click_capacity)?),
            client: RwLock::new(LogStore::new(capacities.client_capacity)?),
        })
    }

    pub fn search(&self) -> Result<RwLockReadGuard<'_, LogStore<SearchLog>>> {
        self.search.read().map_err(|_| poisoned("search"))
    }

    pub fn search_mut(&self) -> Result<RwLockWriteGuard<'_, LogStore<SearchLog>>> {
        self.search.write().map_err(|_| poisoned("search"))
    }

    pub fn click(&self) -> Result<RwLockReadGuard<'_, LogStore<ClickLog>>> {
        self.click.read().map_err(|_| poisoned("click"))
    }

    pub fn click_mut(&self) -> Result<RwLockWriteGuard<'_, LogStore<ClickLog>>> {
        self.click.write().map_err(|_| poisoned("click"))
    }

    pub fn client(&self) -> Result<RwLockReadGuard<'_, LogStore<ClientLog>>> {
        self.client.read().map_err(|_| poisoned("client"))
    }

    pub fn client_mut(&self) -> Result<RwLockWriteGuard<'_, LogStore<ClientLog>>> {
        self.client.write().map_err(|_| poisoned("client"))
    }

    /// Fill levels of all three stores
    pub fn statuses(&self) -> Result<Vec<StoreStatus>> {
        fn status<T>(name: &str, store: &LogStore<T>) -> StoreStatus {
            StoreStatus {
                name: name.to_string(),
                entries: store.len(),
                capacity: store.capacity(),
                total_appended: store.total_appended(),
                total_evicted: store.total_evicted(),
            }
        }

        Ok(vec![
            status("search", &*self.search()?),
            status("click", &*self.click()?),
            status("client", &*self.client()?),
        ])
    }
}
