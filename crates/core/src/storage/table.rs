use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::watchlist::Watchlist;

/// In-memory watchlist table shared by the store implementations.
///
/// Rows keep insertion order. The default watchlist is always present and
/// can be neither renamed nor removed; removing it is a no-op.
#[derive(Debug, Clone)]
pub struct WatchlistTable {
    rows: Vec<Watchlist>,
    next_id: i64,
}

impl WatchlistTable {
    /// A table holding only the default watchlist.
    pub fn new() -> Self {
        Self {
            rows: vec![Watchlist::default_watchlist().with_id(1)],
            next_id: 2,
        }
    }

    /// Rebuild a table from persisted rows.
    ///
    /// Missing ids are assigned, and the default watchlist is added in front
    /// if the rows do not contain it.
    pub fn from_rows(rows: Vec<Watchlist>) -> Result<Self, CoreError> {
        {
            let mut seen = HashSet::new();
            for row in &rows {
                if !seen.insert(row.name.as_str()) {
                    return Err(CoreError::InvalidStoreFile(format!(
                        "duplicate watchlist name: {}",
                        row.name
                    )));
                }
            }
        }

        let mut table = Self {
            next_id: rows.iter().map(|w| w.id).max().unwrap_or(0) + 1,
            rows,
        };

        if !table.rows.iter().any(Watchlist::is_default_watchlist) {
            let id = table.take_id();
            table
                .rows
                .insert(0, Watchlist::default_watchlist().with_id(id));
        }
        for i in 0..table.rows.len() {
            if table.rows[i].id == 0 {
                table.rows[i].id = table.take_id();
            }
            if table.rows[i].is_default_watchlist() {
                table.rows[i].is_default = true;
            }
        }

        Ok(table)
    }

    pub fn rows(&self) -> &[Watchlist] {
        &self.rows
    }

    pub fn snapshot(&self) -> Vec<Watchlist> {
        self.rows.clone()
    }

    pub fn get(&self, name: &str) -> Option<&Watchlist> {
        self.rows.iter().find(|w| w.name == name)
    }

    /// Insert a new watchlist and return the stored row.
    pub fn insert(&mut self, watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        let name = Self::validated_name(&watchlist.name)?;
        if self.get(&name).is_some() {
            return Err(CoreError::DuplicateWatchlist(name));
        }

        let id = self.take_id();
        let stored = Watchlist::new(name).with_id(id);
        self.rows.push(stored.clone());
        Ok(stored)
    }

    /// Rename the row stored under `previous_name` to `watchlist.name`.
    pub fn rename(&mut self, previous_name: &str, watchlist: &Watchlist) -> Result<(), CoreError> {
        let name = Self::validated_name(&watchlist.name)?;
        let idx = self
            .rows
            .iter()
            .position(|w| w.name == previous_name)
            .ok_or_else(|| CoreError::WatchlistNotFound(previous_name.to_string()))?;

        if self.rows[idx].is_default_watchlist() {
            return Err(CoreError::InvalidWatchlist(
                "the default watchlist cannot be renamed".into(),
            ));
        }
        if name != previous_name && self.get(&name).is_some() {
            return Err(CoreError::DuplicateWatchlist(name));
        }

        self.rows[idx].name = name;
        Ok(())
    }

    /// Remove a watchlist by name. Returns `false` when the row was the
    /// default watchlist and therefore kept.
    pub fn remove(&mut self, watchlist: &Watchlist) -> Result<bool, CoreError> {
        let idx = self
            .rows
            .iter()
            .position(|w| w.name == watchlist.name)
            .ok_or_else(|| CoreError::WatchlistNotFound(watchlist.name.clone()))?;

        if self.rows[idx].is_default_watchlist() {
            return Ok(false);
        }

        self.rows.remove(idx);
        Ok(true)
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn validated_name(name: &str) -> Result<String, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidWatchlist(
                "watchlist name must not be empty".into(),
            ));
        }
        Ok(trimmed.to_string())
    }
}

impl Default for WatchlistTable {
    fn default() -> Self {
        Self::new()
    }
}
