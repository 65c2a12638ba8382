// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe named registry.
//!
//! Backs the class, enum and formatter registries: entries are registered
//! once while wiring the codec and then looked up during plan building and
//! execution.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::error::{CodecError, Result};

/// Registry of named entries.
///
/// Uses RwLock for concurrent read access with exclusive write access.
pub struct TypeRegistry<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> TypeRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, T>>> {
        self.entries
            .read()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, T>>> {
        self.entries
            .write()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }

    /// Register an entry, replacing any previous one with the same name.
    pub fn register(&self, name: impl Into<String>, entry: T) -> Result<()> {
        self.write()?.insert(name.into(), entry);
        Ok(())
    }

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Result<Option<T>>
    where
        T: Clone,
    {
        Ok(self.read()?.get(name).cloned())
    }

    /// Check if an entry is registered.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Remove an entry.
    pub fn remove(&self, name: &str) -> Result<bool> {
        Ok(self.write()?.remove(name).is_some())
    }

    /// Get the number of registered entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
