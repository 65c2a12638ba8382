// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Runtime service lookup for formatter arguments.

use std::collections::HashMap;

use crate::core::Value;

/// Named lookup of runtime values passed to formatters.
pub trait ServiceLocator {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Option<Value>;
}

/// Map-backed [`ServiceLocator`].
#[derive(Debug, Clone, Default)]
pub struct ServiceMap {
    services: HashMap<String, Value>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, value: Value) -> Self {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.services.insert(id.into(), value);
    }
}

impl ServiceLocator for ServiceMap {
    fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Value> {
        self.services.get(id).cloned()
    }
}
