// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bundled data records loaded at registration time.

use std::collections::HashMap;

/// A bundle record ready for injection into a host-produced list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRecord {
    /// Synthesized `{module}_{folder}` key.
    pub key: String,
    /// Full text of the primary data file.
    pub data: String,
}

/// Bundle records keyed case-insensitively, in first-insertion order.
///
/// Inserting an existing key replaces its data but keeps its position.
#[derive(Debug, Default)]
pub struct BundleStore {
    records: Vec<BundleRecord>,
    index: HashMap<String, usize>,
}

impl BundleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `key`, overwriting any previous record.
    pub fn insert(&mut self, key: &str, data: impl Into<String>) {
        let data = data.into();
        match self.index.get(&key.to_lowercase()) {
            Some(&slot) => {
                log::debug!("[BundleStore] Bundle '{key}' replaced.");
                self.records[slot] = BundleRecord {
                    key: key.to_string(),
                    data,
                };
            }
            None => {
                self.index.insert(key.to_lowercase(), self.records.len());
                self.records.push(BundleRecord {
                    key: key.to_string(),
                    data,
                });
            }
        }
    }

    /// The record stored under `key`.
    pub fn get(&self, key: &str) -> Option<&BundleRecord> {
        self.index
            .get(&key.to_lowercase())
            .and_then(|&slot| self.records.get(slot))
    }

    /// Every record, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BundleRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
