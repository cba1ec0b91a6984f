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

//! Splicing of pre-extracted array fragments into a host's array text.
//!
//! The merge is structural, not a parse: the host text is assumed to be one
//! top-level array that ends at its last `]`.

use redux_core::module::{text_processor, TextProcessor};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Appends `fragments` as extra elements of the array in `original`.
///
/// Returns `original` unchanged when it is blank, when there is nothing to
/// add, or when it contains no `]` at all.
///
/// # Examples
///
/// ```
/// use redux_data::merge_fragments;
///
/// let merged = merge_fragments("[{\"x\":1}]", &["{\"y\":2}".to_string()]);
/// assert_eq!(merged, "[{\"x\":1},{\"y\":2}]");
/// ```
pub fn merge_fragments(original: &str, fragments: &[String]) -> String {
    if original.trim().is_empty() || fragments.is_empty() {
        return original.to_string();
    }
    let Some(close) = original.rfind(']') else {
        return original.to_string();
    };

    let head = &original[..close];
    let array_is_empty = head
        .trim_end()
        .chars()
        .next_back()
        .map_or(true, |c| c == '[');

    let extra: usize = fragments.iter().map(|f| f.len() + 1).sum();
    let mut merged = String::with_capacity(close + extra + 1);
    merged.push_str(head);
    if !array_is_empty {
        merged.push(',');
    }
    merged.push_str(&fragments.join(","));
    merged.push(']');
    merged
}

/// Fragments to merge, keyed by text resource name.
///
/// Cloning a merger yields another view of the same store; the pipeline stage
/// returned by [`merge_stage`](Self::merge_stage) holds such a view.
#[derive(Debug, Clone, Default)]
pub struct FragmentMerger {
    entries: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl FragmentMerger {
    /// Creates an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragments` to the list of `resource`, keeping their order.
    ///
    /// Returns `true` if `resource` had no fragments before this call, i.e.
    /// when a merge stage still has to be installed for it.
    pub fn add_fragments(&self, resource: &str, fragments: impl IntoIterator<Item = String>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let list = entries.entry(resource.to_string()).or_default();
        let was_empty = list.is_empty();
        list.extend(fragments.into_iter().filter(|f| !f.trim().is_empty()));
        if list.is_empty() {
            entries.remove(resource);
            return false;
        }
        was_empty
    }

    /// Number of fragments stored for `resource`.
    pub fn fragment_count(&self, resource: &str) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .map_or(0, Vec::len)
    }

    /// The fragments stored for `resource`, in merge order.
    pub fn fragments(&self, resource: &str) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of resources with fragments.
    pub fn resource_count(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Merges the fragments of `resource` into `original`.
    pub fn merge(&self, original: &str, resource: &str) -> String {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(resource) {
            Some(fragments) => merge_fragments(original, fragments),
            None => original.to_string(),
        }
    }

    /// A pipeline stage that merges the fragments of `resource`.
    pub fn merge_stage(&self, resource: &str) -> TextProcessor {
        let merger = self.clone();
        let resource = resource.to_string();
        text_processor(move |text| Ok(merger.merge(text, &resource)))
    }

    /// Forgets every fragment.
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
        log::info!("[FragmentMerger] Fragments cleared.");
    }
}
