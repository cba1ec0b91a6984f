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

//! Runtime configuration for the override engine.
//!
//! Configuration is stored as RON. Every field has a default, so a partial
//! file (or no file at all) is valid.

use crate::error::{ReduxError, ReduxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How contested override keys are settled between modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Each module pushes its overrides once, when it registers. The module
    /// registered last wins a contested key, whatever its priority.
    #[default]
    LastRegistered,
    /// After every registration all modules are re-pushed in ascending
    /// priority order, so the highest priority wins. Equal priorities are
    /// settled in favour of the later registration.
    Priority,
}

/// Tunables for registration, preloading and refresh scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduxConfig {
    /// Quiet period after the last refresh request before a scan starts.
    pub refresh_debounce_ms: u64,
    /// Number of objects a scan visits before yielding back to the host.
    pub scan_chunk_size: usize,
    /// Optional wall-clock budget per scan slice.
    pub scan_slice_budget_ms: Option<u64>,
    /// Primary data file looked up in every bundle subfolder.
    pub bundle_primary_file: String,
    /// Optional preview image looked up next to the primary file.
    pub bundle_preview_file: String,
    /// Extension (without dot) of files collected from fragment folders.
    pub fragment_extension: String,
    /// Conflict resolution between modules declaring the same key.
    pub conflict_policy: ConflictPolicy,
}

impl Default for ReduxConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: 500,
            scan_chunk_size: 500,
            scan_slice_budget_ms: None,
            bundle_primary_file: "blueprint.json".to_string(),
            bundle_preview_file: "preview.png".to_string(),
            fragment_extension: "json".to_string(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl ReduxConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> ReduxResult<Self> {
        let config: Self = ron::from_str(text).map_err(|e| ReduxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> ReduxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReduxError::io(path, e))?;
        let config = Self::from_ron_str(&text)?;
        log::info!("[Config] Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    /// The debounce delay as a [`Duration`].
    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    /// The per-slice scan budget as a [`Duration`], if any.
    pub fn scan_slice_budget(&self) -> Option<Duration> {
        self.scan_slice_budget_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> ReduxResult<()> {
        if self.scan_chunk_size == 0 {
            return Err(ReduxError::Config(
                "scan_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.bundle_primary_file.trim().is_empty() {
            return Err(ReduxError::Config(
                "bundle_primary_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
