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

//! Converts plugin-relative paths into absolute filesystem paths.

use crate::module::ModuleIdentity;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Resolves paths declared by a module against that module's own directory.
///
/// The resolver holds no state beyond the fallback root used for modules that
/// did not report a directory of their own.
#[derive(Debug, Clone)]
pub struct PathResolver {
    fallback_root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver that falls back to `fallback_root` for modules
    /// without a base directory.
    pub fn new(fallback_root: impl Into<PathBuf>) -> Self {
        Self {
            fallback_root: fallback_root.into(),
        }
    }

    /// Returns the absolute path for `relative`, as declared by `identity`.
    ///
    /// Already-absolute paths are returned unchanged.
    pub fn resolve(&self, relative: &str, identity: &ModuleIdentity) -> PathBuf {
        let normalized = normalize_separators(relative);
        let candidate = Path::new(&normalized);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }
        self.base_dir(identity).join(candidate)
    }

    /// The directory relative paths of `identity` are anchored to.
    pub fn base_dir<'a>(&'a self, identity: &'a ModuleIdentity) -> &'a Path {
        identity.base_dir().unwrap_or(&self.fallback_root)
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        Self::new(root)
    }
}

fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if c == '\\' || c == '/' { MAIN_SEPARATOR } else { c })
        .collect()
}
