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

use std::fmt;
use std::path::{Path, PathBuf};

/// Where a module comes from.
///
/// `source` is the fully-qualified identity of the plugin that supplied the
/// module (for example its binary name and version); the registry accepts one
/// registration per source per epoch. `base_dir` anchors the module's
/// relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    source: String,
    base_dir: Option<PathBuf>,
}

impl ModuleIdentity {
    /// An identity whose relative paths resolve against `base_dir`.
    pub fn new(source: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// An identity without a directory of its own.
    pub fn detached(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            base_dir: None,
        }
    }

    /// The fully-qualified source identity.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The module's own directory, if it has one.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
