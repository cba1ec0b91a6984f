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

//! Registration-time folder scans.
//!
//! Both scans list directory entries in lexicographic file-name order so that
//! two machines with the same plugin files produce the same results.

mod bundle;
mod fragment;

pub use bundle::*;
pub use fragment::*;

use redux_core::error::{ReduxError, ReduxResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Immediate children of `dir` accepted by `keep`, sorted by file name.
fn sorted_children(dir: &Path, keep: impl Fn(&walkdir::DirEntry) -> bool) -> ReduxResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ReduxError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if keep(&entry) => children.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                log::warn!("[Scan] Skipping unreadable entry under '{}': {e}", path.display());
            }
        }
    }
    Ok(children)
}
