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

use super::Asset;
use crate::error::ReduxError;
use std::error::Error;
use std::path::Path;

/// A trait for types that can decode a specific asset type `A` from raw bytes.
///
/// This is the boundary to the external decode service. Implementations are
/// stateless and never cache.
pub trait AssetLoader<A: Asset> {
    /// Parses a byte slice and converts it into an instance of the asset `A`.
    ///
    /// # Returns
    /// A `Result` containing the decoded asset on success, or a boxed dynamic
    /// error on failure. The error must be thread-safe.
    fn load(&self, bytes: &[u8]) -> Result<A, Box<dyn Error + Send + Sync>>;
}

/// Produces a decoded asset from an absolute filesystem path.
///
/// Override caches are backed by an `AssetSource`; the async decode worker
/// calls the same source from its background thread, hence `Send + Sync`.
pub trait AssetSource<A: Asset>: Send + Sync {
    /// Reads and decodes the file at `path`.
    fn load_path(&self, path: &Path) -> Result<A, ReduxError>;
}
