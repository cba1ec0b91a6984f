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

//! Provides the foundational traits and primitive types for the override asset system.
//!
//! This module defines the "common language" for all override-related asset
//! operations. It has no knowledge of how overrides are declared or cached; it
//! only describes what a materialized asset is and how bytes on disk become one.
//!
//! The key components are:
//! - The [`Asset`] trait: a marker for all types that can be handed out by a cache.
//! - [`AssetHandle`] and [`AssetId`]: shared ownership plus a stable identity used
//!   for "already bound" checks.
//! - [`AssetLoader`] and [`AssetSource`]: the external decode service boundary.

mod bitmap;
mod handle;
mod loader;

pub use bitmap::*;
pub use handle::*;
pub use loader::*;

/// A marker trait for types that can be managed by the override caches.
///
/// The supertraits enforce that decoded data can be produced on a background
/// decode thread and handed back to the logical thread that owns the caches.
///
/// # Examples
///
/// ```
/// use redux_core::asset::Asset;
///
/// struct Glyph {
///     // ... fields
/// }
///
/// impl Asset for Glyph {}
/// ```
pub trait Asset: Send + Sync + 'static {}
