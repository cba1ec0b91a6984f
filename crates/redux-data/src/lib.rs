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

//! # Redux Data
//!
//! The in-memory stores the registry writes into and the interception layer
//! reads from: one [`OverrideCache`] per image kind, the [`TextPipeline`],
//! the [`FragmentMerger`], the [`BundleStore`], and the [`OverrideContext`]
//! that owns them all for one process.

pub mod asset;
pub mod bundle;
pub mod context;
pub mod fragment;
pub mod override_cache;
pub mod text_pipeline;

pub use asset::{OverrideAsset, Sprite, Texture};
pub use bundle::{BundleRecord, BundleStore};
pub use context::{ClearReport, OverrideContext};
pub use fragment::{merge_fragments, FragmentMerger};
pub use override_cache::OverrideCache;
pub use text_pipeline::{InstanceId, TextPipeline, TextResolution};
