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

//! # Redux Agents
//!
//! The two actors that drive the override stores: the [`ModuleRegistry`],
//! sole writer of every cache, and the [`RefreshCoordinator`], which re-applies
//! cached overrides across the host's live objects after a debounce.

pub mod refresh;
pub mod registry;

pub use refresh::{
    BoundAsset, OverrideTarget, Population, RefreshCoordinator, RefreshState, RefreshStats,
    TargetKind,
};
pub use registry::{ModuleRecord, ModuleRegistry};
