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

//! # Redux Core
//!
//! Foundational crate containing the contracts shared by every layer of the
//! asset override engine: asset handles and identities, the decode service
//! interface, plugin module declarations, path resolution, configuration and
//! the error taxonomy.

#![warn(missing_docs)]

pub mod asset;
pub mod config;
pub mod error;
pub mod event;
pub mod module;
pub mod path;

pub use config::{ConflictPolicy, ReduxConfig};
pub use error::{ReduxError, ReduxResult};
pub use path::PathResolver;
