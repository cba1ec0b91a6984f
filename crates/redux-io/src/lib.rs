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

//! # Redux IO
//!
//! Everything in the override engine that touches the filesystem: decoding
//! image files, the background decode worker used by bulk refreshes, the
//! bundle and fragment folder scanners run at registration time, and the
//! RON plugin manifest used for explicit module discovery.

pub mod decode_worker;
pub mod image_loader;
pub mod manifest;
pub mod scan;

pub use decode_worker::{DecodeCompletion, DecodeWorker};
pub use image_loader::{FileSource, ImageLoader};
pub use manifest::{DiscoveredModule, ModuleSpec, PluginEntry, PluginManifest};
