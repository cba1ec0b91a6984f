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

//! Plugin-facing module declarations.
//!
//! A plugin describes the assets it overrides by implementing
//! [`ResourceModule`] (or by building a [`ModuleDeclaration`]) and handing it
//! to the registry together with a [`ModuleIdentity`]. Modules are plain
//! declarations: nothing here loads or caches anything.

mod declaration;
mod identity;
mod processor;

pub use declaration::*;
pub use identity::*;
pub use processor::*;

use std::collections::HashMap;

/// The capability a plugin implements to declare asset overrides.
///
/// Every method has an empty default so a module only overrides the kinds of
/// assets it actually touches. Relative paths are interpreted against the
/// directory reported by the module's [`ModuleIdentity`].
pub trait ResourceModule: Send + Sync {
    /// Human-readable module name. Also prefixes synthesized bundle keys.
    fn name(&self) -> &str;

    /// Higher values win conflicts under the priority policy.
    fn priority(&self) -> i32 {
        0
    }

    /// Sprite name → relative image path.
    fn sprites(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Texture name → relative image path.
    fn textures(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Text asset name → transform, applied in the returned order.
    fn text_processors(&self) -> Vec<(String, TextProcessor)> {
        Vec::new()
    }

    /// Relative paths of bundle folders. Each subfolder of a bundle folder
    /// holds one primary data file and an optional preview image.
    fn bundle_folders(&self) -> Vec<String> {
        Vec::new()
    }

    /// Text resource name → relative folder of fragment files to merge into it.
    fn fragment_folders(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Free-form description shown in reports.
    fn description(&self) -> &str {
        ""
    }
}
