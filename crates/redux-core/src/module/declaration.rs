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

use super::{NamedProcessor, ResourceModule, TextProcessor};
use std::collections::HashMap;

/// A plain-data [`ResourceModule`] assembled with a builder.
///
/// Code plugins that do not need a custom type, and manifest-described
/// modules, both end up as a `ModuleDeclaration`.
///
/// # Examples
///
/// ```
/// use redux_core::module::{infallible_processor, ModuleDeclaration, ResourceModule};
///
/// let module = ModuleDeclaration::new("hd-ui")
///     .with_priority(10)
///     .with_sprite("btn_ok", "Assets/ok.png")
///     .with_processor("strings", infallible_processor(|t| t.replace("Hi", "Hello")));
///
/// assert_eq!(module.name(), "hd-ui");
/// assert_eq!(module.sprites().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleDeclaration {
    name: String,
    priority: i32,
    description: String,
    sprites: HashMap<String, String>,
    textures: HashMap<String, String>,
    processors: Vec<NamedProcessor>,
    bundle_folders: Vec<String>,
    fragment_folders: HashMap<String, String>,
}

impl ModuleDeclaration {
    /// Starts an empty declaration named `name` with priority 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the conflict priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a sprite override.
    pub fn with_sprite(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.sprites.insert(name.into(), path.into());
        self
    }

    /// Declares a texture override.
    pub fn with_texture(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.textures.insert(name.into(), path.into());
        self
    }

    /// Appends a text processor for `target`.
    pub fn with_processor(mut self, target: impl Into<String>, processor: TextProcessor) -> Self {
        self.processors.push(NamedProcessor {
            target: target.into(),
            processor,
        });
        self
    }

    /// Declares a bundle folder.
    pub fn with_bundle_folder(mut self, folder: impl Into<String>) -> Self {
        self.bundle_folders.push(folder.into());
        self
    }

    /// Declares a fragment folder merged into the text resource `resource`.
    pub fn with_fragment_folder(
        mut self,
        resource: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        self.fragment_folders.insert(resource.into(), folder.into());
        self
    }
}

impl ResourceModule for ModuleDeclaration {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn sprites(&self) -> HashMap<String, String> {
        self.sprites.clone()
    }

    fn textures(&self) -> HashMap<String, String> {
        self.textures.clone()
    }

    fn text_processors(&self) -> Vec<(String, TextProcessor)> {
        self.processors
            .iter()
            .map(|p| (p.target.clone(), p.processor.clone()))
            .collect()
    }

    fn bundle_folders(&self) -> Vec<String> {
        self.bundle_folders.clone()
    }

    fn fragment_folders(&self) -> HashMap<String, String> {
        self.fragment_folders.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::infallible_processor;

    #[test]
    fn test_builder_collects_every_kind() {
        let module = ModuleDeclaration::new("pack")
            .with_priority(3)
            .with_sprite("a", "a.png")
            .with_texture("t", "t.png")
            .with_processor("txt", infallible_processor(|s| s.to_uppercase()))
            .with_bundle_folder("Bundles")
            .with_fragment_folder("build", "Data/build");

        assert_eq!(module.priority(), 3);
        assert_eq!(module.sprites().get("a").map(String::as_str), Some("a.png"));
        assert_eq!(module.textures().len(), 1);
        assert_eq!(module.bundle_folders(), vec!["Bundles".to_string()]);
        assert_eq!(
            module.fragment_folders().get("build").map(String::as_str),
            Some("Data/build")
        );

        let processors = module.text_processors();
        assert_eq!(processors.len(), 1);
        assert_eq!((processors[0].1)("abc").unwrap(), "ABC");
    }

    #[test]
    fn test_defaults_are_empty() {
        struct Bare;
        impl ResourceModule for Bare {
            fn name(&self) -> &str {
                "bare"
            }
        }

        let bare = Bare;
        assert_eq!(bare.priority(), 0);
        assert!(bare.sprites().is_empty());
        assert!(bare.text_processors().is_empty());
        assert!(bare.description().is_empty());
    }
}
