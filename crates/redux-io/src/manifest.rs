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

//! Explicit plugin discovery through a RON manifest.
//!
//! The manifest lists plugins by identity and root directory. A plugin's
//! module is either described inline or in its own RON file under the
//! plugin root. Such manifest modules are data-only: they can declare every
//! kind of override except text processors, which need code.
//!
//! ```ron
//! (
//!     plugins: [
//!         (
//!             identity: "hd-ui@1.2.0",
//!             root: "plugins/hd-ui",
//!             module: Inline((
//!                 name: "HdUi",
//!                 priority: 5,
//!                 sprites: { "btn_ok": "Assets/ok.png" },
//!             )),
//!         ),
//!         (
//!             identity: "decor@0.3.0",
//!             root: "plugins/decor",
//!             module: File("module.ron"),
//!         ),
//!     ],
//! )
//! ```

use redux_core::error::{ReduxError, ReduxResult};
use redux_core::module::{ModuleDeclaration, ModuleIdentity, ResourceModule};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A data-only module declaration as written in RON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    /// Module name; the plugin identity is used when empty.
    pub name: String,
    /// Conflict priority.
    pub priority: i32,
    /// Free-form description.
    pub description: String,
    /// Sprite name → relative image path.
    pub sprites: HashMap<String, String>,
    /// Texture name → relative image path.
    pub textures: HashMap<String, String>,
    /// Relative bundle folder paths.
    pub bundle_folders: Vec<String>,
    /// Text resource name → relative fragment folder.
    pub fragment_folders: HashMap<String, String>,
}

impl ModuleSpec {
    /// Parses a module file.
    pub fn from_ron_str(text: &str, origin: &Path) -> ReduxResult<Self> {
        ron::from_str(text).map_err(|e| ReduxError::Manifest {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Converts this data-only module into a registrable declaration.
    pub fn into_declaration(self, fallback_name: &str) -> ModuleDeclaration {
        let name = if self.name.trim().is_empty() {
            fallback_name.to_string()
        } else {
            self.name
        };

        let mut module = ModuleDeclaration::new(name)
            .with_priority(self.priority)
            .with_description(self.description);
        for (key, path) in self.sprites {
            module = module.with_sprite(key, path);
        }
        for (key, path) in self.textures {
            module = module.with_texture(key, path);
        }
        for folder in self.bundle_folders {
            module = module.with_bundle_folder(folder);
        }
        for (resource, folder) in self.fragment_folders {
            module = module.with_fragment_folder(resource, folder);
        }
        module
    }
}

/// Where a plugin's module declaration lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleSource {
    /// Declared directly in the manifest.
    Inline(ModuleSpec),
    /// Declared in a RON file, relative to the plugin root.
    File(PathBuf),
}

fn enabled_by_default() -> bool {
    true
}

/// One plugin listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Fully-qualified plugin identity.
    pub identity: String,
    /// Plugin directory, relative to the manifest file unless absolute.
    pub root: PathBuf,
    /// Disabled plugins are listed but never discovered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// The module the plugin contributes.
    pub module: ModuleSource,
}

/// A module found by [`PluginManifest::discover`].
///
/// `module` is `None` when the plugin's module file could not be loaded; the
/// registry logs and skips such entries.
pub struct DiscoveredModule {
    /// Where the module comes from.
    pub identity: ModuleIdentity,
    /// The module, if it could be loaded.
    pub module: Option<Box<dyn ResourceModule>>,
}

/// The list of plugins to register, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugins in registration order.
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl PluginManifest {
    /// Parses a manifest whose relative roots resolve against `base_dir`.
    pub fn from_ron_str(text: &str, base_dir: impl Into<PathBuf>) -> ReduxResult<Self> {
        let base_dir = base_dir.into();
        let mut manifest: Self = ron::from_str(text).map_err(|e| ReduxError::Manifest {
            path: base_dir.clone(),
            message: e.to_string(),
        })?;
        manifest.base_dir = base_dir;
        Ok(manifest)
    }

    /// Loads a manifest file; relative roots resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> ReduxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReduxError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = Self::from_ron_str(&text, base_dir).map_err(|e| match e {
            ReduxError::Manifest { message, .. } => ReduxError::Manifest {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::info!(
            "[Manifest] Loaded '{}' with {} plugin(s).",
            path.display(),
            manifest.plugins.len()
        );
        Ok(manifest)
    }

    /// Materializes the enabled plugins into registrable modules.
    pub fn discover(&self) -> Vec<DiscoveredModule> {
        self.plugins
            .iter()
            .filter(|entry| {
                if !entry.enabled {
                    log::info!("[Manifest] Plugin '{}' is disabled, skipping.", entry.identity);
                }
                entry.enabled
            })
            .map(|entry| {
                let root = if entry.root.is_absolute() {
                    entry.root.clone()
                } else {
                    self.base_dir.join(&entry.root)
                };
                let module = match Self::load_module(entry, &root) {
                    Ok(spec) => {
                        Some(Box::new(spec.into_declaration(&entry.identity)) as Box<dyn ResourceModule>)
                    }
                    Err(e) => {
                        log::error!("[Manifest] Plugin '{}': {e}", entry.identity);
                        None
                    }
                };
                DiscoveredModule {
                    identity: ModuleIdentity::new(entry.identity.clone(), root),
                    module,
                }
            })
            .collect()
    }

    fn load_module(entry: &PluginEntry, root: &Path) -> ReduxResult<ModuleSpec> {
        match &entry.module {
            ModuleSource::Inline(spec) => Ok(spec.clone()),
            ModuleSource::File(relative) => {
                let path = root.join(relative);
                let text = std::fs::read_to_string(&path).map_err(|e| ReduxError::io(&path, e))?;
                ModuleSpec::from_ron_str(&text, &path)
            }
        }
    }
}
