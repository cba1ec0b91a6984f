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

//! The public-facing SDK of the asset override engine.
//!
//! [`AssetRedux`] owns the override stores, the module registry and the
//! refresh coordinator of one host process. Hosts register modules at the
//! start of each epoch, call the `resolve_*` methods from their interception
//! points and drive refresh scans by calling [`AssetRedux::tick`].

mod report;

pub use report::{ModuleSummary, ReduxReport};

use anyhow::{Context, Result};
use redux_agents::{ModuleRegistry, Population, RefreshCoordinator, RefreshStats};
use redux_core::asset::AssetHandle;
use redux_core::error::ReduxResult;
use redux_core::event::LifecycleEvent;
use redux_core::module::{ModuleIdentity, ResourceModule};
use redux_core::{PathResolver, ReduxConfig};
use redux_data::{BundleRecord, InstanceId, OverrideContext, Sprite, TextResolution, Texture};
use redux_io::{DiscoveredModule, PluginManifest};
use std::path::Path;

/// Types most hosts and plugins need.
pub mod prelude {
    pub use crate::{AssetRedux, ReduxReport};
    pub use redux_agents::{BoundAsset, OverrideTarget, Population, TargetKind};
    pub use redux_core::event::LifecycleEvent;
    pub use redux_core::module::{
        infallible_processor, text_processor, ModuleDeclaration, ModuleIdentity, ResourceModule,
    };
    pub use redux_core::{ConflictPolicy, ReduxConfig};
    pub use redux_data::{OverrideAsset, Sprite, Texture};
}

/// The override engine of one host process.
pub struct AssetRedux {
    ctx: OverrideContext,
    registry: ModuleRegistry,
    coordinator: RefreshCoordinator,
}

impl AssetRedux {
    /// Creates an engine that decodes image files from disk and resolves
    /// module paths against the host executable's directory.
    pub fn new(config: ReduxConfig) -> Self {
        Self::with_parts(OverrideContext::with_images(), PathResolver::default(), config)
    }

    /// Creates an engine from explicit parts.
    pub fn with_parts(ctx: OverrideContext, resolver: PathResolver, config: ReduxConfig) -> Self {
        let coordinator = RefreshCoordinator::new(&config);
        Self {
            ctx,
            registry: ModuleRegistry::new(resolver, config),
            coordinator,
        }
    }

    /// Starts a new epoch: every module, mapping and cached object is dropped.
    pub fn begin_epoch(&mut self) {
        self.registry.clear(&mut self.ctx);
    }

    /// Registers a code-defined module.
    pub fn register(
        &mut self,
        identity: ModuleIdentity,
        module: impl ResourceModule + 'static,
    ) -> ReduxResult<()> {
        self.registry.register(&mut self.ctx, identity, Some(Box::new(module)))
    }

    /// Registers already discovered modules, in order. Returns how many were
    /// accepted.
    pub fn register_discovered(
        &mut self,
        modules: impl IntoIterator<Item = DiscoveredModule>,
    ) -> usize {
        self.registry.register_all(&mut self.ctx, modules)
    }

    /// Loads a plugin manifest and registers the modules it lists.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let manifest = PluginManifest::load(path)
            .with_context(|| format!("Failed to load plugin manifest '{}'", path.display()))?;
        Ok(self.register_discovered(manifest.discover()))
    }

    /// Asks for a refresh scan once the debounce delay has passed.
    pub fn request_refresh(&mut self) {
        self.coordinator.request_refresh();
    }

    /// Drives the refresh coordinator; call once per host frame.
    pub fn tick(&mut self, population: &dyn Population) -> usize {
        self.coordinator.tick(&mut self.ctx, population)
    }

    /// Sender the host lifecycle layer publishes events on.
    pub fn lifecycle_sender(&self) -> flume::Sender<LifecycleEvent> {
        self.coordinator.lifecycle_sender()
    }

    /// The sprite override for `name`, if any.
    pub fn resolve_sprite(&mut self, name: &str) -> Option<AssetHandle<Sprite>> {
        self.ctx.resolve_sprite(name)
    }

    /// The texture override for `name`, if any.
    pub fn resolve_texture(&mut self, name: &str) -> Option<AssetHandle<Texture>> {
        self.ctx.resolve_texture(name)
    }

    /// Runs the text pipeline of `name` for the text asset `instance`.
    pub fn resolve_text(&mut self, instance: InstanceId, name: &str, text: &str) -> TextResolution {
        self.ctx.resolve_text(instance, name, text)
    }

    /// Every loaded bundle record, in registry order.
    pub fn loaded_bundles(&self) -> Vec<&BundleRecord> {
        self.registry.loaded_bundles(&self.ctx)
    }

    /// Appends the loaded bundles missing from `list`.
    /// See [`ModuleRegistry::splice_bundles`].
    pub fn splice_bundles<R>(
        &self,
        list: &mut Vec<R>,
        key_of: impl Fn(&R) -> &str,
        build: impl FnMut(&BundleRecord) -> anyhow::Result<R>,
    ) -> usize {
        self.registry.splice_bundles(&self.ctx, list, key_of, build)
    }

    /// Refresh counters so far.
    pub fn refresh_stats(&self) -> RefreshStats {
        self.coordinator.stats()
    }

    /// The override stores.
    pub fn context(&self) -> &OverrideContext {
        &self.ctx
    }

    /// The override stores, mutably.
    pub fn context_mut(&mut self) -> &mut OverrideContext {
        &mut self.ctx
    }

    /// The module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The refresh coordinator.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// A snapshot of what the current epoch loaded.
    pub fn report(&self) -> ReduxReport {
        ReduxReport::collect(&self.registry, &self.ctx)
    }
}

impl Default for AssetRedux {
    fn default() -> Self {
        Self::new(ReduxConfig::default())
    }
}
