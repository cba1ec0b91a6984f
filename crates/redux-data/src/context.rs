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

//! The explicit context object holding every override store of one process.

use crate::asset::{Sprite, Texture};
use crate::bundle::BundleStore;
use crate::fragment::FragmentMerger;
use crate::override_cache::OverrideCache;
use crate::text_pipeline::{InstanceId, TextPipeline, TextResolution};
use redux_core::asset::{AssetHandle, AssetSource, Bitmap};
use redux_io::FileSource;
use std::sync::Arc;
use std::time::Duration;

/// Counts returned by [`OverrideContext::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Materialized sprites released.
    pub sprites_released: usize,
    /// Materialized textures released.
    pub textures_released: usize,
}

/// Owns the sprite and texture caches, the text pipeline, the fragment merger
/// and the bundle store.
///
/// The registry is the only writer; interception points and the refresh
/// coordinator read through the `resolve_*` methods.
pub struct OverrideContext {
    sprites: OverrideCache<Sprite>,
    textures: OverrideCache<Texture>,
    text: TextPipeline,
    fragments: FragmentMerger,
    bundles: BundleStore,
}

impl OverrideContext {
    /// Creates an empty context whose caches decode through `source`.
    pub fn new(source: Arc<dyn AssetSource<Bitmap>>) -> Self {
        Self {
            sprites: OverrideCache::new(source.clone()),
            textures: OverrideCache::new(source),
            text: TextPipeline::new(),
            fragments: FragmentMerger::new(),
            bundles: BundleStore::new(),
        }
    }

    /// Creates an empty context that decodes image files from disk.
    pub fn with_images() -> Self {
        Self::new(Arc::new(FileSource::images()))
    }

    /// The sprite cache.
    pub fn sprites(&self) -> &OverrideCache<Sprite> {
        &self.sprites
    }

    /// The sprite cache, mutably.
    pub fn sprites_mut(&mut self) -> &mut OverrideCache<Sprite> {
        &mut self.sprites
    }

    /// The texture cache.
    pub fn textures(&self) -> &OverrideCache<Texture> {
        &self.textures
    }

    /// The texture cache, mutably.
    pub fn textures_mut(&mut self) -> &mut OverrideCache<Texture> {
        &mut self.textures
    }

    /// The text pipeline.
    pub fn text(&self) -> &TextPipeline {
        &self.text
    }

    /// The text pipeline, mutably.
    pub fn text_mut(&mut self) -> &mut TextPipeline {
        &mut self.text
    }

    /// The fragment merger.
    pub fn fragments(&self) -> &FragmentMerger {
        &self.fragments
    }

    /// The bundle store.
    pub fn bundles(&self) -> &BundleStore {
        &self.bundles
    }

    /// The bundle store, mutably.
    pub fn bundles_mut(&mut self) -> &mut BundleStore {
        &mut self.bundles
    }

    /// Adds fragments for `resource` and, the first time the resource gets
    /// any, installs its merge stage into the text pipeline.
    ///
    /// Memoized text results are dropped whenever fragments were appended, so
    /// later reads see the extended merge.
    ///
    /// Returns `true` if a merge stage was installed.
    pub fn add_fragments(&mut self, resource: &str, fragments: impl IntoIterator<Item = String>) -> bool {
        let before = self.fragments.fragment_count(resource);
        if !self.fragments.add_fragments(resource, fragments) {
            if self.fragments.fragment_count(resource) > before {
                self.text.invalidate_results();
            }
            return false;
        }
        let stage = self.fragments.merge_stage(resource);
        self.text.register_processor(resource, stage);
        true
    }

    /// Interception point for sprite reads.
    pub fn resolve_sprite(&mut self, name: &str) -> Option<AssetHandle<Sprite>> {
        self.sprites.try_resolve(name)
    }

    /// Interception point for texture reads.
    pub fn resolve_texture(&mut self, name: &str) -> Option<AssetHandle<Texture>> {
        self.textures.try_resolve(name)
    }

    /// Interception point for text reads. Empty text is never transformed.
    pub fn resolve_text(&mut self, instance: InstanceId, name: &str, text: &str) -> TextResolution {
        if text.is_empty() || name.is_empty() {
            return TextResolution {
                changed: false,
                text: text.to_string(),
            };
        }
        self.text.resolve_cached(instance, name, text)
    }

    /// Applies finished background decodes of both caches.
    pub fn pump(&mut self) -> usize {
        self.sprites.pump() + self.textures.pump()
    }

    /// Async resolves still waiting on a decode, across both caches.
    pub fn pending_count(&self) -> usize {
        self.sprites.pending_count() + self.textures.pending_count()
    }

    /// Blocks until both caches have no pending decode or `timeout` elapses.
    pub fn wait_idle(&mut self, timeout: Duration) -> usize {
        self.sprites.wait_idle(timeout) + self.textures.wait_idle(timeout)
    }

    /// Empties every store, releasing materialized objects once each.
    pub fn clear(&mut self) -> ClearReport {
        let report = ClearReport {
            sprites_released: self.sprites.clear(),
            textures_released: self.textures.clear(),
        };
        self.text.clear();
        self.fragments.clear();
        self.bundles.clear();
        report
    }
}

impl Default for OverrideContext {
    fn default() -> Self {
        Self::with_images()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redux_core::error::ReduxResult;
    use redux_core::module::infallible_processor;
    use std::path::Path;

    struct SolidSource;

    impl AssetSource<Bitmap> for SolidSource {
        fn load_path(&self, _path: &Path) -> ReduxResult<Bitmap> {
            Ok(Bitmap::solid(4, 4, [0, 255, 0, 255]))
        }
    }

    fn context() -> OverrideContext {
        OverrideContext::new(Arc::new(SolidSource))
    }

    #[test]
    fn test_merge_stage_installed_once() {
        let mut ctx = context();
        assert!(ctx.add_fragments("items", vec!["a".to_string()]));
        assert!(!ctx.add_fragments("items", vec!["b".to_string()]));
        assert_eq!(ctx.text().stage_count("items"), 1);

        let out = ctx.resolve_text(1, "items", "[]");
        assert!(out.changed);
        assert_eq!(out.text, "[a,b]");
    }

    #[test]
    fn test_appended_fragments_drop_cached_results() {
        let mut ctx = context();
        ctx.add_fragments("items", vec!["a".to_string()]);
        assert_eq!(ctx.resolve_text(1, "items", "[]").text, "[a]");

        ctx.add_fragments("items", vec!["b".to_string()]);
        assert_eq!(ctx.resolve_text(1, "items", "[]").text, "[a,b]");

        ctx.add_fragments("items", vec!["  ".to_string()]);
        assert_eq!(ctx.text().cached_len(), 1);
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut ctx = context();
        ctx.text_mut()
            .register_processor("n", infallible_processor(|t| format!("{t}!")));
        let out = ctx.resolve_text(1, "n", "");
        assert!(!out.changed);
        assert_eq!(ctx.text().cached_len(), 0);
    }

    #[test]
    fn test_clear_resets_every_store() {
        let mut ctx = context();
        ctx.sprites_mut().register("hero", "/p/hero.png");
        ctx.textures_mut().register("wall", "/p/wall.png");
        ctx.bundles_mut().insert("M_a", "{}");
        ctx.add_fragments("items", vec!["a".to_string()]);

        let hero = ctx.resolve_sprite("hero").unwrap();
        ctx.resolve_texture("wall").unwrap();

        let report = ctx.clear();
        assert_eq!(report.sprites_released, 1);
        assert_eq!(report.textures_released, 1);
        assert!(hero.texture().is_released());
        assert!(ctx.resolve_sprite("hero").is_none());
        assert!(ctx.bundles().is_empty());
        assert_eq!(ctx.fragments().resource_count(), 0);
        assert_eq!(ctx.text().stage_count("items"), 0);
    }
}
