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

//! The module registry: sole writer of the override stores.
//!
//! Registration preloads everything a module declares (resolving paths,
//! reading bundle folders, collecting fragments) and then pushes the module's
//! keys into the [`OverrideContext`]. How contested keys are settled depends
//! on the configured [`ConflictPolicy`].

use redux_core::error::{ReduxError, ReduxResult};
use redux_core::module::{ModuleIdentity, ResourceModule, TextProcessor};
use redux_core::{ConflictPolicy, PathResolver, ReduxConfig};
use redux_data::{BundleRecord, OverrideContext};
use redux_io::scan::{scan_bundle_folder, scan_fragment_folder};
use redux_io::DiscoveredModule;
use redux_telemetry::ScopedTimer;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A registered module together with everything preloaded for it.
///
/// Paths are stored already resolved; the module object itself is never
/// mutated.
pub struct ModuleRecord {
    identity: ModuleIdentity,
    name: String,
    priority: i32,
    sequence: u64,
    sprites: Vec<(String, PathBuf)>,
    textures: Vec<(String, PathBuf)>,
    processors: Vec<(String, TextProcessor)>,
    bundles: Vec<BundleRecord>,
    fragment_resources: Vec<String>,
    module: Box<dyn ResourceModule>,
}

impl ModuleRecord {
    /// Where the module came from.
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Sprite overrides, with absolute paths. Includes bundle previews.
    pub fn sprites(&self) -> &[(String, PathBuf)] {
        &self.sprites
    }

    /// Texture overrides, with absolute paths.
    pub fn textures(&self) -> &[(String, PathBuf)] {
        &self.textures
    }

    /// Number of text processors the module contributed.
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Bundle records read from the module's bundle folders.
    pub fn bundles(&self) -> &[BundleRecord] {
        &self.bundles
    }

    /// Text resources that received fragments from this module.
    pub fn fragment_resources(&self) -> &[String] {
        &self.fragment_resources
    }

    /// The module as supplied by its plugin.
    pub fn module(&self) -> &dyn ResourceModule {
        self.module.as_ref()
    }
}

/// Accepts modules, preloads their resources and keeps them ordered by
/// priority (highest first, registration order among equals).
pub struct ModuleRegistry {
    records: Vec<ModuleRecord>,
    identities: HashSet<String>,
    resolver: PathResolver,
    config: ReduxConfig,
    next_sequence: u64,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new(resolver: PathResolver, config: ReduxConfig) -> Self {
        Self {
            records: Vec::new(),
            identities: HashSet::new(),
            resolver,
            config,
            next_sequence: 0,
        }
    }

    /// The configuration the registry was built with.
    pub fn config(&self) -> &ReduxConfig {
        &self.config
    }

    /// The path resolver used during preload.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Registers `module`, supplied by `identity`.
    ///
    /// A missing module or an identity already seen in this epoch is logged
    /// and rejected; nothing is written in that case.
    pub fn register(
        &mut self,
        ctx: &mut OverrideContext,
        identity: ModuleIdentity,
        module: Option<Box<dyn ResourceModule>>,
    ) -> ReduxResult<()> {
        let Some(module) = module else {
            log::error!("[ModuleRegistry] '{identity}' supplied no module, skipping.");
            return Err(ReduxError::MissingModule(identity.source().to_string()));
        };
        if !self.identities.insert(identity.source().to_string()) {
            log::warn!(
                "[ModuleRegistry] '{identity}' is already registered in this epoch, ignoring '{}'.",
                module.name()
            );
            return Err(ReduxError::DuplicateModule(identity.source().to_string()));
        }

        let _timer = ScopedTimer::new(format!("register '{identity}'"));
        let record = self.preload(ctx, identity, module);

        for (target, processor) in &record.processors {
            ctx.text_mut().register_processor(target, processor.clone());
        }

        log::info!(
            "[ModuleRegistry] Registered '{}' from '{}' (priority={}, sprites={}, textures={}, processors={}, bundles={}).",
            record.name,
            record.identity,
            record.priority,
            record.sprites.len(),
            record.textures.len(),
            record.processors.len(),
            record.bundles.len()
        );

        let sequence = record.sequence;
        self.records.push(record);
        self.records.sort_by(|a, b| b.priority.cmp(&a.priority));

        match self.config.conflict_policy {
            ConflictPolicy::LastRegistered => {
                if let Some(record) = self.records.iter().find(|r| r.sequence == sequence) {
                    Self::sync(ctx, record);
                }
            }
            ConflictPolicy::Priority => self.resync_by_priority(ctx),
        }
        Ok(())
    }

    /// Registers every discovered module in order. Returns how many were
    /// accepted.
    pub fn register_all(
        &mut self,
        ctx: &mut OverrideContext,
        modules: impl IntoIterator<Item = DiscoveredModule>,
    ) -> usize {
        let mut accepted = 0;
        for found in modules {
            if self.register(ctx, found.identity, found.module).is_ok() {
                accepted += 1;
            }
        }
        accepted
    }

    /// Ends the epoch: forgets every module and identity and clears `ctx`.
    pub fn clear(&mut self, ctx: &mut OverrideContext) {
        let modules = self.records.len();
        self.records.clear();
        self.identities.clear();
        let report = ctx.clear();
        log::info!(
            "[ModuleRegistry] Epoch reset: {} module(s) dropped, {} sprite(s) and {} texture(s) released.",
            modules,
            report.sprites_released,
            report.textures_released
        );
    }

    /// Registered modules, highest priority first.
    pub fn active_modules(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.iter()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if `source` has registered in this epoch.
    pub fn is_registered(&self, source: &str) -> bool {
        self.identities.contains(source)
    }

    /// Every loaded bundle record, walking modules in registry order.
    ///
    /// The text of a record is the one that won in `ctx`.
    pub fn loaded_bundles<'c>(&self, ctx: &'c OverrideContext) -> Vec<&'c BundleRecord> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|record| record.bundles.iter())
            .filter(|bundle| seen.insert(bundle.key.to_lowercase()))
            .filter_map(|bundle| ctx.bundles().get(&bundle.key))
            .collect()
    }

    /// Appends one element per loaded bundle whose key is not yet in `list`.
    ///
    /// Keys compare case-insensitively. An element `build` fails on is logged
    /// and skipped. Returns the number of elements appended.
    pub fn splice_bundles<R>(
        &self,
        ctx: &OverrideContext,
        list: &mut Vec<R>,
        key_of: impl Fn(&R) -> &str,
        mut build: impl FnMut(&BundleRecord) -> anyhow::Result<R>,
    ) -> usize {
        let mut present: HashSet<String> = list.iter().map(|item| key_of(item).to_lowercase()).collect();
        let mut added = 0;
        for bundle in self.loaded_bundles(ctx) {
            if !present.insert(bundle.key.to_lowercase()) {
                continue;
            }
            match build(bundle) {
                Ok(item) => {
                    list.push(item);
                    added += 1;
                }
                Err(e) => log::error!("[ModuleRegistry] Bundle '{}' could not be built: {e:#}", bundle.key),
            }
        }
        added
    }

    fn preload(
        &mut self,
        ctx: &mut OverrideContext,
        identity: ModuleIdentity,
        module: Box<dyn ResourceModule>,
    ) -> ModuleRecord {
        let name = module.name().to_string();
        let mut sprites = self.resolve_all(&identity, module.sprites());
        let textures = self.resolve_all(&identity, module.textures());

        let mut bundles = Vec::new();
        for folder in module.bundle_folders() {
            let dir = self.resolver.resolve(&folder, &identity);
            match scan_bundle_folder(
                &name,
                &dir,
                &self.config.bundle_primary_file,
                &self.config.bundle_preview_file,
            ) {
                Ok(entries) => {
                    for entry in entries {
                        if let Some(preview) = &entry.preview {
                            sprites.push((entry.preview_sprite_key(), preview.clone()));
                        }
                        bundles.push(BundleRecord {
                            key: entry.key,
                            data: entry.data,
                        });
                    }
                }
                Err(e) => log::error!("[ModuleRegistry] '{name}': bundle folder skipped: {e}"),
            }
        }

        let mut folders: Vec<_> = module.fragment_folders().into_iter().collect();
        folders.sort();
        let mut fragment_resources = Vec::new();
        for (resource, folder) in folders {
            let dir = self.resolver.resolve(&folder, &identity);
            match scan_fragment_folder(&dir, &self.config.fragment_extension) {
                Ok(fragments) if fragments.is_empty() => {}
                Ok(fragments) => {
                    if ctx.add_fragments(&resource, fragments) {
                        log::debug!("[ModuleRegistry] Merge stage installed for '{resource}'.");
                    }
                    fragment_resources.push(resource);
                }
                Err(e) => log::error!("[ModuleRegistry] '{name}': fragment folder skipped: {e}"),
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        ModuleRecord {
            identity,
            priority: module.priority(),
            processors: module.text_processors(),
            name,
            sequence,
            sprites,
            textures,
            bundles,
            fragment_resources,
            module,
        }
    }

    fn resolve_all(
        &self,
        identity: &ModuleIdentity,
        declared: HashMap<String, String>,
    ) -> Vec<(String, PathBuf)> {
        let mut resolved: Vec<_> = declared
            .into_iter()
            .filter(|(name, path)| !name.is_empty() && !path.is_empty())
            .map(|(name, path)| {
                let absolute = self.resolver.resolve(&path, identity);
                (name, absolute)
            })
            .collect();
        resolved.sort_by(|a, b| a.0.cmp(&b.0));
        resolved
    }

    fn sync(ctx: &mut OverrideContext, record: &ModuleRecord) {
        for (name, path) in &record.sprites {
            ctx.sprites_mut().register(name, path.clone());
        }
        for (name, path) in &record.textures {
            ctx.textures_mut().register(name, path.clone());
        }
        for bundle in &record.bundles {
            ctx.bundles_mut().insert(&bundle.key, bundle.data.clone());
        }
    }

    fn resync_by_priority(&self, ctx: &mut OverrideContext) {
        let mut order: Vec<&ModuleRecord> = self.records.iter().collect();
        order.sort_by_key(|r| (r.priority, r.sequence));
        for record in order {
            Self::sync(ctx, record);
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new(PathResolver::default(), ReduxConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redux_core::asset::{AssetSource, Bitmap};
    use redux_core::module::{infallible_processor, ModuleDeclaration};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    struct SolidSource;

    impl AssetSource<Bitmap> for SolidSource {
        fn load_path(&self, _path: &Path) -> ReduxResult<Bitmap> {
            Ok(Bitmap::solid(2, 2, [1, 2, 3, 255]))
        }
    }

    fn setup(policy: ConflictPolicy) -> (ModuleRegistry, OverrideContext) {
        let config = ReduxConfig {
            conflict_policy: policy,
            ..ReduxConfig::default()
        };
        let registry = ModuleRegistry::new(PathResolver::new("/host"), config);
        (registry, OverrideContext::new(Arc::new(SolidSource)))
    }

    fn module(name: &str, priority: i32) -> Box<dyn ResourceModule> {
        Box::new(
            ModuleDeclaration::new(name)
                .with_priority(priority)
                .with_sprite("hero", "hero.png"),
        )
    }

    fn register(registry: &mut ModuleRegistry, ctx: &mut OverrideContext, source: &str, priority: i32) {
        let identity = ModuleIdentity::new(source, format!("/plugins/{source}"));
        registry.register(ctx, identity, Some(module(source, priority))).unwrap();
    }

    #[test]
    fn test_last_registration_wins_regardless_of_priority() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        register(&mut registry, &mut ctx, "a", 10);
        register(&mut registry, &mut ctx, "b", 0);

        assert_eq!(
            ctx.sprites().path_of("hero"),
            Some(Path::new("/plugins/b/hero.png"))
        );
        let order: Vec<_> = registry.active_modules().map(|r| r.name()).collect();
        assert_eq!(order, ["a", "b"]);
    }

    #[test]
    fn test_priority_policy_lets_highest_win() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::Priority);
        register(&mut registry, &mut ctx, "a", 10);
        register(&mut registry, &mut ctx, "b", 0);
        assert_eq!(
            ctx.sprites().path_of("hero"),
            Some(Path::new("/plugins/a/hero.png"))
        );

        register(&mut registry, &mut ctx, "c", 10);
        assert_eq!(
            ctx.sprites().path_of("hero"),
            Some(Path::new("/plugins/c/hero.png"))
        );
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        register(&mut registry, &mut ctx, "low", -1);
        register(&mut registry, &mut ctx, "first", 3);
        register(&mut registry, &mut ctx, "second", 3);

        let order: Vec<_> = registry.active_modules().map(|r| r.name()).collect();
        assert_eq!(order, ["first", "second", "low"]);
    }

    #[test]
    fn test_duplicate_identity_is_rejected() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        register(&mut registry, &mut ctx, "a", 0);

        let again = ModuleIdentity::new("a", "/elsewhere");
        let err = registry
            .register(&mut ctx, again, Some(module("other", 50)))
            .unwrap_err();
        assert!(matches!(err, ReduxError::DuplicateModule(ref s) if s == "a"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            ctx.sprites().path_of("hero"),
            Some(Path::new("/plugins/a/hero.png"))
        );
    }

    #[test]
    fn test_missing_module_is_rejected() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        let err = registry
            .register(&mut ctx, ModuleIdentity::detached("ghost"), None)
            .unwrap_err();
        assert!(matches!(err, ReduxError::MissingModule(_)));
        assert!(!registry.is_registered("ghost"));
    }

    #[test]
    fn test_clear_forgets_overrides_and_identities() {
        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        register(&mut registry, &mut ctx, "a", 0);
        let hero = ctx.resolve_sprite("hero").unwrap();

        registry.clear(&mut ctx);
        assert!(ctx.resolve_sprite("hero").is_none());
        assert!(hero.texture().is_released());
        assert!(registry.is_empty());

        register(&mut registry, &mut ctx, "a", 0);
        assert!(ctx.resolve_sprite("hero").is_some());
    }

    #[test]
    fn test_processors_run_after_merge_stage() {
        let dir = tempfile::tempdir().unwrap();
        let frags = dir.path().join("Fragments");
        fs::create_dir_all(&frags).unwrap();
        fs::write(frags.join("b.json"), "{\"b\":2}").unwrap();
        fs::write(frags.join("a.json"), "[ {\"a\":1} ]").unwrap();
        fs::write(frags.join("notes.txt"), "ignored").unwrap();

        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        let declaration = ModuleDeclaration::new("items")
            .with_fragment_folder("ItemTable", "Fragments")
            .with_processor("ItemTable", infallible_processor(|t| t.replace(':', "=")));
        registry
            .register(
                &mut ctx,
                ModuleIdentity::new("items@1", dir.path()),
                Some(Box::new(declaration)),
            )
            .unwrap();

        let out = ctx.resolve_text(7, "ItemTable", "[]");
        assert!(out.changed);
        assert_eq!(out.text, "[{\"a\"=1},{\"b\"=2}]");
        assert_eq!(ctx.text().stage_count("ItemTable"), 2);
    }

    #[test]
    fn test_second_fragment_module_refreshes_cached_text() {
        let dir = tempfile::tempdir().unwrap();
        for (plugin, fragment) in [("first", "{\"a\":1}"), ("second", "{\"b\":2}")] {
            let folder = dir.path().join(plugin).join("Items");
            fs::create_dir_all(&folder).unwrap();
            fs::write(folder.join("item.json"), fragment).unwrap();
        }

        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        let register_items = |registry: &mut ModuleRegistry, ctx: &mut OverrideContext, plugin: &str| {
            let declaration = ModuleDeclaration::new(plugin).with_fragment_folder("ItemTable", "Items");
            registry
                .register(
                    ctx,
                    ModuleIdentity::new(plugin, dir.path().join(plugin)),
                    Some(Box::new(declaration)),
                )
                .unwrap();
        };

        register_items(&mut registry, &mut ctx, "first");
        assert_eq!(ctx.resolve_text(3, "ItemTable", "[]").text, "[{\"a\":1}]");

        register_items(&mut registry, &mut ctx, "second");
        assert_eq!(ctx.text().stage_count("ItemTable"), 1);
        assert_eq!(
            ctx.resolve_text(3, "ItemTable", "[]").text,
            "[{\"a\":1},{\"b\":2}]"
        );
    }

    #[test]
    fn test_bundles_are_loaded_and_spliced() {
        let dir = tempfile::tempdir().unwrap();
        for (folder, data) in [("Room", "{\"room\":1}"), ("Hall", "{\"hall\":1}")] {
            let sub = dir.path().join("Bundles").join(folder);
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("blueprint.json"), data).unwrap();
        }
        fs::write(dir.path().join("Bundles/Room/preview.png"), b"png").unwrap();

        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        let declaration = ModuleDeclaration::new("Deco")
            .with_bundle_folder("Bundles")
            .with_bundle_folder("Missing");
        registry
            .register(
                &mut ctx,
                ModuleIdentity::new("deco@1", dir.path()),
                Some(Box::new(declaration)),
            )
            .unwrap();

        let keys: Vec<_> = registry
            .loaded_bundles(&ctx)
            .iter()
            .map(|b| b.key.clone())
            .collect();
        assert_eq!(keys, ["Deco_Hall", "Deco_Room"]);
        assert!(ctx.sprites().contains("Blueprint_Deco_Room"));
        assert!(!ctx.sprites().contains("Blueprint_Deco_Hall"));

        let mut list = vec!["deco_hall".to_string(), "vanilla".to_string()];
        let added = registry.splice_bundles(&ctx, &mut list, |s| s.as_str(), |b| Ok(b.key.clone()));
        assert_eq!(added, 1);
        assert_eq!(list, ["deco_hall", "vanilla", "Deco_Room"]);
    }

    #[test]
    fn test_failed_build_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for folder in ["Bad", "Good"] {
            let sub = dir.path().join("Bundles").join(folder);
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("blueprint.json"), folder).unwrap();
        }

        let (mut registry, mut ctx) = setup(ConflictPolicy::LastRegistered);
        let declaration = ModuleDeclaration::new("M").with_bundle_folder("Bundles");
        registry
            .register(
                &mut ctx,
                ModuleIdentity::new("m@1", dir.path()),
                Some(Box::new(declaration)),
            )
            .unwrap();

        let mut list: Vec<String> = Vec::new();
        let added = registry.splice_bundles(&ctx, &mut list, |s| s.as_str(), |b| {
            if b.data == "Bad" {
                anyhow::bail!("schema mismatch");
            }
            Ok(b.data.clone())
        });
        assert_eq!(added, 1);
        assert_eq!(list, ["Good"]);
    }
}
