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

use anyhow::Result;
use redux_agents::ModuleRegistry;
use redux_core::{ConflictPolicy, PathResolver, ReduxConfig};
use redux_data::OverrideContext;
use redux_io::PluginManifest;
use std::fs;
use std::path::Path;

fn write_png(path: &Path, shade: u8) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    image::RgbaImage::from_pixel(3, 3, image::Rgba([shade, shade, shade, 255]))
        .save(path)
        .unwrap();
}

const MANIFEST: &str = r#"(
    plugins: [
        (
            identity: "base@1.0",
            root: "base",
            module: Inline((
                name: "Base",
                priority: 10,
                sprites: { "hero": "Assets/hero.png", "hero_alt": "Assets/hero.png" },
            )),
        ),
        (
            identity: "skin@2.0",
            root: "skin",
            module: File("module.ron"),
        ),
        (
            identity: "base@1.0",
            root: "base",
            module: Inline((name: "Again")),
        ),
    ],
)"#;

fn fixture(dir: &Path) {
    write_png(&dir.join("base/Assets/hero.png"), 10);
    write_png(&dir.join("skin/Assets/hero.png"), 200);
    fs::write(
        dir.join("skin/module.ron"),
        r#"(name: "Skin", priority: 0, sprites: { "Hero": "Assets/hero.png" })"#,
    )
    .unwrap();
}

fn run_epoch(dir: &Path, policy: ConflictPolicy) -> Result<(ModuleRegistry, OverrideContext)> {
    let manifest = PluginManifest::from_ron_str(MANIFEST, dir)?;
    let config = ReduxConfig {
        conflict_policy: policy,
        ..ReduxConfig::default()
    };
    let mut registry = ModuleRegistry::new(PathResolver::new(dir), config);
    let mut ctx = OverrideContext::with_images();
    let accepted = registry.register_all(&mut ctx, manifest.discover());
    assert_eq!(accepted, 2);
    Ok((registry, ctx))
}

#[test]
fn test_manifest_epoch_last_registered() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fixture(dir.path());
    let (mut registry, mut ctx) = run_epoch(dir.path(), ConflictPolicy::LastRegistered)?;

    let hero = ctx.resolve_sprite("hero").expect("hero override");
    assert_eq!(hero.texture().bitmap().pixels[0], 200);

    let alt = ctx.resolve_sprite("hero_alt").expect("alias override");
    assert_eq!(alt.texture().bitmap().pixels[0], 10);

    registry.clear(&mut ctx);
    assert!(ctx.resolve_sprite("hero").is_none());
    assert!(hero.texture().is_released());
    Ok(())
}

#[test]
fn test_manifest_epoch_priority() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fixture(dir.path());
    let (_registry, mut ctx) = run_epoch(dir.path(), ConflictPolicy::Priority)?;

    let hero = ctx.resolve_sprite("hero").expect("hero override");
    let alt = ctx.resolve_sprite("hero_alt").expect("alias override");
    assert_eq!(hero.texture().bitmap().pixels[0], 10);
    assert!(hero.ptr_eq(&alt));
    Ok(())
}
