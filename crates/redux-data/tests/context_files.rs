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

use redux_data::{OverrideAsset, OverrideContext};
use std::path::Path;
use std::time::Duration;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    img.save(path).unwrap();
}

#[test]
fn test_png_override_is_materialized_as_sprite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hero.png");
    write_png(&path, 16, 8);

    let mut ctx = OverrideContext::with_images();
    ctx.sprites_mut().register("Hero", &path);

    let sprite = ctx.resolve_sprite("hero").unwrap();
    assert_eq!(sprite.name(), "hero");
    assert_eq!(sprite.texture().width(), 16);
    assert_eq!(sprite.texture().height(), 8);
    assert_eq!(sprite.texture().bitmap().pixels.len(), 16 * 8 * 4);

    let again = ctx.resolve_sprite("HERO").unwrap();
    assert!(sprite.ptr_eq(&again));
}

#[test]
fn test_corrupt_file_degrades_to_miss() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let mut ctx = OverrideContext::with_images();
    ctx.textures_mut().register("wall", &path);
    assert!(ctx.resolve_texture("wall").is_none());

    ctx.textures_mut().register("missing", dir.path().join("nope.png"));
    assert!(ctx.resolve_texture("missing").is_none());
}

#[test]
fn test_async_decode_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall.png");
    write_png(&path, 4, 4);

    let mut ctx = OverrideContext::with_images();
    ctx.textures_mut().register("wall", &path);

    let slot = std::rc::Rc::new(std::cell::RefCell::new(None));
    let sink = slot.clone();
    ctx.textures_mut()
        .resolve_async("wall", move |handle| *sink.borrow_mut() = handle);

    ctx.wait_idle(Duration::from_secs(5));
    let texture = slot.borrow_mut().take().unwrap();
    assert_eq!(texture.width(), 4);

    let sync = ctx.resolve_texture("wall").unwrap();
    assert!(sync.ptr_eq(&texture));
}
