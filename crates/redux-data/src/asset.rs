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

//! The materialized asset kinds handed out by the override caches.

use redux_core::asset::{Asset, Bitmap};
use std::sync::atomic::{AtomicBool, Ordering};

/// An asset kind that an [`OverrideCache`](crate::OverrideCache) can build
/// from a decoded bitmap.
pub trait OverrideAsset: Asset + Sized {
    /// Short label used in log lines.
    const KIND: &'static str;

    /// Wraps a freshly decoded bitmap, labelled with the override `name`.
    fn materialize(name: &str, bitmap: Bitmap) -> Self;

    /// The label given at materialization.
    fn name(&self) -> &str;

    /// Frees whatever native resource backs the asset.
    ///
    /// Called exactly once per materialized object when its cache is cleared.
    fn release(&self);
}

/// A 2D texture produced from an override image.
#[derive(Debug)]
pub struct Texture {
    name: String,
    bitmap: Bitmap,
    released: AtomicBool,
}

impl Texture {
    /// The decoded pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.bitmap.height
    }

    /// Whether [`OverrideAsset::release`] has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Asset for Texture {}

impl OverrideAsset for Texture {
    const KIND: &'static str = "texture";

    fn materialize(name: &str, bitmap: Bitmap) -> Self {
        Self {
            name: name.to_string(),
            bitmap,
            released: AtomicBool::new(false),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            log::warn!("[Texture] '{}' released twice.", self.name);
        }
    }
}

/// A pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// A sprite covering a whole override texture, pivoted at its centre.
#[derive(Debug)]
pub struct Sprite {
    texture: Texture,
    rect: Rect,
    pivot: (f32, f32),
    pixels_per_unit: f32,
}

impl Sprite {
    /// Pixels per world unit used for every override sprite.
    pub const PIXELS_PER_UNIT: f32 = 100.0;

    /// The backing texture.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// The region of the texture the sprite shows.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Normalized pivot.
    pub fn pivot(&self) -> (f32, f32) {
        self.pivot
    }

    /// Pixels per world unit.
    pub fn pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit
    }
}

impl Asset for Sprite {}

impl OverrideAsset for Sprite {
    const KIND: &'static str = "sprite";

    fn materialize(name: &str, bitmap: Bitmap) -> Self {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: bitmap.width as f32,
            height: bitmap.height as f32,
        };
        Self {
            texture: Texture::materialize(name, bitmap),
            rect,
            pivot: (0.5, 0.5),
            pixels_per_unit: Self::PIXELS_PER_UNIT,
        }
    }

    fn name(&self) -> &str {
        self.texture.name()
    }

    fn release(&self) {
        self.texture.release();
    }
}
