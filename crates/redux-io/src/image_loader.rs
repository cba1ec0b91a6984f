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

//! Decoding of image files into [`Bitmap`]s.

use redux_core::asset::{Asset, AssetLoader, AssetSource, Bitmap};
use redux_core::error::{ReduxError, ReduxResult};
use std::error::Error;
use std::path::Path;

/// Decodes PNG and JPEG bytes into an RGBA8 [`Bitmap`] using the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl AssetLoader<Bitmap> for ImageLoader {
    fn load(&self, bytes: &[u8]) -> Result<Bitmap, Box<dyn Error + Send + Sync>> {
        let img = image::load_from_memory(bytes)?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Bitmap {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// An [`AssetSource`] that reads a file fully and hands the bytes to a loader.
///
/// Stateless; every call hits the disk.
#[derive(Debug, Clone, Default)]
pub struct FileSource<L> {
    loader: L,
}

impl<L> FileSource<L> {
    /// Wraps `loader`.
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

impl FileSource<ImageLoader> {
    /// The source used for sprite and texture overrides.
    pub fn images() -> Self {
        Self::new(ImageLoader)
    }
}

impl<A, L> AssetSource<A> for FileSource<L>
where
    A: Asset,
    L: AssetLoader<A> + Send + Sync,
{
    fn load_path(&self, path: &Path) -> ReduxResult<A> {
        let bytes = std::fs::read(path).map_err(|e| ReduxError::io(path, e))?;
        self.loader
            .load(&bytes)
            .map_err(|e| ReduxError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bmp = ImageLoader.load(&png_bytes(3, 2)).unwrap();
        assert_eq!((bmp.width, bmp.height), (3, 2));
        assert_eq!(&bmp.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(ImageLoader.load(b"not an image").is_err());
    }

    #[test]
    fn test_file_source_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"garbage").unwrap();

        let err = AssetSource::<Bitmap>::load_path(&FileSource::images(), &path).unwrap_err();
        assert!(matches!(err, ReduxError::Decode { .. }));
    }

    #[test]
    fn test_file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            AssetSource::<Bitmap>::load_path(&FileSource::images(), &dir.path().join("missing.png"))
                .unwrap_err();
        assert!(matches!(err, ReduxError::Io { .. }));
    }
}
