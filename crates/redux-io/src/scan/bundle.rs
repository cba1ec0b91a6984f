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

use super::sorted_children;
use redux_core::error::ReduxResult;
use std::path::{Path, PathBuf};

/// One bundle subfolder, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Synthesized `{module}_{subfolder}` key, unique across modules.
    pub key: String,
    /// Name of the subfolder the entry came from.
    pub folder: String,
    /// Full text of the primary data file.
    pub data: String,
    /// Absolute path of the preview image, when one exists.
    pub preview: Option<PathBuf>,
}

impl BundleEntry {
    /// The sprite name the preview image is registered under.
    pub fn preview_sprite_key(&self) -> String {
        bundle_preview_key(&self.key)
    }
}

/// Builds the cross-module unique key of a bundle entry.
pub fn bundle_key(module_name: &str, folder_name: &str) -> String {
    format!("{module_name}_{folder_name}")
}

/// Builds the sprite name a bundle preview is registered under.
pub fn bundle_preview_key(key: &str) -> String {
    if key.starts_with("Blueprint_") {
        key.to_string()
    } else {
        format!("Blueprint_{key}")
    }
}

/// Reads every subfolder of `folder` that contains `primary_file`.
///
/// Subfolders without the primary file are skipped silently. A primary file
/// that cannot be read is logged and skipped; the rest of the folder is still
/// scanned.
///
/// # Errors
/// Fails if `folder` itself is missing or unreadable.
pub fn scan_bundle_folder(
    module_name: &str,
    folder: &Path,
    primary_file: &str,
    preview_file: &str,
) -> ReduxResult<Vec<BundleEntry>> {
    let subfolders = sorted_children(folder, |entry| entry.file_type().is_dir())?;

    let mut entries = Vec::new();
    for subfolder in subfolders {
        let primary = subfolder.join(primary_file);
        if !primary.is_file() {
            continue;
        }

        let data = match std::fs::read_to_string(&primary) {
            Ok(data) => data,
            Err(e) => {
                log::error!("[Scan] Failed to read bundle file '{}': {e}", primary.display());
                continue;
            }
        };

        let folder_name = subfolder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let preview = subfolder.join(preview_file);

        entries.push(BundleEntry {
            key: bundle_key(module_name, &folder_name),
            folder: folder_name,
            data,
            preview: preview.is_file().then_some(preview),
        });
    }

    log::debug!(
        "[Scan] Bundle folder '{}' yielded {} entr(ies).",
        folder.display(),
        entries.len()
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_reads_primary_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let room = dir.path().join("Room");
        let hall = dir.path().join("Hall");
        let empty = dir.path().join("Empty");
        fs::create_dir_all(&room).unwrap();
        fs::create_dir_all(&hall).unwrap();
        fs::create_dir_all(&empty).unwrap();
        fs::write(room.join("blueprint.json"), "{\"room\":1}").unwrap();
        fs::write(room.join("preview.png"), b"png").unwrap();
        fs::write(hall.join("blueprint.json"), "{\"hall\":1}").unwrap();

        let entries = scan_bundle_folder("Deco", dir.path(), "blueprint.json", "preview.png").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "Deco_Hall");
        assert_eq!(entries[0].preview, None);
        assert_eq!(entries[1].key, "Deco_Room");
        assert_eq!(entries[1].data, "{\"room\":1}");
        assert_eq!(entries[1].preview, Some(room.join("preview.png")));
        assert_eq!(entries[1].preview_sprite_key(), "Blueprint_Deco_Room");
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_bundle_folder("m", &dir.path().join("nope"), "a", "b").is_err());
    }

    #[test]
    fn test_preview_key_is_not_double_prefixed() {
        assert_eq!(bundle_preview_key("Blueprint_x"), "Blueprint_x");
        assert_eq!(bundle_preview_key("x"), "Blueprint_x");
    }
}
