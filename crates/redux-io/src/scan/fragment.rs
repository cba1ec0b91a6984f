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
use std::path::Path;

/// Removes one enclosing `[` … `]` pair, if the trimmed text has one.
///
/// The result is trimmed again, so `"[ {a} ]"` becomes `"{a}"`.
pub fn strip_enclosing_brackets(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Reads every `*.{extension}` file directly inside `folder`, in file-name
/// order, and returns the non-empty array bodies.
///
/// Unreadable files are logged and skipped.
///
/// # Errors
/// Fails if `folder` itself is missing or unreadable.
pub fn scan_fragment_folder(folder: &Path, extension: &str) -> ReduxResult<Vec<String>> {
    let files = sorted_children(folder, |entry| {
        entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
    })?;

    let mut fragments = Vec::new();
    for file in files {
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                log::error!("[Scan] Failed to read fragment '{}': {e}", file.display());
                continue;
            }
        };

        let body = strip_enclosing_brackets(&text);
        if !body.is_empty() {
            fragments.push(body.to_string());
        }
    }

    log::debug!(
        "[Scan] Fragment folder '{}' yielded {} fragment(s).",
        folder.display(),
        fragments.len()
    );
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_strip_enclosing_brackets() {
        assert_eq!(strip_enclosing_brackets("  [ {\"a\":1} ]\n"), "{\"a\":1}");
        assert_eq!(strip_enclosing_brackets("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_enclosing_brackets("[]"), "");
        assert_eq!(strip_enclosing_brackets("[[1],[2]]"), "[1],[2]");
    }

    #[test]
    fn test_scan_is_sorted_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "[{\"b\":2}]").unwrap();
        fs::write(dir.path().join("a.json"), "{\"a\":1}").unwrap();
        fs::write(dir.path().join("c.JSON"), "[ ]").unwrap();
        fs::write(dir.path().join("notes.txt"), "[{\"skip\":1}]").unwrap();
        fs::create_dir(dir.path().join("sub.json")).unwrap();

        let fragments = scan_fragment_folder(dir.path(), "json").unwrap();
        assert_eq!(fragments, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_fragment_folder(&dir.path().join("nope"), "json").is_err());
    }
}
