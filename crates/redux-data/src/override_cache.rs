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

//! Two-level override cache: name → absolute path, path → materialized asset.
//!
//! Several names may point at the same file. Materialized objects are keyed
//! by path, so all of those names share one object, and `clear` releases
//! every object exactly once.

use crate::asset::OverrideAsset;
use redux_core::asset::{AssetHandle, AssetSource, Bitmap};
use redux_io::{DecodeCompletion, DecodeWorker};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Invoked on the logical thread once an async resolve settles.
pub type ResolveCallback<T> = Box<dyn FnOnce(Option<AssetHandle<T>>)>;

#[derive(Debug, Clone)]
struct PathEntry {
    name: String,
    path: PathBuf,
}

struct PendingDecode<T: OverrideAsset> {
    name: String,
    callbacks: Vec<ResolveCallback<T>>,
}

/// Caches override assets of one kind (sprites or textures).
///
/// Lookups are case-insensitive on the override name.
pub struct OverrideCache<T: OverrideAsset> {
    paths: HashMap<String, PathEntry>,
    materialized: HashMap<PathBuf, AssetHandle<T>>,
    source: Arc<dyn AssetSource<Bitmap>>,
    worker: Option<DecodeWorker<Bitmap>>,
    pending: HashMap<PathBuf, PendingDecode<T>>,
    epoch: u64,
}

fn key_of(name: &str) -> String {
    name.to_lowercase()
}

impl<T: OverrideAsset> OverrideCache<T> {
    /// Creates an empty cache that decodes through `source`.
    pub fn new(source: Arc<dyn AssetSource<Bitmap>>) -> Self {
        Self {
            paths: HashMap::new(),
            materialized: HashMap::new(),
            source,
            worker: None,
            pending: HashMap::new(),
            epoch: 0,
        }
    }

    /// Maps `name` to `absolute_path`, replacing any previous mapping.
    ///
    /// Empty names or paths are ignored.
    pub fn register(&mut self, name: &str, absolute_path: impl Into<PathBuf>) {
        let path = absolute_path.into();
        if name.is_empty() || path.as_os_str().is_empty() {
            return;
        }

        let previous = self.paths.insert(
            key_of(name),
            PathEntry {
                name: name.to_string(),
                path: path.clone(),
            },
        );
        if let Some(previous) = previous.filter(|p| p.path != path) {
            log::debug!(
                "[OverrideCache] {} '{}' remapped (was '{}').",
                T::KIND,
                name,
                previous.path.display()
            );
        }
    }

    /// Returns `true` if `name` has a path mapping.
    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(&key_of(name))
    }

    /// The absolute path `name` is mapped to.
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.paths.get(&key_of(name)).map(|e| e.path.as_path())
    }

    /// Every mapped name, as registered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.values().map(|e| e.name.as_str())
    }

    /// Number of mapped names.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no name is mapped.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of live materialized objects.
    pub fn materialized_count(&self) -> usize {
        self.materialized.len()
    }

    /// Resolves `name` synchronously, decoding on first use of its path.
    ///
    /// Returns `None` when there is no override or the file cannot be
    /// decoded; the failure is logged and the caller keeps the original asset.
    pub fn try_resolve(&mut self, name: &str) -> Option<AssetHandle<T>> {
        let path = self.paths.get(&key_of(name))?.path.clone();

        if let Some(handle) = self.materialized.get(&path) {
            return Some(handle.clone());
        }

        match self.source.load_path(&path) {
            Ok(bitmap) => Some(self.store(name, path, bitmap)),
            Err(e) => {
                log::error!("[OverrideCache] {} '{}' unavailable: {e}", T::KIND, name);
                None
            }
        }
    }

    /// Resolves `name` without blocking on disk I/O.
    ///
    /// Cached objects and misses are answered immediately. Otherwise the path
    /// is queued on the decode worker and `on_ready` runs from a later
    /// [`pump`](Self::pump). Concurrent requests for one path share a single
    /// decode and receive the same object. Requests still pending when the
    /// cache is cleared are dropped without being called.
    pub fn resolve_async(&mut self, name: &str, on_ready: impl FnOnce(Option<AssetHandle<T>>) + 'static) {
        let Some(path) = self.paths.get(&key_of(name)).map(|e| e.path.clone()) else {
            on_ready(None);
            return;
        };

        if let Some(handle) = self.materialized.get(&path) {
            on_ready(Some(handle.clone()));
            return;
        }

        if let Some(pending) = self.pending.get_mut(&path) {
            pending.callbacks.push(Box::new(on_ready));
            return;
        }

        if !self.ensure_worker() {
            let handle = self.try_resolve(name);
            on_ready(handle);
            return;
        }

        let epoch = self.epoch;
        let submitted = self
            .worker
            .as_mut()
            .map(|worker| worker.submit(path.clone(), epoch))
            .unwrap_or(false);
        if !submitted {
            self.worker = None;
            let handle = self.try_resolve(name);
            on_ready(handle);
            return;
        }

        self.pending.insert(
            path,
            PendingDecode {
                name: name.to_string(),
                callbacks: vec![Box::new(on_ready)],
            },
        );
    }

    /// Applies every finished background decode. Returns how many settled.
    pub fn pump(&mut self) -> usize {
        let Some(worker) = self.worker.as_mut() else {
            return 0;
        };
        let ready = worker.try_completions();
        let count = ready.len();
        for completion in ready {
            self.complete(completion);
        }
        count
    }

    /// Blocks until no async resolve is pending or `timeout` elapses.
    ///
    /// Returns how many decodes settled.
    pub fn wait_idle(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut settled = 0;
        while !self.pending.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let Some(worker) = self.worker.as_mut() else {
                break;
            };
            match worker.wait_completion(deadline - now) {
                Some(completion) => {
                    self.complete(completion);
                    settled += 1;
                }
                None => break,
            }
        }
        settled
    }

    /// Number of paths with an async decode in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Releases every materialized object once and forgets all mappings.
    ///
    /// Returns the number of objects released.
    pub fn clear(&mut self) -> usize {
        let released = self.materialized.len();
        for handle in self.materialized.values() {
            handle.release();
        }
        self.materialized.clear();
        self.paths.clear();
        self.pending.clear();
        self.epoch += 1;

        log::info!(
            "[OverrideCache] {} cache cleared ({} object(s) released).",
            T::KIND,
            released
        );
        released
    }

    fn store(&mut self, name: &str, path: PathBuf, bitmap: Bitmap) -> AssetHandle<T> {
        let handle = AssetHandle::new(T::materialize(name, bitmap));
        log::debug!(
            "[OverrideCache] Materialized {} '{}' from '{}' as {}.",
            T::KIND,
            name,
            path.display(),
            handle.id()
        );
        self.materialized.insert(path, handle.clone());
        handle
    }

    fn complete(&mut self, completion: DecodeCompletion<Bitmap>) {
        if completion.tag != self.epoch {
            log::trace!(
                "[OverrideCache] Dropping stale decode of '{}'.",
                completion.path.display()
            );
            return;
        }
        let Some(pending) = self.pending.remove(&completion.path) else {
            return;
        };

        let handle = match completion.result {
            Ok(bitmap) => match self.materialized.get(&completion.path) {
                Some(existing) => Some(existing.clone()),
                None => Some(self.store(&pending.name, completion.path, bitmap)),
            },
            Err(e) => {
                log::error!("[OverrideCache] {} '{}' unavailable: {e}", T::KIND, pending.name);
                None
            }
        };

        for callback in pending.callbacks {
            callback(handle.clone());
        }
    }

    fn ensure_worker(&mut self) -> bool {
        if self.worker.is_some() {
            return true;
        }
        let thread_name = format!("redux-decode-{}", T::KIND);
        match DecodeWorker::spawn(&thread_name, self.source.clone()) {
            Ok(worker) => {
                self.worker = Some(worker);
                true
            }
            Err(e) => {
                log::error!("[OverrideCache] Could not start decode worker, decoding inline: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Sprite, Texture};
    use redux_core::error::{ReduxError, ReduxResult};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Decodes any path except ones ending in `broken.png`, counting calls.
    #[derive(Default)]
    struct FakeSource {
        loads: AtomicUsize,
    }

    impl AssetSource<Bitmap> for FakeSource {
        fn load_path(&self, path: &Path) -> ReduxResult<Bitmap> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if path.ends_with("broken.png") {
                return Err(ReduxError::Decode {
                    path: path.to_path_buf(),
                    message: "invalid image".into(),
                });
            }
            Ok(Bitmap::solid(2, 2, [255, 0, 0, 255]))
        }
    }

    fn cache<T: OverrideAsset>() -> (OverrideCache<T>, Arc<FakeSource>) {
        let source = Arc::new(FakeSource::default());
        (OverrideCache::new(source.clone()), source)
    }

    #[test]
    fn test_miss_without_mapping() {
        let (mut sprites, source) = cache::<Sprite>();
        assert!(sprites.try_resolve("nothing").is_none());
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_repeated_resolve_returns_same_object() {
        let (mut sprites, source) = cache::<Sprite>();
        sprites.register("hero", "/mods/a/hero.png");

        let first = sprites.try_resolve("hero").unwrap();
        let second = sprites.try_resolve("hero").unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(first.name(), "hero");
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_aliased_names_share_one_object() {
        let (mut textures, source) = cache::<Texture>();
        textures.register("wall_a", "/mods/a/wall.png");
        textures.register("wall_b", "/mods/a/wall.png");

        let a = textures.try_resolve("wall_a").unwrap();
        let b = textures.try_resolve("wall_b").unwrap();

        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert_eq!(textures.materialized_count(), 1);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let (mut sprites, _) = cache::<Sprite>();
        sprites.register("hero", "/mods/a/hero.png");
        sprites.register("hero", "/mods/b/hero.png");
        assert_eq!(sprites.path_of("hero"), Some(Path::new("/mods/b/hero.png")));
        assert_eq!(sprites.len(), 1);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let (mut sprites, _) = cache::<Sprite>();
        sprites.register("Btn_OK", "/mods/a/ok.png");
        assert!(sprites.contains("btn_ok"));
        let sprite = sprites.try_resolve("BTN_OK").unwrap();
        assert_eq!(sprite.name(), "BTN_OK");
    }

    #[test]
    fn test_empty_registration_is_ignored() {
        let (mut sprites, _) = cache::<Sprite>();
        sprites.register("", "/mods/a/x.png");
        sprites.register("x", "");
        assert!(sprites.is_empty());
    }

    #[test]
    fn test_decode_failure_degrades_to_miss() {
        let (mut sprites, _) = cache::<Sprite>();
        sprites.register("bad", "/mods/a/broken.png");
        assert!(sprites.try_resolve("bad").is_none());
        assert_eq!(sprites.materialized_count(), 0);
    }

    #[test]
    fn test_clear_releases_each_object_once() {
        let (mut textures, _) = cache::<Texture>();
        textures.register("a", "/mods/a/shared.png");
        textures.register("b", "/mods/a/shared.png");
        textures.register("c", "/mods/a/other.png");

        let a = textures.try_resolve("a").unwrap();
        textures.try_resolve("b").unwrap();
        let c = textures.try_resolve("c").unwrap();

        assert_eq!(textures.clear(), 2);
        assert!(a.is_released());
        assert!(c.is_released());
        assert!(textures.try_resolve("a").is_none());
        assert!(textures.is_empty());
    }

    #[test]
    fn test_async_requests_for_one_path_coalesce() {
        let (mut sprites, source) = cache::<Sprite>();
        sprites.register("x", "/mods/a/x.png");
        sprites.register("y", "/mods/a/x.png");

        let results: Rc<RefCell<Vec<AssetHandle<Sprite>>>> = Rc::default();
        for name in ["x", "y", "x"] {
            let sink = results.clone();
            sprites.resolve_async(name, move |handle| sink.borrow_mut().extend(handle));
        }
        assert_eq!(sprites.pending_count(), 1);

        sprites.wait_idle(Duration::from_secs(5));

        let results = results.borrow();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|h| h.ptr_eq(&results[0])));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);

        let sync = sprites.try_resolve("y").unwrap();
        assert!(sync.ptr_eq(&results[0]));
    }

    #[test]
    fn test_async_miss_answers_immediately() {
        let (mut sprites, _) = cache::<Sprite>();
        let called = Rc::new(RefCell::new(None));
        let sink = called.clone();
        sprites.resolve_async("ghost", move |handle| {
            *sink.borrow_mut() = Some(handle.is_none());
        });
        assert_eq!(*called.borrow(), Some(true));
    }

    #[test]
    fn test_clear_drops_pending_callbacks() {
        let (mut sprites, _) = cache::<Sprite>();
        sprites.register("x", "/mods/a/x.png");

        let called = Rc::new(RefCell::new(false));
        let sink = called.clone();
        sprites.resolve_async("x", move |_| *sink.borrow_mut() = true);
        sprites.clear();

        std::thread::sleep(Duration::from_millis(50));
        sprites.pump();
        assert!(!*called.borrow());
        assert_eq!(sprites.materialized_count(), 0);
    }
}
