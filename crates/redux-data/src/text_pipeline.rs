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

//! Ordered text transforms per resource name, with a per-instance result cache.

use redux_core::module::TextProcessor;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Host-assigned identity of one text asset instance.
pub type InstanceId = u64;

/// The outcome of running a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResolution {
    /// `true` when at least one stage is registered for the resource.
    pub changed: bool,
    /// The final text (the original when `changed` is `false`).
    pub text: String,
}

impl TextResolution {
    fn unchanged(text: &str) -> Self {
        Self {
            changed: false,
            text: text.to_string(),
        }
    }
}

/// Text transform pipelines keyed by resource name.
///
/// Results of [`resolve_cached`](Self::resolve_cached) are memoized per
/// instance. Registering any processor drops every memoized result, not only
/// the ones for the affected name.
#[derive(Default)]
pub struct TextPipeline {
    stages: HashMap<String, Vec<TextProcessor>>,
    results: HashMap<InstanceId, TextResolution>,
}

impl TextPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `processor` to the stages of `name`.
    pub fn register_processor(&mut self, name: &str, processor: TextProcessor) {
        if name.is_empty() {
            return;
        }
        self.stages.entry(name.to_string()).or_default().push(processor);
        self.invalidate_results();
    }

    /// Drops every memoized result, keeping the stages.
    ///
    /// Needed whenever the output of an existing stage changes, such as when
    /// more fragments are merged by an already installed merge stage.
    pub fn invalidate_results(&mut self) {
        if !self.results.is_empty() {
            log::trace!(
                "[TextPipeline] Invalidating {} cached result(s).",
                self.results.len()
            );
            self.results.clear();
        }
    }

    /// Number of stages registered for `name`.
    pub fn stage_count(&self, name: &str) -> usize {
        self.stages.get(name).map_or(0, Vec::len)
    }

    /// Every resource name with at least one stage.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    /// Runs every stage of `name` over `original`, in registration order.
    ///
    /// A stage that fails or panics is logged and skipped; the next stage
    /// receives the previous value.
    pub fn resolve(&self, name: &str, original: &str) -> TextResolution {
        let Some(stages) = self.stages.get(name).filter(|s| !s.is_empty()) else {
            return TextResolution::unchanged(original);
        };

        let mut current = original.to_string();
        for (index, stage) in stages.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| stage(current.as_str()))) {
                Ok(Ok(next)) => current = next,
                Ok(Err(e)) => {
                    log::error!("[TextPipeline] Stage {index} of '{name}' failed: {e:#}");
                }
                Err(_) => {
                    log::error!("[TextPipeline] Stage {index} of '{name}' panicked.");
                }
            }
        }

        TextResolution {
            changed: true,
            text: current,
        }
    }

    /// Like [`resolve`](Self::resolve), memoized per `instance` until the next
    /// registration or [`clear`](Self::clear).
    pub fn resolve_cached(&mut self, instance: InstanceId, name: &str, original: &str) -> TextResolution {
        if let Some(hit) = self.results.get(&instance) {
            return hit.clone();
        }
        let resolution = self.resolve(name, original);
        self.results.insert(instance, resolution.clone());
        resolution
    }

    /// Number of memoized results.
    pub fn cached_len(&self) -> usize {
        self.results.len()
    }

    /// Drops every stage and every memoized result.
    pub fn clear(&mut self) {
        self.stages.clear();
        self.results.clear();
        log::info!("[TextPipeline] Pipelines reset.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redux_core::module::{infallible_processor, text_processor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_stages_run_in_order() {
        let mut pipeline = TextPipeline::new();
        pipeline.register_processor("greeting", infallible_processor(|t| format!("{t} world")));
        pipeline.register_processor("greeting", infallible_processor(|t| t.to_uppercase()));

        let out = pipeline.resolve("greeting", "hello");
        assert!(out.changed);
        assert_eq!(out.text, "HELLO WORLD");
    }

    #[test]
    fn test_unknown_name_is_unchanged() {
        let pipeline = TextPipeline::new();
        let out = pipeline.resolve("nothing", "text");
        assert!(!out.changed);
        assert_eq!(out.text, "text");
    }

    #[test]
    fn test_failing_stage_carries_previous_value() {
        let mut pipeline = TextPipeline::new();
        pipeline.register_processor("n", infallible_processor(|t| format!("{t}1")));
        pipeline.register_processor("n", text_processor(|_| anyhow::bail!("boom")));
        pipeline.register_processor("n", text_processor(|_| -> anyhow::Result<String> { panic!("kaboom") }));
        pipeline.register_processor("n", infallible_processor(|t| format!("{t}2")));

        assert_eq!(pipeline.resolve("n", "x").text, "x12");
    }

    #[test]
    fn test_cached_result_is_reused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut pipeline = TextPipeline::new();
        pipeline.register_processor(
            "n",
            infallible_processor(move |t| {
                counter.fetch_add(1, Ordering::SeqCst);
                t.to_string()
            }),
        );

        pipeline.resolve_cached(1, "n", "a");
        pipeline.resolve_cached(1, "n", "a");
        pipeline.resolve_cached(2, "n", "a");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.cached_len(), 2);
    }

    #[test]
    fn test_registration_invalidates_unrelated_results() {
        let mut pipeline = TextPipeline::new();
        pipeline.register_processor("n", infallible_processor(|t| format!("{t}!")));
        pipeline.register_processor("other", infallible_processor(|t| t.to_string()));

        assert_eq!(pipeline.resolve_cached(1, "n", "a").text, "a!");
        pipeline.resolve_cached(2, "other", "b");
        assert_eq!(pipeline.cached_len(), 2);

        pipeline.register_processor("n", infallible_processor(|t| format!("{t}?")));
        assert_eq!(pipeline.cached_len(), 0);
        assert_eq!(pipeline.resolve_cached(1, "n", "a").text, "a!?");
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut pipeline = TextPipeline::new();
        pipeline.register_processor("n", infallible_processor(|t| t.to_string()));
        pipeline.resolve_cached(1, "n", "a");
        pipeline.clear();
        assert_eq!(pipeline.stage_count("n"), 0);
        assert_eq!(pipeline.cached_len(), 0);
    }
}
