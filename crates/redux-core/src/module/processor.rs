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

use std::fmt;
use std::sync::Arc;

/// A text transform stage: consumes the previous text and returns the next.
///
/// Stages may fail; the pipeline logs the failure and carries the previous
/// value forward.
pub type TextProcessor = Arc<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>;

/// Wraps a closure into a [`TextProcessor`].
pub fn text_processor<F>(f: F) -> TextProcessor
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps an infallible closure into a [`TextProcessor`].
pub fn infallible_processor<F>(f: F) -> TextProcessor
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Arc::new(move |text| Ok(f(text)))
}

/// A named processor, kept for reports and debugging.
#[derive(Clone)]
pub struct NamedProcessor {
    /// Name of the text asset the processor targets.
    pub target: String,
    /// The transform itself.
    pub processor: TextProcessor,
}

impl fmt::Debug for NamedProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedProcessor")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
