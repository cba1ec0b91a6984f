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

//! Wall-clock timing of labelled sections.

use log::Level;
use std::time::{Duration, Instant};

/// A started wall-clock timer.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    #[inline]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in milliseconds, as a float.
    #[inline]
    pub fn elapsed_ms_f64(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs how long its scope took when it is dropped.
///
/// The measurement is reported even on early returns.
pub struct ScopedTimer {
    label: String,
    level: Level,
    stopwatch: Stopwatch,
}

impl ScopedTimer {
    /// Starts a timer reported at `debug` level.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_level(label, Level::Debug)
    }

    /// Starts a timer reported at `level`.
    pub fn with_level(label: impl Into<String>, level: Level) -> Self {
        Self {
            label: label.into(),
            level,
            stopwatch: Stopwatch::new(),
        }
    }

    /// Time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::log!(
            self.level,
            "[Timer] {} took {:.3} ms",
            self.label,
            self.stopwatch.elapsed_ms_f64()
        );
    }
}
