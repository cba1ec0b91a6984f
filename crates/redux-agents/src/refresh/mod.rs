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

//! Debounced, chunked re-application of overrides to live host objects.
//!
//! Refresh requests restart a debounce timer; when it fires the coordinator
//! snapshots the host population and walks it a slice at a time, one slice
//! per [`tick`](RefreshCoordinator::tick). Each visited object is resolved
//! asynchronously and re-bound only if it does not already hold the cached
//! object.

mod target;

pub use target::{BoundAsset, OverrideTarget, Population, TargetKind};

use redux_core::event::{EventBus, LifecycleEvent};
use redux_core::ReduxConfig;
use redux_data::OverrideContext;
use redux_telemetry::Stopwatch;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};
use target::bind_if_current;

/// Where the coordinator stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Nothing scheduled, nothing running.
    Idle,
    /// A run is scheduled and waiting for the debounce delay.
    Pending,
    /// A scan is in progress.
    Running,
}

/// Counters accumulated since the coordinator was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Refresh requests, including those produced by lifecycle events.
    pub requests: u64,
    /// Scans started.
    pub scans_started: u64,
    /// Scans that visited their whole snapshot.
    pub scans_completed: u64,
    /// Debounced runs that fired while a scan was running.
    pub runs_dropped: u64,
    /// Objects visited across all scans.
    pub objects_visited: u64,
    /// Bindings actually replaced.
    pub bindings: u64,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledRun {
    id: u64,
    due: Instant,
}

struct ScanCursor {
    run: u64,
    targets: Vec<Weak<dyn OverrideTarget>>,
    next: usize,
    stopwatch: Stopwatch,
}

/// Debounces refresh requests and drives chunked scans.
pub struct RefreshCoordinator {
    debounce: Duration,
    chunk_size: usize,
    slice_budget: Option<Duration>,
    scheduled: Option<ScheduledRun>,
    next_run: u64,
    scan: Option<ScanCursor>,
    events: EventBus<LifecycleEvent>,
    stats: RefreshStats,
    bindings: Rc<Cell<u64>>,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator using the refresh settings of `config`.
    pub fn new(config: &ReduxConfig) -> Self {
        Self {
            debounce: config.refresh_debounce(),
            chunk_size: config.scan_chunk_size.max(1),
            slice_budget: config.scan_slice_budget(),
            scheduled: None,
            next_run: 0,
            scan: None,
            events: EventBus::new(),
            stats: RefreshStats::default(),
            bindings: Rc::new(Cell::new(0)),
        }
    }

    /// Sender for lifecycle events; each one received becomes a refresh
    /// request on the next tick.
    pub fn lifecycle_sender(&self) -> flume::Sender<LifecycleEvent> {
        self.events.sender()
    }

    /// Requests a refresh now.
    pub fn request_refresh(&mut self) {
        self.request_refresh_at(Instant::now());
    }

    /// Requests a refresh at `now`, cancelling and replacing any run that
    /// has not started yet.
    pub fn request_refresh_at(&mut self, now: Instant) {
        self.stats.requests += 1;
        if let Some(previous) = self.scheduled.take() {
            log::trace!("[RefreshCoordinator] Run #{} cancelled and replaced.", previous.id);
        }
        let run = ScheduledRun {
            id: self.next_run,
            due: now + self.debounce,
        };
        self.next_run += 1;
        self.scheduled = Some(run);
    }

    /// Current state. A running scan takes precedence over a scheduled run.
    pub fn state(&self) -> RefreshState {
        if self.scan.is_some() {
            RefreshState::Running
        } else if self.scheduled.is_some() {
            RefreshState::Pending
        } else {
            RefreshState::Idle
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> RefreshStats {
        RefreshStats {
            bindings: self.bindings.get(),
            ..self.stats
        }
    }

    /// Advances the coordinator using the current time.
    pub fn tick(&mut self, ctx: &mut OverrideContext, population: &dyn Population) -> usize {
        self.tick_at(Instant::now(), ctx, population)
    }

    /// Advances the coordinator as of `now`.
    ///
    /// Drains lifecycle events, fires a due run, visits one slice of the
    /// running scan and applies finished decodes. Returns the number of
    /// objects visited.
    pub fn tick_at(
        &mut self,
        now: Instant,
        ctx: &mut OverrideContext,
        population: &dyn Population,
    ) -> usize {
        for event in self.events.drain() {
            log::debug!("[RefreshCoordinator] {event:?} received.");
            self.request_refresh_at(now);
        }

        if let Some(run) = self.scheduled.filter(|run| run.due <= now) {
            self.scheduled = None;
            self.fire(run, population);
        }

        let visited = self.advance(ctx);
        ctx.pump();
        visited
    }

    fn fire(&mut self, run: ScheduledRun, population: &dyn Population) {
        if let Some(scan) = &self.scan {
            log::debug!(
                "[RefreshCoordinator] Run #{} dropped, scan #{} still running.",
                run.id,
                scan.run
            );
            self.stats.runs_dropped += 1;
            return;
        }

        let targets = population.snapshot();
        log::info!(
            "[RefreshCoordinator] Scan #{} started over {} object(s).",
            run.id,
            targets.len()
        );
        self.stats.scans_started += 1;
        self.scan = Some(ScanCursor {
            run: run.id,
            targets,
            next: 0,
            stopwatch: Stopwatch::new(),
        });
    }

    fn advance(&mut self, ctx: &mut OverrideContext) -> usize {
        let Some(scan) = self.scan.as_mut() else {
            return 0;
        };

        let slice = Stopwatch::new();
        let mut visited = 0;
        while scan.next < scan.targets.len() && visited < self.chunk_size {
            if let Some(budget) = self.slice_budget {
                if visited > 0 && slice.elapsed() >= budget {
                    break;
                }
            }
            apply_target(&scan.targets[scan.next], ctx, &self.bindings);
            scan.next += 1;
            visited += 1;
        }
        self.stats.objects_visited += visited as u64;

        if scan.next >= scan.targets.len() {
            log::info!(
                "[RefreshCoordinator] Scan #{} finished: {} object(s) in {:.3} ms.",
                scan.run,
                scan.targets.len(),
                scan.stopwatch.elapsed_ms_f64()
            );
            self.stats.scans_completed += 1;
            self.scan = None;
        }
        visited
    }
}

fn apply_target(target: &Weak<dyn OverrideTarget>, ctx: &mut OverrideContext, bindings: &Rc<Cell<u64>>) {
    let Some(live) = target.upgrade() else {
        return;
    };
    if !live.is_alive() {
        return;
    }
    let Some(name) = live.asset_name().filter(|name| !name.is_empty()) else {
        return;
    };
    let kind = live.kind();
    drop(live);

    let weak = target.clone();
    let counter = bindings.clone();
    let expected = name.clone();
    match kind {
        TargetKind::ImageDisplay | TargetKind::Sprite2D => {
            ctx.sprites_mut().resolve_async(&name, move |handle| {
                if let Some(handle) = handle {
                    if bind_if_current(&weak, &expected, BoundAsset::Sprite(handle)) {
                        counter.set(counter.get() + 1);
                    }
                }
            });
        }
        TargetKind::Material3D => {
            ctx.textures_mut().resolve_async(&name, move |handle| {
                if let Some(handle) = handle {
                    if bind_if_current(&weak, &expected, BoundAsset::Texture(handle)) {
                        counter.set(counter.get() + 1);
                    }
                }
            });
        }
    }
}
