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

//! A background thread that decodes files off the logical thread.
//!
//! The worker only ever produces values. Everything it decodes is handed back
//! through a completion queue that the owner drains on its own thread, so
//! caches are never touched concurrently.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use redux_core::asset::{Asset, AssetSource};
use redux_core::error::ReduxResult;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct DecodeRequest {
    path: PathBuf,
    tag: u64,
}

/// The outcome of one background decode.
#[derive(Debug)]
pub struct DecodeCompletion<A> {
    /// The file that was decoded.
    pub path: PathBuf,
    /// The caller-supplied tag, echoed back unchanged (caches use the epoch).
    pub tag: u64,
    /// The decoded asset, or why it could not be produced.
    pub result: ReduxResult<A>,
}

/// Owns one decode thread for assets of type `A`.
///
/// Dropping the worker closes the request channel and joins the thread once
/// it has finished the request in flight.
pub struct DecodeWorker<A: Asset> {
    requests: Option<Sender<DecodeRequest>>,
    completions: Receiver<DecodeCompletion<A>>,
    handle: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl<A: Asset> DecodeWorker<A> {
    /// Spawns the decode thread.
    ///
    /// # Errors
    /// Fails only if the operating system refuses to create the thread.
    pub fn spawn(name: &str, source: Arc<dyn AssetSource<A>>) -> std::io::Result<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<DecodeRequest>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                log::debug!("[DecodeWorker] Thread started.");
                for request in request_rx {
                    let result = source.load_path(&request.path);
                    let completion = DecodeCompletion {
                        path: request.path,
                        tag: request.tag,
                        result,
                    };
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                }
                log::debug!("[DecodeWorker] Thread stopped.");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            completions: done_rx,
            handle: Some(handle),
            in_flight: 0,
        })
    }

    /// Queues `path` for decoding. Returns `false` if the thread is gone.
    pub fn submit(&mut self, path: PathBuf, tag: u64) -> bool {
        let Some(requests) = &self.requests else {
            return false;
        };
        match requests.send(DecodeRequest { path, tag }) {
            Ok(()) => {
                self.in_flight += 1;
                true
            }
            Err(e) => {
                log::error!(
                    "[DecodeWorker] Decode thread unavailable, dropping '{}'.",
                    e.0.path.display()
                );
                false
            }
        }
    }

    /// Returns every completion that is ready, without blocking.
    pub fn try_completions(&mut self) -> Vec<DecodeCompletion<A>> {
        let ready: Vec<_> = self.completions.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(ready.len());
        ready
    }

    /// Blocks up to `timeout` for the next completion.
    pub fn wait_completion(&mut self, timeout: Duration) -> Option<DecodeCompletion<A>> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Requests submitted but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl<A: Asset> Drop for DecodeWorker<A> {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[DecodeWorker] Decode thread panicked.");
            }
        }
    }
}
