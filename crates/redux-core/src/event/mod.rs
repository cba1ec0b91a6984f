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

//! Lifecycle signals sent by the host to the refresh machinery.

mod bus;

pub use bus::EventBus;

/// A host lifecycle moment after which overrides should be re-applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host finished booting.
    Startup,
    /// A scene finished loading.
    SceneLoaded(String),
    /// Someone asked for a refresh explicitly.
    Manual,
}
