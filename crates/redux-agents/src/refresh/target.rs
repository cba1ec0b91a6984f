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

use redux_core::asset::{AssetHandle, AssetId};
use redux_data::{Sprite, Texture};
use std::rc::Weak;

/// The three kinds of host objects a scan can re-bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A UI image component showing a sprite.
    ImageDisplay,
    /// A 2D sprite renderer.
    Sprite2D,
    /// A 3D material's main texture.
    Material3D,
}

/// An override asset ready to be bound to a target.
#[derive(Debug, Clone)]
pub enum BoundAsset {
    /// For image displays and 2D sprite renderers.
    Sprite(AssetHandle<Sprite>),
    /// For 3D materials.
    Texture(AssetHandle<Texture>),
}

impl BoundAsset {
    /// Identity of the wrapped object.
    pub fn id(&self) -> AssetId {
        match self {
            Self::Sprite(handle) => handle.id(),
            Self::Texture(handle) => handle.id(),
        }
    }
}

/// A host object whose asset binding a refresh scan may replace.
///
/// Targets are shared with the host and observed through weak references, so
/// every method takes `&self`; implementations use interior mutability.
pub trait OverrideTarget {
    /// Which cache the target is resolved against.
    fn kind(&self) -> TargetKind;

    /// Whether the host object still exists.
    fn is_alive(&self) -> bool {
        true
    }

    /// Name of the asset currently bound, if any.
    fn asset_name(&self) -> Option<String>;

    /// Identity of the asset currently bound, if any.
    fn bound_asset(&self) -> Option<AssetId>;

    /// Replaces the bound asset.
    fn bind(&self, asset: BoundAsset);
}

/// The host's live object population.
pub trait Population {
    /// Every overridable object alive right now, in a stable order.
    fn snapshot(&self) -> Vec<Weak<dyn OverrideTarget>>;
}

/// Binds `asset` to `target` unless the target died, its bound name changed
/// since `expected_name` was read, or it already holds that very object.
///
/// Returns `true` if a binding was made.
pub(crate) fn bind_if_current(
    target: &Weak<dyn OverrideTarget>,
    expected_name: &str,
    asset: BoundAsset,
) -> bool {
    let Some(target) = target.upgrade() else {
        return false;
    };
    if !target.is_alive() || target.asset_name().as_deref() != Some(expected_name) {
        return false;
    }
    if target.bound_asset() == Some(asset.id()) {
        return false;
    }
    target.bind(asset);
    true
}
