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

use redux_agents::ModuleRegistry;
use redux_data::OverrideContext;
use std::fmt;

/// One registered module, as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Plugin identity the module came from.
    pub identity: String,
    /// Module name.
    pub name: String,
    /// Declared priority.
    pub priority: i32,
    /// Sprite overrides, bundle previews included.
    pub sprites: usize,
    /// Texture overrides.
    pub textures: usize,
    /// Text processors.
    pub processors: usize,
    /// Bundle records.
    pub bundles: usize,
}

/// What one epoch loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduxReport {
    /// Modules, highest priority first.
    pub modules: Vec<ModuleSummary>,
    /// Sprite names with an override, sorted.
    pub sprite_overrides: Vec<String>,
    /// Texture names with an override, sorted.
    pub texture_overrides: Vec<String>,
    /// Text resources with at least one pipeline stage, sorted.
    pub text_resources: Vec<String>,
    /// Loaded bundle keys, in registry order.
    pub bundle_keys: Vec<String>,
}

impl ReduxReport {
    pub(crate) fn collect(registry: &ModuleRegistry, ctx: &OverrideContext) -> Self {
        let modules = registry
            .active_modules()
            .map(|record| ModuleSummary {
                identity: record.identity().to_string(),
                name: record.name().to_string(),
                priority: record.priority(),
                sprites: record.sprites().len(),
                textures: record.textures().len(),
                processors: record.processor_count(),
                bundles: record.bundles().len(),
            })
            .collect();

        let sorted = |names: Vec<&str>| {
            let mut names: Vec<String> = names.into_iter().map(str::to_string).collect();
            names.sort();
            names
        };

        Self {
            modules,
            sprite_overrides: sorted(ctx.sprites().names().collect()),
            texture_overrides: sorted(ctx.textures().names().collect()),
            text_resources: sorted(ctx.text().names().collect()),
            bundle_keys: registry
                .loaded_bundles(ctx)
                .into_iter()
                .map(|b| b.key.clone())
                .collect(),
        }
    }
}

impl fmt::Display for ReduxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modules ({}):", self.modules.len())?;
        for m in &self.modules {
            writeln!(
                f,
                "  [{:>4}] {} ({}): {} sprite(s), {} texture(s), {} processor(s), {} bundle(s)",
                m.priority, m.name, m.identity, m.sprites, m.textures, m.processors, m.bundles
            )?;
        }
        writeln!(f, "Sprite overrides: {}", self.sprite_overrides.len())?;
        for name in &self.sprite_overrides {
            writeln!(f, "  {name}")?;
        }
        writeln!(f, "Texture overrides: {}", self.texture_overrides.len())?;
        for name in &self.texture_overrides {
            writeln!(f, "  {name}")?;
        }
        writeln!(f, "Text resources: {}", self.text_resources.len())?;
        for name in &self.text_resources {
            writeln!(f, "  {name}")?;
        }
        write!(f, "Bundles: {}", self.bundle_keys.len())?;
        for key in &self.bundle_keys {
            write!(f, "\n  {key}")?;
        }
        Ok(())
    }
}
