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

//! Loads a plugin manifest, runs one override epoch and prints a report.
//!
//! Run with: `redux-runtime <manifest.ron> [config.ron]`

use anyhow::{Context, Result};
use clap::Parser;
use redux_core::{PathResolver, ReduxConfig};
use redux_data::OverrideContext;
use redux_sdk::AssetRedux;
use redux_telemetry::ScopedTimer;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "redux-runtime", about = "Runs one asset override epoch from a plugin manifest")]
struct Args {
    /// RON plugin manifest.
    manifest: PathBuf,

    /// Optional RON configuration file.
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = redux_telemetry::DEFAULT_FILTER)]
    log_filter: String,

    /// Resolve every override once after registration.
    #[arg(long)]
    warm: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    redux_telemetry::init_logging(Some(&args.log_filter));

    let config = match &args.config {
        Some(path) => ReduxConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => ReduxConfig::default(),
    };
    log::info!("[Runtime] Conflict policy: {:?}", config.conflict_policy);

    let root = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut redux = AssetRedux::with_parts(OverrideContext::with_images(), PathResolver::new(root), config);

    redux.begin_epoch();
    let accepted = {
        let _timer = ScopedTimer::with_level("epoch registration", log::Level::Info);
        redux.load_manifest(&args.manifest)?
    };
    log::info!("[Runtime] {accepted} module(s) accepted.");

    let report = redux.report();
    if args.warm {
        warm(&mut redux, &report);
    }
    println!("{report}");
    Ok(())
}

fn warm(redux: &mut AssetRedux, report: &redux_sdk::ReduxReport) {
    let _timer = ScopedTimer::with_level("warm-up", log::Level::Info);
    let sprites = report
        .sprite_overrides
        .iter()
        .filter(|name| redux.resolve_sprite(name).is_some())
        .count();
    let textures = report
        .texture_overrides
        .iter()
        .filter(|name| redux.resolve_texture(name).is_some())
        .count();
    log::info!(
        "[Runtime] Warm-up decoded {sprites}/{} sprite(s) and {textures}/{} texture(s).",
        report.sprite_overrides.len(),
        report.texture_overrides.len()
    );
}
