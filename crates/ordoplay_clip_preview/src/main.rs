// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Clip Preview - headless host for execution clips
//!
//! Usage: `ordoplay_clip_preview [settings.ron] [execution]`
//!
//! Without a settings argument, `clips.ron` in the working directory is used
//! when present.
//!
//! Builds the demo executions, plays one of them at a fixed step rate
//! against a pair of dummy targets, and prints a JSON report of every
//! firing and applied effect. Logs go to stderr.

mod demo;
mod preview;

use ordoplay_execution_clip::settings::SETTINGS_FILE_NAME;
use ordoplay_execution_clip::{ClipSettings, ContactId, ExecutionCatalog};
use preview::{describe_clip, Dummy, Preview};
use std::path::PathBuf;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = ["ordoplay_clip_preview=info", "ordoplay_execution_clip=debug"]
        .into_iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(tracing_subscriber::EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive)
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting OrdoPlay Clip Preview v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from(SETTINGS_FILE_NAME)).filter(|p| p.exists()));
    let settings = match settings_path {
        Some(path) => ClipSettings::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Falling back to default settings: {e}");
            ClipSettings::default()
        }),
        None => ClipSettings::default(),
    };

    let registry = demo::create_effect_registry();
    for (tag, order) in registry.list_available() {
        tracing::debug!("Effect type {tag} (order {order})");
    }

    let catalog = match demo::create_demo_catalog(&registry, &settings) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to build executions: {e}");
            std::process::exit(1);
        }
    };
    log_catalog(&catalog);

    let Some(execution) = args.next().or_else(|| catalog.names().next().map(str::to_string)) else {
        tracing::error!("No executions to preview");
        std::process::exit(1);
    };

    let dummies = vec![
        Dummy {
            contact: ContactId(1),
            position: [0.0, 1.0, 7.5],
        },
        Dummy {
            contact: ContactId(2),
            position: [1.5, 0.5, 0.0],
        },
    ];
    let report = match Preview::new(&catalog, &settings, dummies).run(&execution) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Preview of '{execution}' failed: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to write report: {e}");
            std::process::exit(1);
        }
    }
}

fn log_catalog(catalog: &ExecutionCatalog) {
    for definition in catalog.definitions() {
        tracing::info!(
            "Execution '{}': {} clips over {}s",
            definition.name,
            definition.clip_count(),
            definition.total_time
        );
        for clip in definition.clips() {
            tracing::info!("  {}", describe_clip(clip));
        }
    }
}
