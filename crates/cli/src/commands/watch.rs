//! `gizmo watch`: feed stdin telemetry into a live cache and re-evaluate
//! a set of expressions after every accepted record.

use std::path::{Path, PathBuf};
use std::process;

use gizmo_core::Expression;
use gizmo_eval::{evaluate, run_feed_with, FeedParser, FeedStats, LineSource, LiveValueCache};
use tokio::io::BufReader;

use super::{live_value_json, load_expression};
use crate::config::GizmoConfig;
use crate::{report_error, OutputFormat};

fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) async fn cmd_watch(
    files: &[PathBuf],
    config: &GizmoConfig,
    output: OutputFormat,
    quiet: bool,
) {
    if config.device.is_empty() {
        report_error(
            "error: no [[device]] layouts configured; telemetry cannot be parsed",
            output,
            quiet,
        );
        process::exit(1);
    }
    let parser = FeedParser::new(config.device.iter().map(|d| d.layout()));
    let watched: Vec<(String, Expression)> = files
        .iter()
        .map(|f| (display_name(f), load_expression(f, output, quiet)))
        .collect();

    let cache = LiveValueCache::new();
    let mut source = LineSource::new(BufReader::new(tokio::io::stdin()));
    let print = |cache: &LiveValueCache, stats: &FeedStats| {
        print_values(&watched, cache, stats, config, output)
    };
    let stats = match run_feed_with(&mut source, &parser, &cache, print).await {
        Ok(stats) => stats,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if !quiet && output == OutputFormat::Text {
        eprintln!(
            "{} record(s) applied, {} skipped",
            stats.applied, stats.skipped
        );
    }
}

fn print_values(
    watched: &[(String, Expression)],
    cache: &LiveValueCache,
    stats: &FeedStats,
    config: &GizmoConfig,
    output: OutputFormat,
) {
    let mut values = serde_json::Map::new();
    for (name, expression) in watched {
        let result = evaluate(expression, cache, &config.eval);
        if let Err(e) = &result {
            tracing::debug!(expression = %name, error = %e, "evaluation pending");
        }
        match output {
            OutputFormat::Json => {
                let v = result
                    .map(|v| live_value_json(&v))
                    .unwrap_or(serde_json::Value::Null);
                values.insert(name.clone(), v);
            }
            OutputFormat::Text => match result {
                Ok(v) => println!("{}: {}", name, v),
                Err(_) => println!("{}: -", name),
            },
        }
    }
    if output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({ "record": stats.applied, "values": values })
        );
    }
}
