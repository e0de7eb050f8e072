use std::collections::BTreeMap;
use std::path::Path;
use std::process;

use gizmo_core::ValueRef;
use gizmo_eval::{evaluate, EvalOptions, LiveValueCache};

use super::{live_value_json, load_expression, read_json};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_eval(
    file: &Path,
    values_path: Option<&Path>,
    options: &EvalOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let expression = load_expression(file, output, quiet);

    // Values file: {"Device": {"Property": 1.5}}
    let cache = LiveValueCache::new();
    if let Some(path) = values_path {
        let raw = read_json(path, "values", output, quiet);
        let devices: BTreeMap<String, BTreeMap<String, f64>> = match serde_json::from_value(raw) {
            Ok(d) => d,
            Err(e) => {
                let msg = format!(
                    "error: {}: expected device -> property -> number: {}",
                    path.display(),
                    e
                );
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        };
        for (device, properties) in devices {
            for (property, value) in properties {
                cache.set(ValueRef::new(device.clone(), property), value);
            }
        }
    }

    match evaluate(&expression, &cache, options) {
        Ok(value) => match output {
            OutputFormat::Json => {
                let result = serde_json::json!({ "value": live_value_json(&value) });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result)
                        .unwrap_or_else(|e| format!("serialization error: {}", e))
                );
            }
            OutputFormat::Text => println!("{}", value),
        },
        Err(e) => {
            let msg = format!("error: {}: {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
