use std::path::Path;
use std::process;

use gizmo_codegen::{CompileOptions, Compiler};
use gizmo_core::persist::constraint_from_json;
use gizmo_core::{Binding, RefreshInterval};

use super::{parse_expression, read_json};
use crate::{report_error, OutputFormat};

/// Compiles a bare expression, or a binding (`{"expression": ..,
/// "refresh": ..}`) whose refresh period is reported alongside the code.
pub(crate) fn cmd_compile(
    file: &Path,
    constraint_path: Option<&Path>,
    options: CompileOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let doc = read_json(file, "expression", output, quiet);
    let binding = if doc.get("expression").is_some() {
        match serde_json::from_value::<Binding>(doc) {
            Ok(b) => b,
            Err(e) => {
                let msg = format!("error: {}: invalid binding: {}", file.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    } else {
        Binding::new(parse_expression(file, &doc, output, quiet))
    };

    let compiler = Compiler::new(options);
    let code = match constraint_path {
        Some(path) => {
            let raw = read_json(path, "constraint", output, quiet);
            let destination = match constraint_from_json(&raw) {
                Ok(c) => c,
                Err(e) => {
                    let msg = format!("error: {}: {}", path.display(), e);
                    report_error(&msg, output, quiet);
                    process::exit(1);
                }
            };
            compiler.compile_for_parameter(&binding.expression, &destination)
        }
        None => compiler.compile(&binding.expression),
    };
    let code = match code {
        Ok(c) => c,
        Err(e) => {
            let msg = format!("error: {}: {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let refresh_ms = match compiler.refresh_interval_ms(&binding.refresh) {
        Ok(ms) => ms,
        Err(e) => {
            let msg = format!("error: {}: {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "target": compiler.target().name(),
                "code": code,
                "refresh": binding.refresh.label(),
                "refresh_ms": refresh_ms,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => {
            println!("{}", code);
            if !quiet {
                match (binding.refresh, refresh_ms) {
                    (RefreshInterval::UserDefined(_), Some(ms)) => {
                        eprintln!("refresh every {} ms", ms)
                    }
                    (RefreshInterval::Realtime, _) => eprintln!("refresh every loop"),
                    _ => {}
                }
            }
        }
    }
}
