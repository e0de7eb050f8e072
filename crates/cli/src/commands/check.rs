use std::path::Path;
use std::process;

use super::load_expression;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let expression = load_expression(file, output, quiet);
    let kind = expression.expression_type().name();

    if let Err(e) = expression.check() {
        let msg = format!("error: {}: {}", file.display(), e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    let values: Vec<String> = expression
        .values_used()
        .iter()
        .map(|v| v.to_string())
        .collect();
    match output {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "valid": true,
                "type": kind,
                "values": values,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => {
            if !quiet {
                if values.is_empty() {
                    println!("{}: valid {}", file.display(), kind);
                } else {
                    println!(
                        "{}: valid {} using {}",
                        file.display(),
                        kind,
                        values.join(", ")
                    );
                }
            }
        }
    }
}
