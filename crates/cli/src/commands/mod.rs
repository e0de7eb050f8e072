//! Subcommand implementations. Each `cmd_*` reports its own failures and
//! exits with status 1.

pub(crate) mod check;
pub(crate) mod compile;
pub(crate) mod eval;
pub(crate) mod watch;

use std::path::Path;
use std::process;

use gizmo_core::persist::expression_from_json;
use gizmo_core::Expression;
use gizmo_eval::LiveValue;

use crate::{report_error, OutputFormat};

/// Read a JSON file, exiting with a reported error when it is missing or
/// malformed. `what` names the file in messages.
pub(crate) fn read_json(
    path: &Path,
    what: &str,
    output: OutputFormat,
    quiet: bool,
) -> serde_json::Value {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            let msg = format!("error: {} file not found: {}", what, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error: invalid JSON in {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn parse_expression(
    path: &Path,
    doc: &serde_json::Value,
    output: OutputFormat,
    quiet: bool,
) -> Expression {
    match expression_from_json(doc) {
        Ok(e) => e,
        Err(e) => {
            let msg = format!("error: {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn load_expression(path: &Path, output: OutputFormat, quiet: bool) -> Expression {
    let doc = read_json(path, "expression", output, quiet);
    parse_expression(path, &doc, output, quiet)
}

pub(crate) fn live_value_json(value: &LiveValue) -> serde_json::Value {
    match value {
        LiveValue::Number(v) => serde_json::json!(v),
        LiveValue::Bool(b) => serde_json::json!(b),
        LiveValue::Text(s) => serde_json::json!(s),
        LiveValue::Integer(i) => serde_json::json!(i),
    }
}
