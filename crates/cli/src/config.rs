//! Tool configuration read from `gizmo.toml`.
//!
//! Every table is optional. Flags given on the command line win over the
//! file.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! target = "micropython"
//! max_fraction_digits = 3
//!
//! [eval]
//! max_terms = 256
//!
//! [[device]]
//! name = "Weather Station"
//! conditions = ["Compare", "Raining"]
//! values = ["Temperature", "Humidity"]
//! ```

use std::path::Path;

use gizmo_codegen::CompileOptions;
use gizmo_eval::{DeviceLayout, EvalOptions};
use serde::Deserialize;

/// File looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "gizmo.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GizmoConfig {
    pub compile: CompileOptions,
    pub eval: EvalOptions,
    /// Telemetry record layouts, in any order.
    pub device: Vec<DeviceConfig>,
}

/// `[[device]]` entry: the fields a board reports, in report order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceConfig {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

impl DeviceConfig {
    pub fn layout(&self) -> DeviceLayout {
        DeviceLayout::new(&self.name, self.conditions.clone(), self.values.clone())
    }
}

/// Read and parse a config file. Returns a human-readable error string on
/// failure.
pub(crate) fn read_config(path: &Path) -> Result<GizmoConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// The explicit config, else `./gizmo.toml` when present, else defaults.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<GizmoConfig, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                read_config(fallback)
            } else {
                Ok(GizmoConfig::default())
            }
        }
    }
}
