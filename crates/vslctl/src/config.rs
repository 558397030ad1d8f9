//! Device and parameter configuration
//!
//! A configuration file names the USB identity of the interface and the
//! calibration table for its parameters. YAML and JSON are both accepted,
//! chosen by file extension. Without a file the built-in table is used.

use std::path::Path;

use hid_vsl_protocol::{
    DEFAULT_REPORT_ID, ParameterSpec, PRODUCT_ID, Registry, VENDOR_ID, VslError, builtin_specs,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    #[serde(default = "default_report_id")]
    pub report_id: u8,
    #[serde(default = "builtin_specs")]
    pub parameters: Vec<ParameterSpec>,
}

fn default_vendor_id() -> u16 {
    VENDOR_ID
}

fn default_product_id() -> u16 {
    PRODUCT_ID
}

fn default_report_id() -> u8 {
    DEFAULT_REPORT_ID
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            report_id: DEFAULT_REPORT_ID,
            parameters: builtin_specs(),
        }
    }
}

impl DeviceConfig {
    /// Loads `path`, or the built-in configuration when `path` is `None`.
    pub fn resolve(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No configuration file given, using built-in parameter table");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::InvalidConfiguration(format!(
                "cannot read configuration file '{}': {e}",
                path.display()
            ))
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => {
                return Err(CliError::InvalidConfiguration(format!(
                    "unsupported configuration format '{}', expected .yaml, .yml or .json",
                    path.display()
                )));
            }
        };

        info!(
            "Loaded configuration from {} ({} parameters)",
            path.display(),
            config.parameters.len()
        );
        Ok(config)
    }

    /// Every problem in the parameter table, not just the first.
    pub fn validate(&self) -> Vec<VslError> {
        let mut problems = Vec::new();
        let mut seen = Vec::with_capacity(self.parameters.len());

        for spec in &self.parameters {
            if let Err(e) = spec.validate() {
                problems.push(e);
            }
            if seen.contains(&spec.id) {
                problems.push(VslError::InvalidParameter {
                    param_id: spec.id,
                    reason: format!("duplicate parameter id ({})", spec.name),
                });
            } else {
                seen.push(spec.id);
            }
        }
        problems
    }

    /// Builds the registry, failing with every validation problem listed.
    pub fn registry(&self) -> Result<Registry, CliError> {
        let problems = self.validate();
        if !problems.is_empty() {
            let joined = problems
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CliError::InvalidConfiguration(joined));
        }
        Ok(Registry::new(self.parameters.iter().cloned())?)
    }
}
