//! Command implementations for vslctl

pub mod analyze;
pub mod codec;
pub mod device;

use clap::Args;
use hid_vsl_protocol::{ParameterSpec, Registry};

use crate::capture::parse_hex_u16;
use crate::error::CliError;

/// The value to encode: a normalized position or a frequency in Hz.
#[derive(Args, Debug, Clone, PartialEq)]
#[group(required = true, multiple = false)]
pub struct ValueArgs {
    /// Normalized control position (0.0 to 1.0, clamped)
    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Frequency in Hz (frequency parameters only)
    #[arg(long)]
    pub hz: Option<f64>,
}

/// Looks a parameter up by hex id (`0x1A01`) or by name (`GAIN_CH1`).
pub fn resolve_param<'r>(registry: &'r Registry, param: &str) -> Result<&'r ParameterSpec, CliError> {
    if let Some(spec) = registry.find_by_name(param) {
        return Ok(spec);
    }
    let id = parse_hex_u16(param).map_err(CliError::InvalidInput)?;
    Ok(registry.require(id)?)
}
