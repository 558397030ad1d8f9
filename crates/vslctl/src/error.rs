//! Error types for vslctl

use hid_vsl_protocol::VslError;
use thiserror::Error;
use vsl_hid_common::HidCommonError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] VslError),

    #[error("HID error: {0}")]
    Hid(HidCommonError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl From<HidCommonError> for CliError {
    fn from(e: HidCommonError) -> Self {
        match e {
            HidCommonError::DeviceNotFound(what) => CliError::DeviceNotFound(what),
            other => CliError::Hid(other),
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DeviceNotFound(_) => 2,
            CliError::InvalidConfiguration(_)
            | CliError::InvalidInput(_)
            | CliError::JsonError(_)
            | CliError::YamlError(_) => 3,
            CliError::Protocol(e) => match e {
                VslError::OutOfRange { .. }
                | VslError::ExceedsCeiling { .. }
                | VslError::InvalidRange { .. }
                | VslError::InvalidParameter { .. }
                | VslError::UnknownParameter(_)
                | VslError::MalformedPacket { .. } => 3,
                VslError::InternalInconsistency(_) | VslError::Transport(_) => 1,
            },
            CliError::Hid(_) | CliError::IoError(_) => 1,
        }
    }

    /// Short machine-readable error category.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::DeviceNotFound(_) => "device_not_found",
            CliError::InvalidConfiguration(_) => "invalid_configuration",
            CliError::InvalidInput(_) => "invalid_input",
            CliError::Protocol(_) => "protocol",
            CliError::Hid(_) => "hid",
            CliError::IoError(_) => "io",
            CliError::JsonError(_) => "json",
            CliError::YamlError(_) => "yaml",
        }
    }
}
