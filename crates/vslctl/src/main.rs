//! vslctl - VSL-DSP control and analysis CLI
//!
//! Encodes parameter values into 64-byte DSP reports, sends them to a
//! connected interface, and decodes captured traffic back into structured
//! records.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod capture;
mod commands;
mod config;
mod error;
mod output;
mod transport;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::ValueArgs;
use crate::config::DeviceConfig;
use crate::error::CliError;
use crate::transport::HidapiPort;

#[derive(Parser)]
#[command(name = "vslctl")]
#[command(about = "VSL-DSP control CLI - encode, send and analyze DSP parameter reports")]
#[command(version)]
#[command(long_about = "
vslctl drives the DSP controls of PreSonus VSL interfaces over HID.
It encodes parameter values with the recovered calibration curves, frames
them as 64-byte reports, sends them to hardware, and decodes captured
traffic back into structured records.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Device/parameter configuration file (.yaml, .yml or .json)
    #[arg(long, global = true, env = "VSLCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Show the active configuration and validate it
    Status,

    /// List known DSP parameters
    Params,

    /// Encode a value and show the resulting report
    Encode {
        /// Parameter id (hex, e.g. 0x1A01) or name (e.g. GAIN_CH1)
        #[arg(long)]
        param: String,
        #[command(flatten)]
        value: ValueArgs,
        /// Number of packet bytes to dump
        #[arg(long, default_value = "8")]
        bytes: usize,
    },

    /// Decode one 64-byte payload given as hex
    Decode {
        /// Payload bytes, as `0xNN` tokens or contiguous hex
        #[arg(required = true, num_args = 1..)]
        hex: Vec<String>,
        /// Zero pad a short payload to a full report
        #[arg(long)]
        pad: bool,
    },

    /// Decode every DSP report in a capture file
    Analyze {
        /// Capture file (hid-capture JSON or JSON Lines)
        capture: PathBuf,
        /// Export decoded records as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List connected HID devices
    List {
        /// Show every HID device, not just audio interfaces
        #[arg(short, long)]
        all: bool,
    },

    /// Encode a value and send it to the configured device
    Send {
        /// Parameter id (hex, e.g. 0x1A01) or name (e.g. GAIN_CH1)
        #[arg(long)]
        param: String,
        #[command(flatten)]
        value: ValueArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vslctl={log_level},hid_vsl_protocol={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    if let Commands::List { all } = &cli.command {
        let port = HidapiPort::new().map_err(CliError::from)?;
        return commands::device::execute_list(&port, *all, cli.json);
    }

    let config = DeviceConfig::resolve(cli.config.as_deref())?;

    if cli.command == Commands::Status {
        let problems: Vec<String> = config.validate().iter().map(ToString::to_string).collect();
        output::print_status(&config, &problems, cli.json);
        if problems.is_empty() {
            return Ok(());
        }
        return Err(CliError::InvalidConfiguration(format!(
            "{} problem(s) found",
            problems.len()
        ))
        .into());
    }

    let registry = config.registry()?;
    match &cli.command {
        Commands::Params => {
            output::print_params(&registry, cli.json);
            Ok(())
        }
        Commands::Encode {
            param,
            value,
            bytes,
        } => commands::codec::execute_encode(&config, &registry, param, value, *bytes, cli.json),
        Commands::Decode { hex, pad } => {
            commands::codec::execute_decode(&registry, hex, *pad, cli.json)
        }
        Commands::Analyze { capture, output } => {
            commands::analyze::execute(&config, &registry, capture, output.as_deref(), cli.json)
        }
        Commands::Send { param, value } => {
            let port = HidapiPort::new().map_err(CliError::from)?;
            commands::device::execute_send(&port, &config, &registry, param, value, cli.json)
        }
        Commands::Status | Commands::List { .. } => Ok(()),
    }
}
