//! Pieces shared by the pcProx command-line tools.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use pcprox_lib::constants::{PID, VID};
use pcprox_lib::{PcProx, TransportConfig};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id {s:?}: {e}"))
}

/// Which reader to open and how to talk to it.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// USB vendor ID (hex)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0c27")]
    pub vid: u16,
    /// USB product ID (hex)
    #[arg(long, value_parser = parse_hex_u16, default_value = "3bfa")]
    pub pid: u16,
    /// HID interface number
    #[arg(long, default_value_t = 0)]
    pub interface: u8,
    /// Per-transfer timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,
}

impl ConnectionArgs {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::default()
            .with_ids(self.vid, self.pid)
            .with_interface(self.interface)
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }

    pub fn open(&self) -> Result<PcProx> {
        let config = self.transport_config();
        if (config.vendor_id, config.product_id) != (VID, PID) {
            info!("Using non-default ids {:04x}:{:04x}", config.vendor_id, config.product_id);
        }
        PcProx::open(config).context("Failed to open pcProx reader")
    }
}

/// Logging flags every tool accepts.
#[derive(Args, Debug)]
pub struct LoggingArgs {
    /// Also write logs to this file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Console logging plus an optional file layer. Keep the guard alive for
/// the file writer to flush.
pub fn setup_logging(args: &LoggingArgs) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = args.log_file {
        let log_file =
            File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, -v for DEBUG, -vv for TRACE. RUST_LOG still wins.
    let filter = EnvFilter::builder()
        .with_default_directive(args.verbose.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(ref path) = args.log_file {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_ids() {
        assert_eq!(parse_hex_u16("0c27"), Ok(0x0c27));
        assert_eq!(parse_hex_u16("0x3BFA"), Ok(0x3bfa));
        assert!(parse_hex_u16("zz").is_err());
    }
}
