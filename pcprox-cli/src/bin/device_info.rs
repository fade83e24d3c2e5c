use anyhow::Result;
use clap::Parser;
use pcprox_cli::{ConnectionArgs, LoggingArgs, setup_logging};

/// Print firmware version and device type of an attached pcProx reader.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    logging: LoggingArgs,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli.logging)?;

    let mut reader = cli.connection.open()?;
    let info = reader.device_info().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Firmware Version:   {}", info.firmware_version());
    println!("Device Type:        {:#06x}", info.device_type);

    Ok(())
}
