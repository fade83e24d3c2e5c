use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pcprox_cli::{ConnectionArgs, LoggingArgs, setup_logging};
use pcprox_lib::{CardScan, Configuration, PageNumber, PcProx};
use tracing::{debug, info, warn};

/// Wait for a card and print what the reader saw.
///
/// While polling the host drives the LEDs (red while waiting, green on a
/// read) and keyboard output is suspended. The previous settings are put
/// back before exiting.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of polls before giving up
    #[arg(short = 'n', long, default_value_t = 10)]
    attempts: u32,
    /// Delay between polls in milliseconds
    #[arg(long, default_value_t = 900)]
    interval_ms: u64,
    /// Print the scan as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    logging: LoggingArgs,
}

async fn set_leds(reader: &mut PcProx, config: &mut Configuration, red: bool, green: bool) -> Result<()> {
    config.page2.red_led = red;
    config.page2.green_led = green;
    reader
        .write_configuration(config, &[PageNumber::Page2], false)
        .await?;
    Ok(())
}

async fn poll(reader: &mut PcProx, config: &mut Configuration, cli: &Cli) -> Result<Option<CardScan>> {
    let interval = Duration::from_millis(cli.interval_ms);
    for attempt in 1..=cli.attempts {
        info!("Waiting for a card ({attempt}/{})...", cli.attempts);
        set_leds(reader, config, true, false).await?;

        if let Some(scan) = reader.read_card(&config.page0).await? {
            set_leds(reader, config, false, true).await?;
            return Ok(Some(scan));
        }

        tokio::time::sleep(interval / 3).await;
        set_leds(reader, config, false, false).await?;
        tokio::time::sleep(interval * 2 / 3).await;
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli.logging)?;

    let mut reader = cli.connection.open()?;
    info!("{}", reader.device_info().await?);

    let original = reader.read_configuration().await?;
    debug!(?original, "active configuration");

    let mut config = original;
    config.page0.halt_kb_snd = true;
    config.page2.app_ctrls_led = true;
    reader
        .write_configuration(&config, &[PageNumber::Page0, PageNumber::Page2], false)
        .await?;

    let outcome = poll(&mut reader, &mut config, &cli).await;

    // Hand the LEDs and keyboard output back to the reader even if polling failed
    if let Err(e) = reader
        .write_configuration(&original, &[PageNumber::Page0, PageNumber::Page2], false)
        .await
    {
        warn!("Failed to restore reader configuration: {e}");
    }

    match outcome? {
        Some(scan) if cli.json => println!("{}", serde_json::to_string_pretty(&scan)?),
        Some(scan) => {
            println!("{scan}");
            let bits: String = scan.raw_bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
            println!("Bits ({}): {bits}", scan.raw_bits.len());
        }
        None => println!("No card read"),
    }

    Ok(())
}
