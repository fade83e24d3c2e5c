use anyhow::{Context, Result, bail};
use clap::Parser;
use pcprox_cli::{ConnectionArgs, LoggingArgs, setup_logging};
use pcprox_lib::config::text;
use pcprox_lib::{Configuration, PageNumber};
use tracing::info;

/// Show or change the configuration of a pcProx reader.
///
/// Options use the vendor names, e.g. `-t bHaltKBSnd -i iLeadParityBitCnt=1`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set a flag option to 1
    #[arg(short = 't', long = "set-true", value_name = "bOPTION")]
    set_true: Vec<String>,
    /// Set a flag option to 0
    #[arg(short = 'f', long = "set-false", value_name = "bOPTION")]
    set_false: Vec<String>,
    /// Set an integer option, e.g. iLeadParityBitCnt=1
    #[arg(short = 'i', long = "set-int", value_name = "iOPTION=VALUE", value_parser = parse_assignment)]
    set_int: Vec<(String, u32)>,
    /// Persist the changed pages to EEPROM
    #[arg(short, long)]
    write_eeprom: bool,
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    logging: LoggingArgs,
}

fn parse_assignment(s: &str) -> Result<(String, u32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    let value = value.trim();
    let value = match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    }
    .map_err(|e| format!("invalid value in {s:?}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn apply(cli: &Cli, config: &mut Configuration) -> Result<()> {
    let assignments = cli
        .set_true
        .iter()
        .map(|name| (name.as_str(), 1))
        .chain(cli.set_false.iter().map(|name| (name.as_str(), 0)))
        .chain(cli.set_int.iter().map(|(name, value)| (name.as_str(), *value)));

    for (name, value) in assignments {
        text::set(config, name, value).with_context(|| format!("Cannot set {name} = {value}"))?;
    }
    Ok(())
}

fn changed_pages(before: &Configuration, after: &Configuration) -> Result<Vec<PageNumber>> {
    let mut pages = Vec::new();
    for number in PageNumber::ALL {
        if before.page(number).encode()? != after.page(number).encode()? {
            pages.push(number);
        }
    }
    Ok(pages)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli.logging)?;

    let mut reader = cli.connection.open()?;
    println!("{}", reader.device_info().await?);

    let current = reader.read_configuration().await?;
    let mut updated = current;
    apply(&cli, &mut updated)?;

    if updated == current {
        if !(cli.set_true.is_empty() && cli.set_false.is_empty() && cli.set_int.is_empty()) {
            info!("Requested values already active, nothing to write");
        }
        println!("/ Current configuration:");
        print!("{}", text::dump(&current));
        return Ok(());
    }

    println!("/ New configuration:");
    print!("{}", text::dump(&updated));

    let pages = changed_pages(&current, &updated)?;
    if pages.is_empty() {
        bail!("Configuration changed but no page differs when encoded");
    }
    if cli.write_eeprom {
        println!("/ Writing to EEPROM...");
    }
    reader
        .write_configuration(&updated, &pages, cli.write_eeprom)
        .await?;

    println!("/ Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("iLeadParityBitCnt=1"),
            Ok(("iLeadParityBitCnt".to_string(), 1))
        );
        assert_eq!(parse_assignment("iFACIDDelim = 0x2d"), Ok(("iFACIDDelim".to_string(), 0x2d)));
        assert!(parse_assignment("iIDBitCnt").is_err());
        assert!(parse_assignment("iIDBitCnt=x").is_err());
    }

    #[test]
    fn test_only_touched_pages_written() {
        let current = Configuration::default();
        let mut updated = current;
        text::set(&mut updated, "bHaltKBSnd", 1).unwrap();
        assert_eq!(changed_pages(&current, &updated).unwrap(), vec![PageNumber::Page0]);
    }
}
