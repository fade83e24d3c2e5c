use anyhow::{Context, Result};
use nusb::list_devices;
use pcprox_lib::constants::VID;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// List attached RF IDeas readers, along with the id to pass to the tools.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Looking for RF IDeas devices (vendor {:#06x})...", VID);

    let mut count = 0;
    for device_info in list_devices().context("Failed to list USB devices")? {
        if device_info.vendor_id() != VID {
            continue;
        }
        count += 1;
        info!(
            "Reader #{}: {:04x}:{:04x}, Bus: {:03}, Address: {:03}",
            count,
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.bus_number(),
            device_info.device_address()
        );
        info!(
            "  Product: {}",
            device_info.product_string().unwrap_or("<Not available>")
        );
        info!(
            "  Serial: {}",
            device_info.serial_number().unwrap_or("<Not available>")
        );
        for interface in device_info.interfaces() {
            info!(
                "  Interface {}: class {:#04x}",
                interface.interface_number(),
                interface.class()
            );
        }
    }

    if count == 0 {
        info!("No pcProx readers found.");
    }
    Ok(())
}
