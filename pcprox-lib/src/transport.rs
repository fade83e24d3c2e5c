//! Frame transport.
//!
//! The sequencer only needs to push one 8-byte frame and pull one back.
//! [`UsbHidTransport`] does that with HID feature-report control transfers.

use std::time::Duration;

use async_trait::async_trait;
use nusb::Interface;
use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::constants::{FRAME_SIZE, HID_GET_REPORT, HID_REPORT_TYPE_FEATURE, HID_SET_REPORT, PID, VID};
use crate::error::TransportError;
use crate::frame::Frame;

/// Half-duplex frame exchange with a reader.
#[async_trait]
pub trait Transport: Send {
    async fn write(&mut self, frame: Frame) -> Result<(), TransportError>;
    async fn read(&mut self) -> Result<Frame, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn write(&mut self, frame: Frame) -> Result<(), TransportError> {
        (**self).write(frame).await
    }

    async fn read(&mut self) -> Result<Frame, TransportError> {
        (**self).read().await
    }
}

/// How to find and talk to the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// HID interface carrying the feature reports
    pub interface: u8,
    /// Report ID placed in wValue of SET_REPORT
    pub set_report_id: u8,
    /// Report ID placed in wValue of GET_REPORT
    pub get_report_id: u8,
    /// Per-transfer timeout
    pub timeout: Duration,
    /// Pause after every write before the next request
    pub command_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            vendor_id: VID,
            product_id: PID,
            interface: 0,
            set_report_id: 0,
            get_report_id: 1,
            timeout: Duration::from_secs(1),
            command_delay: Duration::from_millis(1),
        }
    }
}

impl TransportConfig {
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn with_interface(mut self, interface: u8) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_report_ids(mut self, set_report_id: u8, get_report_id: u8) -> Self {
        self.set_report_id = set_report_id;
        self.get_report_id = get_report_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }
}

fn feature_report_value(report_id: u8) -> u16 {
    (HID_REPORT_TYPE_FEATURE << 8) | report_id as u16
}

/// Feature reports over the default control pipe.
pub struct UsbHidTransport {
    interface: Interface,
    config: TransportConfig,
}

impl UsbHidTransport {
    /// Open the first attached reader matching `config` and claim its interface.
    pub fn open(config: TransportConfig) -> Result<Self, TransportError> {
        info!(
            "Searching for pcProx {:04x}:{:04x}...",
            config.vendor_id, config.product_id
        );
        let device_info = nusb::list_devices()?
            .find(|d| d.vendor_id() == config.vendor_id && d.product_id() == config.product_id)
            .ok_or(TransportError::DeviceNotFound)?;

        info!(
            "Found device on bus {} addr {}",
            device_info.bus_number(),
            device_info.device_address()
        );

        let device = device_info.open()?;
        let interface = device.detach_and_claim_interface(config.interface)?;
        info!("Interface {} claimed successfully.", config.interface);

        Ok(Self { interface, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for UsbHidTransport {
    async fn write(&mut self, frame: Frame) -> Result<(), TransportError> {
        debug!(bytes = hex::encode(frame), "USB Write");
        let transfer = self.interface.control_out(ControlOut {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_SET_REPORT,
            value: feature_report_value(self.config.set_report_id),
            index: self.config.interface as u16,
            data: &frame,
        });
        let completion = timeout(self.config.timeout, transfer).await?;
        completion.into_result()?;

        if !self.config.command_delay.is_zero() {
            tokio::time::sleep(self.config.command_delay).await;
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Frame, TransportError> {
        let transfer = self.interface.control_in(ControlIn {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_GET_REPORT,
            value: feature_report_value(self.config.get_report_id),
            index: self.config.interface as u16,
            length: FRAME_SIZE as u16,
        });
        let completion = timeout(self.config.timeout, transfer).await?;
        let data = completion.into_result()?;
        debug!(bytes = hex::encode(&data), "USB Read");

        // Short reports are zero-filled
        let mut frame = [0u8; FRAME_SIZE];
        let len = data.len().min(FRAME_SIZE);
        frame[..len].copy_from_slice(&data[..len]);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_report_value() {
        assert_eq!(feature_report_value(0), 0x0300);
        assert_eq!(feature_report_value(1), 0x0301);
    }

    #[test]
    fn test_config_builder() {
        let config = TransportConfig::default()
            .with_ids(0x0c27, 0x3b7b)
            .with_interface(1)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.product_id, 0x3b7b);
        assert_eq!(config.interface, 1);
        assert_eq!(config.get_report_id, 1);
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
