//! Command sequencing.
//!
//! Configuration access follows a fixed order: select a page, then either
//! read it back or write a replacement, and after a write finish the
//! configuration session. A reader left without the finish command stays in
//! configuration mode and stops scanning, so [`PcProx`] tracks the session
//! state explicitly and refuses anything else until `finish` is sent.
//!
//! ```text
//!  Idle --select_page--> PageSelected --read_page--> Idle
//!                              |
//!                          write_page
//!                              v
//!                        AwaitingFinish --finish--> Idle
//! ```

use tracing::{debug, trace, warn};

use crate::card::{CardScan, ParityBits, buffer_length};
use crate::config::{Configuration, Page, PageNumber, PersistMask};
use crate::device_info::DeviceInfo;
use crate::error::PcProxError;
use crate::frame::{CommandCode, Response, decode_response, encode_command};
use crate::transport::{Transport, TransportConfig, UsbHidTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    PageSelected(PageNumber),
    AwaitingFinish(PageNumber),
}

/// Get-only queries whose replies are not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawQuery {
    Page3,
    Page5,
    /// `0x8c 0x01 <selector>`
    Extended(u8),
}

impl RawQuery {
    fn command(&self) -> (CommandCode, Vec<u8>) {
        match self {
            RawQuery::Page3 => (CommandCode::ReadPage3, vec![]),
            RawQuery::Page5 => (CommandCode::ReadPage5, vec![]),
            RawQuery::Extended(selector) => (CommandCode::ExtendedQuery, vec![0x01, *selector]),
        }
    }
}

/// A connection to one pcProx reader.
///
/// Not meant to be shared: every operation takes `&mut self` and completes
/// its frame exchange before returning.
pub struct PcProx<T: Transport = UsbHidTransport> {
    transport: T,
    state: State,
}

impl PcProx<UsbHidTransport> {
    /// Open the reader over USB.
    pub fn open(config: TransportConfig) -> Result<Self, PcProxError> {
        Ok(Self::new(UsbHidTransport::open(config)?))
    }
}

impl<T: Transport> PcProx<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn transition(&mut self, next: State) {
        trace!(from = ?self.state, to = ?next, "sequencer state");
        self.state = next;
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), PcProxError> {
        match self.state {
            State::Idle => Ok(()),
            state => Err(PcProxError::Sequence { operation, state }),
        }
    }

    async fn send(&mut self, code: CommandCode, params: &[u8]) -> Result<(), PcProxError> {
        let frame = encode_command(code, params)?;
        self.transport.write(frame).await?;
        Ok(())
    }

    async fn request(&mut self, code: CommandCode, params: &[u8]) -> Result<Response, PcProxError> {
        self.send(code, params).await?;
        let reply = decode_response(self.transport.read().await?);
        debug!(command = %code, reply = %reply, "exchange complete");
        Ok(reply)
    }

    /// Put the reader into configuration access for `page`.
    pub async fn select_page(&mut self, page: PageNumber) -> Result<(), PcProxError> {
        self.require_idle("select_page")?;
        self.send(page.select_command(), &[]).await?;
        self.transition(State::PageSelected(page));
        Ok(())
    }

    /// Read back the selected page. Returns to `Idle` whatever the outcome.
    pub async fn read_page(&mut self) -> Result<Page, PcProxError> {
        let State::PageSelected(number) = self.state else {
            return Err(PcProxError::Sequence {
                operation: "read_page",
                state: self.state,
            });
        };
        self.transition(State::Idle);
        let bytes = self.transport.read().await?;
        debug!(page = %number, bytes = hex::encode(bytes), "page read");
        Page::decode(number, bytes)
    }

    /// Write a replacement for the selected page. `finish` must follow.
    pub async fn write_page(&mut self, page: &Page) -> Result<(), PcProxError> {
        let State::PageSelected(number) = self.state else {
            return Err(PcProxError::Sequence {
                operation: "write_page",
                state: self.state,
            });
        };
        if page.number() != number {
            return Err(PcProxError::Sequence {
                operation: "write_page",
                state: self.state,
            });
        }
        let bytes = page.encode()?;

        // From here on the reader may be in configuration mode.
        self.transition(State::AwaitingFinish(number));
        debug!(page = %number, bytes = hex::encode(bytes), "page write");
        self.transport.write(bytes).await?;
        Ok(())
    }

    /// Leave configuration mode, persisting the pages named in `persist`.
    pub async fn finish(&mut self, persist: PersistMask) -> Result<(), PcProxError> {
        if !matches!(self.state, State::AwaitingFinish(_)) {
            return Err(PcProxError::Sequence {
                operation: "finish",
                state: self.state,
            });
        }
        self.send(CommandCode::FinishConfig, &[persist.bits()]).await?;
        self.transition(State::Idle);
        Ok(())
    }

    /// Leave configuration mode without persisting anything.
    pub async fn end_configuration(&mut self) -> Result<(), PcProxError> {
        self.finish(PersistMask::none()).await
    }

    pub async fn device_info(&mut self) -> Result<DeviceInfo, PcProxError> {
        self.require_idle("device_info")?;
        let reply = self.request(CommandCode::DeviceInfo, &[]).await?;
        DeviceInfo::decode(&reply)
    }

    /// Read the card currently in the field, if any.
    ///
    /// `parity` must match the reader's active page 0.
    pub async fn read_card(&mut self, parity: impl Into<ParityBits>) -> Result<Option<CardScan>, PcProxError> {
        self.require_idle("read_card")?;
        // Buffer 1 is only filled once buffer 0 has been requested.
        let buffer0 = self.request(CommandCode::CardBuffer0, &[]).await?;
        if buffer0.is_empty() {
            return Ok(None);
        }
        let buffer1 = self.request(CommandCode::CardBuffer1, &[]).await?;
        if buffer_length(&buffer1)? == 0 {
            return Ok(None);
        }
        CardScan::decode(&buffer0, &buffer1, parity.into()).map(Some)
    }

    pub async fn query_raw(&mut self, query: RawQuery) -> Result<Response, PcProxError> {
        self.require_idle("query_raw")?;
        let (code, params) = query.command();
        self.request(code, &params).await
    }

    /// Read all three pages.
    pub async fn read_configuration(&mut self) -> Result<Configuration, PcProxError> {
        let mut config = Configuration::default();
        for number in PageNumber::ALL {
            self.select_page(number).await?;
            config.set_page(self.read_page().await?);
        }
        Ok(config)
    }

    /// Write `pages` of `config`, finishing after each one. With `persist`
    /// every written page is also stored to non-volatile memory.
    pub async fn write_configuration(
        &mut self,
        config: &Configuration,
        pages: &[PageNumber],
        persist: bool,
    ) -> Result<(), PcProxError> {
        for &number in pages {
            let page = config.page(number);
            // Reject invalid pages before touching the reader.
            page.encode()?;
            self.select_page(number).await?;
            self.write_page(&page).await?;
            let mask = if persist {
                PersistMask::for_page(number)
            } else {
                PersistMask::none()
            };
            self.finish(mask).await?;
        }
        Ok(())
    }
}

impl<T: Transport> Drop for PcProx<T> {
    fn drop(&mut self) {
        if let State::AwaitingFinish(page) = self.state {
            warn!(%page, "connection dropped before finish; reader is still in configuration mode");
        }
    }
}
