//! Seams between the orchestrator and the I/O-performing crates
//!
//! The CLI is written against these traits so that the download-then-flash
//! ordering can be exercised without a network or a board attached.

use std::path::Path;

use crate::error::{DownloadError, FlashError};
use crate::model::{DevicePort, TransportChoice};

/// Acquires a firmware image from a remote store
pub trait Fetcher {
    /// Download `url` to `destination`, replacing any existing file
    ///
    /// Returns the number of bytes written. On error `destination` is
    /// left as it was.
    fn download(&mut self, url: &str, destination: &Path) -> Result<u64, DownloadError>;
}

/// Runs a transport flasher to completion
pub trait FlashRunner {
    /// Flash `firmware` over `transport`
    ///
    /// `port` is only passed on to the USB flasher; the UART flasher
    /// locates its own port.
    fn flash(
        &mut self,
        transport: TransportChoice,
        firmware: &Path,
        port: &DevicePort,
    ) -> Result<(), FlashError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &mut T {
    fn download(&mut self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        (**self).download(url, destination)
    }
}

impl<T: FlashRunner + ?Sized> FlashRunner for &mut T {
    fn flash(
        &mut self,
        transport: TransportChoice,
        firmware: &Path,
        port: &DevicePort,
    ) -> Result<(), FlashError> {
        (**self).flash(transport, firmware, port)
    }
}
