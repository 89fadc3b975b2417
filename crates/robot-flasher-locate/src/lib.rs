//! robot-flasher-locate - USB serial adapter discovery
//!
//! Finds the device path of an attached USB serial adapter by its
//! vendor/product ID pair, which stays stable while the OS-assigned path
//! (`/dev/ttyUSB0`, `/dev/ttyUSB1`, ...) can change between connections.
//!
//! A missing adapter is not an error here: the locator falls back to a
//! caller-supplied path, which the operator can still override.
//!
//! # Example
//!
//! ```no_run
//! use robot_flasher_locate::find_device_port;
//!
//! let port = find_device_port("0403", "6015", "/dev/ttyUSB0")?;
//! println!("Using {}", port);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod enumerator;

pub use enumerator::{PortEntry, PortEnumerator, SystemPorts, UsbInfo};

use robot_flasher_core::{DevicePort, UsageError};

/// Parse a 4-hex-digit USB vendor or product ID
pub fn parse_usb_id(s: &str) -> Result<u16, UsageError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(UsageError::InvalidUsbId(s.to_string()));
    }
    u16::from_str_radix(digits, 16).map_err(|_| UsageError::InvalidUsbId(s.to_string()))
}

/// Matches attached ports against a vendor/product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLocator {
    vid: u16,
    pid: u16,
}

impl DeviceLocator {
    /// Create a locator from hex ID strings
    pub fn new(vendor_id: &str, product_id: &str) -> Result<Self, UsageError> {
        Ok(Self {
            vid: parse_usb_id(vendor_id)?,
            pid: parse_usb_id(product_id)?,
        })
    }

    /// Vendor ID being matched
    pub fn vendor_id(&self) -> u16 {
        self.vid
    }

    /// Product ID being matched
    pub fn product_id(&self) -> u16 {
        self.pid
    }

    /// Path of the first matching port, or `fallback`
    ///
    /// Enumeration failures are logged and treated as "no match".
    pub fn find_port(&self, ports: &dyn PortEnumerator, fallback: &str) -> DevicePort {
        let entries = match ports.ports() {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Serial port enumeration failed: {}", e);
                return DevicePort::new(fallback);
            }
        };

        match entries.iter().find(|p| p.matches(self.vid, self.pid)) {
            Some(entry) => {
                log::debug!(
                    "Found {:04x}:{:04x} at {}",
                    self.vid,
                    self.pid,
                    entry.path
                );
                DevicePort::new(entry.path.as_str())
            }
            None => {
                log::debug!(
                    "No {:04x}:{:04x} adapter attached, defaulting to {}",
                    self.vid,
                    self.pid,
                    fallback
                );
                DevicePort::new(fallback)
            }
        }
    }
}

/// Find the port of an attached adapter using the system enumerator
pub fn find_device_port(
    vendor_id: &str,
    product_id: &str,
    fallback: &str,
) -> Result<DevicePort, UsageError> {
    Ok(DeviceLocator::new(vendor_id, product_id)?.find_port(&SystemPorts, fallback))
}
