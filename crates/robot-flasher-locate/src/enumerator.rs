//! Serial port enumeration

use core::fmt;

/// USB descriptor of an enumerated port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbInfo {
    /// USB vendor ID
    pub vid: u16,
    /// USB product ID
    pub pid: u16,
    /// Serial number string, if the adapter reports one
    pub serial_number: Option<String>,
    /// Product string, if the adapter reports one
    pub product: Option<String>,
}

/// An enumerated serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    /// Device path (e.g. `/dev/ttyUSB0`)
    pub path: String,
    /// USB descriptor, `None` for non-USB ports
    pub usb: Option<UsbInfo>,
}

impl PortEntry {
    /// Whether this port belongs to the given USB adapter
    pub fn matches(&self, vid: u16, pid: u16) -> bool {
        self.usb
            .as_ref()
            .is_some_and(|usb| usb.vid == vid && usb.pid == pid)
    }
}

impl fmt::Display for PortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.usb {
            Some(usb) => {
                write!(f, "{} (USB {:04x}:{:04x}", self.path, usb.vid, usb.pid)?;
                if let Some(product) = &usb.product {
                    write!(f, " {}", product)?;
                }
                if let Some(serial) = &usb.serial_number {
                    write!(f, " serial={}", serial)?;
                }
                write!(f, ")")
            }
            None => write!(f, "{}", self.path),
        }
    }
}

/// Source of attached serial ports
pub trait PortEnumerator {
    /// List currently attached ports
    ///
    /// Errors cover missing platform support and permission problems.
    fn ports(&self) -> Result<Vec<PortEntry>, String>;
}

/// Enumerates ports through the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn ports(&self) -> Result<Vec<PortEntry>, String> {
        let ports = serialport::available_ports().map_err(|e| e.to_string())?;
        Ok(ports
            .into_iter()
            .map(|p| {
                let usb = match p.port_type {
                    serialport::SerialPortType::UsbPort(info) => Some(UsbInfo {
                        vid: info.vid,
                        pid: info.pid,
                        serial_number: info.serial_number,
                        product: info.product,
                    }),
                    _ => None,
                };
                PortEntry {
                    path: p.port_name,
                    usb,
                }
            })
            .collect())
    }
}
