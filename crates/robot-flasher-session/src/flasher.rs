//! Transport flasher command lines
//!
//! The UART and USB flashers are external programs. Their command lines
//! come from [`FlasherCommand`] templates where `{firmware}` is replaced by
//! the image path and, for USB only, `{port}` by the device port.

use std::path::Path;
use std::process::Command;

use robot_flasher_core::config::{FlasherCommand, FlasherConfig};
use robot_flasher_core::{DevicePort, TransportChoice};

const FIRMWARE_PLACEHOLDER: &str = "{firmware}";
const PORT_PLACEHOLDER: &str = "{port}";

/// A transport-specific flasher
pub trait Flasher {
    /// Transport this flasher drives
    fn transport(&self) -> TransportChoice;

    /// Program name, for messages
    fn program(&self) -> &str;

    /// Rendered argument list
    fn args(&self, firmware: &Path, port: &DevicePort) -> Vec<String>;

    /// Build the process to spawn
    fn command(&self, firmware: &Path, port: &DevicePort) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args(firmware, port));
        cmd
    }
}

fn render(template: &[String], firmware: &Path, port: Option<&DevicePort>) -> Vec<String> {
    let firmware = firmware.to_string_lossy();
    template
        .iter()
        .map(|arg| {
            let arg = arg.replace(FIRMWARE_PLACEHOLDER, &firmware);
            match port {
                Some(port) => arg.replace(PORT_PLACEHOLDER, port.as_str()),
                None => arg,
            }
        })
        .collect()
}

/// UART flasher; receives the firmware path only
#[derive(Debug, Clone)]
pub struct UartFlasher {
    command: FlasherCommand,
}

impl UartFlasher {
    /// Create a UART flasher from its command template
    pub fn new(command: FlasherCommand) -> Self {
        if command.args.iter().any(|a| a.contains(PORT_PLACEHOLDER)) {
            log::warn!("UART flasher template contains {{port}}, which is not substituted");
        }
        Self { command }
    }
}

impl Flasher for UartFlasher {
    fn transport(&self) -> TransportChoice {
        TransportChoice::Uart
    }

    fn program(&self) -> &str {
        &self.command.program
    }

    fn args(&self, firmware: &Path, _port: &DevicePort) -> Vec<String> {
        render(&self.command.args, firmware, None)
    }
}

/// USB flasher; receives the firmware path and the port
#[derive(Debug, Clone)]
pub struct UsbFlasher {
    command: FlasherCommand,
}

impl UsbFlasher {
    /// Create a USB flasher from its command template
    pub fn new(command: FlasherCommand) -> Self {
        Self { command }
    }
}

impl Flasher for UsbFlasher {
    fn transport(&self) -> TransportChoice {
        TransportChoice::Usb
    }

    fn program(&self) -> &str {
        &self.command.program
    }

    fn args(&self, firmware: &Path, port: &DevicePort) -> Vec<String> {
        render(&self.command.args, firmware, Some(port))
    }
}

/// Build both flashers from the config
pub fn flashers(config: &FlasherConfig) -> (UartFlasher, UsbFlasher) {
    (
        UartFlasher::new(config.uart.clone()),
        UsbFlasher::new(config.usb.clone()),
    )
}
