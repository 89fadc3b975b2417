//! List commands implementation

use robot_flasher_core::profile::ProfileTable;
use robot_flasher_locate::{DeviceLocator, PortEnumerator};

/// List all supported robot models
pub fn list_models(table: &ProfileTable) {
    println!("Supported robot models:");
    println!();
    println!(
        "{:<10} {:<10} {:<10} {:<22} URL",
        "Model", "Transport", "Version", "Firmware"
    );
    println!("{}", "-".repeat(80));

    for profile in table.iter() {
        println!(
            "{:<10} {:<10} {:<10} {:<22} {}",
            profile.model.name(),
            profile.default_transport.to_string(),
            profile.version,
            profile.firmware,
            profile.url
        );
    }
}

/// List attached serial ports, marking the configured adapter
pub fn list_ports(ports: &dyn PortEnumerator, locator: &DeviceLocator) {
    let entries = match ports.ports() {
        Ok(entries) => entries,
        Err(e) => {
            println!("Serial port enumeration failed: {}", e);
            return;
        }
    };

    if entries.is_empty() {
        println!("No serial ports found.");
        return;
    }

    println!("Serial ports:");
    println!();
    for entry in &entries {
        let marker = if entry.matches(locator.vendor_id(), locator.product_id()) {
            "*"
        } else {
            " "
        };
        println!(" {} {}", marker, entry);
    }
    println!();
    println!(
        "* = matches {:04x}:{:04x}",
        locator.vendor_id(),
        locator.product_id()
    );
}
