//! robot-flasher-core - Core library for robot firmware flashing
//!
//! This crate holds everything the flashing tool decides before it touches
//! the network or a device:
//!
//! - [`model`] - robot models and transport selection
//! - [`profile`] - the static per-model firmware table
//! - [`firmware`] - the Firmware Resolver
//! - [`config`] - the optional TOML config file
//! - [`error`] - the error taxonomy shared by all crates
//! - [`traits`] - the `Fetcher` and `FlashRunner` seams the CLI drives
//!
//! # Example
//!
//! ```
//! use robot_flasher_core::firmware::FirmwareResolver;
//! use robot_flasher_core::model::{RobotModel, TransportChoice};
//! use robot_flasher_core::profile::ProfileTable;
//!
//! let table = ProfileTable::builtin();
//! let resolver = FirmwareResolver::new("/usr/share/robot-flasher/firmware", &table);
//!
//! let path = resolver.resolve(RobotModel::RobotXl, None);
//! assert!(path.ends_with("robot_xl/v1.4.0.bin"));
//! assert_eq!(table.transport(RobotModel::RobotXl, false), TransportChoice::Usb);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod firmware;
pub mod model;
pub mod profile;
pub mod traits;

pub use error::{DownloadError, Error, FlashError, Result, UsageError};
pub use model::{DevicePort, RobotModel, TransportChoice};
