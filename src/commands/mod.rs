//! CLI command implementations
//!
//! - `flash` - resolve, acquire and flash
//! - `download` - acquisition only
//! - `list` - model table and serial port listing

pub mod download;
pub mod flash;
mod list;

pub use list::{list_models, list_ports};
