//! robot-flasher-session - Flasher process supervision
//!
//! This crate runs the external transport flasher for one flashing run and
//! owns its lifecycle:
//!
//! ```text
//! Idle -> Resolving -> Flashing -> { Succeeded | Failed | Interrupted }
//! ```
//!
//! - [`flasher`] - UART and USB flasher command lines
//! - [`FlashSession`] - the spawned flasher process; killed and reaped on drop
//! - [`CancelHandle`] - what the interrupt handler closes over
//! - [`FlashSupervisor`] - ties the above together and implements
//!   [`FlashRunner`](robot_flasher_core::traits::FlashRunner)
//!
//! # Example
//!
//! ```no_run
//! use robot_flasher_core::config::FlasherConfig;
//! use robot_flasher_core::traits::FlashRunner;
//! use robot_flasher_core::{DevicePort, TransportChoice};
//! use robot_flasher_session::{CtrlcHook, FlashSupervisor};
//! use std::path::Path;
//!
//! let mut supervisor = FlashSupervisor::new(&FlasherConfig::default(), CtrlcHook::new());
//! supervisor.flash(
//!     TransportChoice::Usb,
//!     Path::new("/usr/share/robot-flasher/firmware/robot_xl/v1.4.0.bin"),
//!     &DevicePort::new("/dev/ttyUSB0"),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod flasher;
mod interrupt;
mod session;
mod supervisor;

pub use flasher::{Flasher, UartFlasher, UsbFlasher};
pub use interrupt::{CtrlcHook, InterruptHook, NoInterrupt, INTERRUPT_EXIT_CODE};
pub use session::{CancelHandle, FlashSession};
pub use supervisor::{FlashState, FlashSupervisor};
