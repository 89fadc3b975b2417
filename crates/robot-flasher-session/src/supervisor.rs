//! Flash Supervisor
//!
//! Picks the flasher for the resolved transport, runs it inside a
//! [`FlashSession`] with the interrupt hook armed, and reports the outcome
//! as a [`FlashError`] value.

use core::fmt;
use std::path::Path;

use robot_flasher_core::config::FlasherConfig;
use robot_flasher_core::traits::FlashRunner;
use robot_flasher_core::{DevicePort, FlashError, TransportChoice};

use crate::flasher::{flashers, Flasher, UartFlasher, UsbFlasher};
use crate::interrupt::InterruptHook;
use crate::session::FlashSession;

/// Supervisor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashState {
    /// Nothing started
    Idle,
    /// Choosing the flasher and building its command line
    Resolving,
    /// Flasher process running
    Flashing,
    /// Flasher exited successfully
    Succeeded,
    /// Flasher could not start or reported failure
    Failed,
    /// Operator cancelled the flash
    Interrupted,
}

impl fmt::Display for FlashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlashState::Idle => "idle",
            FlashState::Resolving => "resolving",
            FlashState::Flashing => "flashing",
            FlashState::Succeeded => "succeeded",
            FlashState::Failed => "failed",
            FlashState::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Runs UART and USB flashers with interrupt handling
pub struct FlashSupervisor<H> {
    uart: UartFlasher,
    usb: UsbFlasher,
    hook: H,
    state: FlashState,
}

impl<H: InterruptHook> FlashSupervisor<H> {
    /// Create a supervisor from flasher commands and an interrupt hook
    pub fn new(config: &FlasherConfig, hook: H) -> Self {
        let (uart, usb) = flashers(config);
        Self {
            uart,
            usb,
            hook,
            state: FlashState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> FlashState {
        self.state
    }

    fn flasher(&self, transport: TransportChoice) -> &dyn Flasher {
        match transport {
            TransportChoice::Uart => &self.uart,
            TransportChoice::Usb => &self.usb,
        }
    }

    fn run(
        &mut self,
        transport: TransportChoice,
        firmware: &Path,
        port: &DevicePort,
    ) -> Result<(), FlashError> {
        let flasher = self.flasher(transport);
        debug_assert_eq!(flasher.transport(), transport);
        let command = flasher.command(firmware, port);
        log::debug!(
            "{} flasher command: {} {}",
            flasher.transport(),
            flasher.program(),
            flasher.args(firmware, port).join(" ")
        );

        let mut session = FlashSession::new(transport, firmware);
        let cancel = session.cancel_handle();
        self.hook.arm(cancel.clone())?;

        self.state = FlashState::Flashing;
        let result = session.spawn(command).and_then(|()| session.wait());
        if cancel.is_interrupted() {
            log::warn!(
                "{} flash of {} cancelled by operator",
                session.transport(),
                session.firmware().display()
            );
        }
        drop(session);
        self.hook.disarm();
        result
    }
}

impl<H: InterruptHook> FlashRunner for FlashSupervisor<H> {
    fn flash(
        &mut self,
        transport: TransportChoice,
        firmware: &Path,
        port: &DevicePort,
    ) -> Result<(), FlashError> {
        self.state = FlashState::Resolving;
        match transport {
            TransportChoice::Usb => log::info!(
                "Flashing {} over USB at {}",
                firmware.display(),
                port
            ),
            TransportChoice::Uart => log::info!("Flashing {} over UART", firmware.display()),
        }

        let result = self.run(transport, firmware, port);
        self.state = match &result {
            Ok(()) => FlashState::Succeeded,
            Err(FlashError::Interrupted) => FlashState::Interrupted,
            Err(_) => FlashState::Failed,
        };
        log::debug!("Flash supervisor {}", self.state);
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::interrupt::NoInterrupt;
    use crate::session::CancelHandle;
    use robot_flasher_core::config::FlasherCommand;
    use std::thread;
    use std::time::Duration;

    fn config(uart: &[&str], usb: &[&str]) -> FlasherConfig {
        let cmd = |argv: &[&str]| FlasherCommand {
            program: argv[0].to_string(),
            args: argv[1..].iter().map(|a| a.to_string()).collect(),
        };
        FlasherConfig {
            uart: cmd(uart),
            usb: cmd(usb),
        }
    }

    /// Interrupts the session twice shortly after it is armed
    #[derive(Default)]
    struct DelayedInterrupt {
        armed: usize,
        disarmed: usize,
    }

    impl InterruptHook for DelayedInterrupt {
        fn arm(&mut self, cancel: CancelHandle) -> Result<(), FlashError> {
            self.armed += 1;
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                cancel.interrupt();
                cancel.interrupt();
            });
            Ok(())
        }

        fn disarm(&mut self) {
            self.disarmed += 1;
        }
    }

    #[test]
    fn test_transport_selects_flasher() {
        let cfg = config(&["sh", "-c", "exit 0"], &["sh", "-c", "exit 7"]);
        let mut supervisor = FlashSupervisor::new(&cfg, NoInterrupt);
        let port = DevicePort::new("/dev/null");

        supervisor
            .flash(TransportChoice::Uart, Path::new("fw.bin"), &port)
            .unwrap();
        assert_eq!(supervisor.state(), FlashState::Succeeded);

        let err = supervisor
            .flash(TransportChoice::Usb, Path::new("fw.bin"), &port)
            .unwrap_err();
        assert!(matches!(err, FlashError::Exited { status: 7, .. }));
        assert_eq!(supervisor.state(), FlashState::Failed);
    }

    #[test]
    fn test_usb_flasher_receives_port() {
        let cfg = config(
            &["false"],
            &["sh", "-c", "test \"$0\" = /dev/ttyUSB7 && test \"$1\" = fw.bin", "{port}", "{firmware}"],
        );
        let mut supervisor = FlashSupervisor::new(&cfg, NoInterrupt);
        supervisor
            .flash(
                TransportChoice::Usb,
                Path::new("fw.bin"),
                &DevicePort::new("/dev/ttyUSB7"),
            )
            .unwrap();
    }

    #[test]
    fn test_missing_flasher_is_failure() {
        let cfg = config(&["robot-flasher-no-such-program"], &["true"]);
        let mut supervisor = FlashSupervisor::new(&cfg, NoInterrupt);
        let err = supervisor
            .flash(TransportChoice::Uart, Path::new("fw.bin"), &DevicePort::new("x"))
            .unwrap_err();
        assert!(matches!(err, FlashError::Spawn { .. }));
        assert_eq!(supervisor.state(), FlashState::Failed);
    }

    #[test]
    fn test_flashers_report_their_transport() {
        let supervisor = FlashSupervisor::new(&FlasherConfig::default(), NoInterrupt);
        assert_eq!(
            supervisor.flasher(TransportChoice::Uart).transport(),
            TransportChoice::Uart
        );
        assert_eq!(
            supervisor.flasher(TransportChoice::Usb).transport(),
            TransportChoice::Usb
        );
    }

    #[test]
    fn test_interrupt_during_flash() {
        let cfg = config(&["sleep", "30"], &["true"]);
        let mut supervisor = FlashSupervisor::new(&cfg, DelayedInterrupt::default());
        let err = supervisor
            .flash(TransportChoice::Uart, Path::new("fw.bin"), &DevicePort::new("x"))
            .unwrap_err();
        assert!(matches!(err, FlashError::Interrupted));
        assert_eq!(supervisor.state(), FlashState::Interrupted);
        assert_eq!(supervisor.hook.armed, 1);
        assert_eq!(supervisor.hook.disarmed, 1);
    }
}
