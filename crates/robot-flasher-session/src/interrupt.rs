//! Interrupt hooks
//!
//! A hook is armed with the [`CancelHandle`] of the session that is about
//! to start and disarmed once that session is over.

use std::sync::{Arc, Mutex};

use robot_flasher_core::FlashError;

use crate::session::CancelHandle;

/// Exit status used when the operator interrupts outside a session
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Delivers operator interrupts to the active session
pub trait InterruptHook {
    /// Route interrupts to `cancel` until [`InterruptHook::disarm`]
    fn arm(&mut self, cancel: CancelHandle) -> Result<(), FlashError>;

    /// Stop routing interrupts to the last armed session
    fn disarm(&mut self);
}

/// Hook that never delivers interrupts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupt;

impl InterruptHook for NoInterrupt {
    fn arm(&mut self, _cancel: CancelHandle) -> Result<(), FlashError> {
        Ok(())
    }

    fn disarm(&mut self) {}
}

/// Ctrl-C / SIGINT / SIGTERM hook backed by `ctrlc`
///
/// The process-wide handler is registered on the first `arm`. Until then
/// the default signal behaviour applies. An interrupt that arrives while
/// no session is armed exits with [`INTERRUPT_EXIT_CODE`].
#[derive(Debug, Default)]
pub struct CtrlcHook {
    active: Arc<Mutex<Option<CancelHandle>>>,
    registered: bool,
}

impl CtrlcHook {
    /// Create an unregistered hook
    pub fn new() -> Self {
        Self::default()
    }

    fn set_active(&self, cancel: Option<CancelHandle>) {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *active = cancel;
    }
}

impl InterruptHook for CtrlcHook {
    fn arm(&mut self, cancel: CancelHandle) -> Result<(), FlashError> {
        self.set_active(Some(cancel));

        if !self.registered {
            let active = Arc::clone(&self.active);
            ctrlc::set_handler(move || {
                let cancel = active
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone();
                match cancel {
                    Some(cancel) => {
                        cancel.interrupt();
                    }
                    None => std::process::exit(INTERRUPT_EXIT_CODE),
                }
            })
            .map_err(|e| FlashError::InterruptHook(e.to_string()))?;
            self.registered = true;
            log::debug!("Interrupt handler installed");
        }
        Ok(())
    }

    fn disarm(&mut self) {
        self.set_active(None);
    }
}
