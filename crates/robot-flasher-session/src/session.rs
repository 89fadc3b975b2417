//! FlashSession - the single in-flight flasher process
//!
//! The session owns the child process. The interrupt handler closes over a
//! [`CancelHandle`] cloned from it, which can kill the child; reaping is
//! always done by the session.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use robot_flasher_core::{FlashError, TransportChoice};

/// How often the supervisor checks whether the flasher has exited
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct Shared {
    child: Mutex<Option<Child>>,
    interrupted: AtomicBool,
}

impl Shared {
    fn child(&self) -> MutexGuard<'_, Option<Child>> {
        // Poisoning is ignored, the Option is valid either way
        self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cancels the flasher of one session
#[derive(Debug, Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Request cancellation and kill the flasher if it is running
    ///
    /// Only the first call acts; it prints the terminating notice and
    /// returns `true`. Later calls return `false` without touching the
    /// child.
    pub fn interrupt(&self) -> bool {
        if self.shared.interrupted.swap(true, Ordering::SeqCst) {
            log::debug!("Interrupt already in progress, ignoring");
            return false;
        }

        println!("Terminating the flashing process...");
        let mut guard = self.shared.child();
        if let Some(child) = guard.as_mut() {
            log::warn!("Killing flasher process {}", child.id());
            if let Err(e) = child.kill() {
                log::debug!("Failed to kill flasher: {}", e);
            }
        }
        true
    }

    /// Whether cancellation was requested
    pub fn is_interrupted(&self) -> bool {
        self.shared.interrupted.load(Ordering::SeqCst)
    }
}

/// An external flashing operation
///
/// Dropping the session kills and reaps a flasher that is still running.
#[derive(Debug)]
pub struct FlashSession {
    transport: TransportChoice,
    firmware: PathBuf,
    shared: Arc<Shared>,
}

impl FlashSession {
    /// Create a session; no process is started yet
    pub fn new(transport: TransportChoice, firmware: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            firmware: firmware.into(),
            shared: Arc::default(),
        }
    }

    /// Transport of this session
    pub fn transport(&self) -> TransportChoice {
        self.transport
    }

    /// Firmware image being flashed
    pub fn firmware(&self) -> &Path {
        &self.firmware
    }

    /// Handle the interrupt handler uses to cancel this session
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// OS process ID of the running flasher
    pub fn id(&self) -> Option<u32> {
        self.shared.child().as_ref().map(Child::id)
    }

    /// Start the flasher process
    ///
    /// Fails with [`FlashError::Interrupted`] if cancellation was requested
    /// before the process could be started.
    pub fn spawn(&mut self, mut command: Command) -> Result<(), FlashError> {
        let mut guard = self.shared.child();
        if self.shared.interrupted.load(Ordering::SeqCst) {
            return Err(FlashError::Interrupted);
        }

        let program = command.get_program().to_string_lossy().into_owned();
        let child = command
            .spawn()
            .map_err(|source| FlashError::Spawn { program, source })?;
        log::info!(
            "Started {} flasher (pid {}) for {}",
            self.transport,
            child.id(),
            self.firmware.display()
        );
        *guard = Some(child);
        Ok(())
    }

    /// Block until the flasher exits and translate its status
    pub fn wait(&mut self) -> Result<(), FlashError> {
        let status = loop {
            let status = {
                let mut guard = self.shared.child();
                match guard.as_mut() {
                    Some(child) => child.try_wait()?,
                    None if self.shared.interrupted.load(Ordering::SeqCst) => {
                        return Err(FlashError::Interrupted)
                    }
                    None => return Ok(()),
                }
            };
            if let Some(status) = status {
                self.shared.child().take();
                break status;
            }
            thread::sleep(POLL_INTERVAL);
        };

        log::info!("{} flasher exited with {}", self.transport, status);
        self.outcome(status)
    }

    fn outcome(&self, status: ExitStatus) -> Result<(), FlashError> {
        if self.shared.interrupted.load(Ordering::SeqCst) {
            return Err(FlashError::Interrupted);
        }
        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(status) => Err(FlashError::Exited {
                transport: self.transport,
                status,
            }),
            None => Err(FlashError::Terminated {
                transport: self.transport,
            }),
        }
    }
}

impl Drop for FlashSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.shared.child().take() {
            if let Ok(None) = child.try_wait() {
                log::warn!("Killing leftover flasher process {}", child.id());
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}
