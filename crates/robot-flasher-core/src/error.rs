//! Error types for robot-flasher
//!
//! Each stage of a run has its own error type. The CLI converts all of
//! them into [`Error`] and decides the exit status from the variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::TransportChoice;

/// Invalid or missing operator input
#[derive(Debug, Error)]
pub enum UsageError {
    /// Model name not in the profile table
    #[error("unknown robot model '{0}' (expected one of: robot, robot_xl)")]
    UnknownModel(String),

    /// USB vendor or product ID that is not four hex digits
    #[error("invalid USB ID '{0}': expected 4 hex digits")]
    InvalidUsbId(String),

    /// Config file given on the command line does not exist
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
}

/// Config file could not be read or parsed
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// TOML syntax or schema error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid value inside an otherwise well-formed file
    #[error("invalid config: {0}")]
    Invalid(#[from] UsageError),
}

/// Remote firmware fetch failed
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server answered with something other than 200
    #[error("Failed to download firmware: HTTP {0}")]
    Status(u16),

    /// Server answered 200 with no content
    #[error("Failed to download firmware: empty response body")]
    EmptyBody,

    /// DNS, connect, TLS or timeout failure
    #[error("Failed to download firmware: {0}")]
    Transport(String),

    /// Could not write the downloaded image
    #[error("Failed to store firmware: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport flasher reported failure, or the operator cancelled it
#[derive(Debug, Error)]
pub enum FlashError {
    /// Flasher program could not be started
    #[error("failed to start flasher '{program}': {source}")]
    Spawn {
        /// Program that was being executed
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Flasher ran and exited with a failure status
    #[error("{transport} flasher exited with status {status}")]
    Exited {
        /// Transport the flasher was driving
        transport: TransportChoice,
        /// Exit code reported by the flasher
        status: i32,
    },

    /// Flasher was killed by a signal it did not receive from us
    #[error("{transport} flasher was terminated by a signal")]
    Terminated {
        /// Transport the flasher was driving
        transport: TransportChoice,
    },

    /// Waiting on or killing the flasher failed
    #[error("flasher I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The interrupt handler could not be installed
    #[error("failed to install interrupt handler: {0}")]
    InterruptHook(String),

    /// Operator cancelled the flash
    #[error("flashing interrupted")]
    Interrupted,
}

/// Top-level error for a flashing run
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid operator input
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Config file problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Firmware download failed
    #[error(transparent)]
    DownloadFailed(#[from] DownloadError),

    /// Flashing failed
    #[error("{0}")]
    FlashFailed(FlashError),

    /// Operator cancelled the flash
    #[error("flashing interrupted by operator")]
    Interrupted,
}

impl From<FlashError> for Error {
    fn from(e: FlashError) -> Self {
        match e {
            FlashError::Interrupted => Error::Interrupted,
            other => Error::FlashFailed(other),
        }
    }
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 2,
            Error::Config(_) | Error::DownloadFailed(_) | Error::FlashFailed(_) => 1,
            Error::Interrupted => 130,
        }
    }
}

/// Result type alias using the top-level Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_not_a_flash_failure() {
        let err: Error = FlashError::Interrupted.into();
        assert!(matches!(err, Error::Interrupted));
        assert_eq!(err.exit_code(), 130);
    }

    #[test]
    fn test_exit_codes() {
        let usage: Error = UsageError::UnknownModel("x".into()).into();
        assert_eq!(usage.exit_code(), 2);

        let download: Error = DownloadError::Status(404).into();
        assert_eq!(download.exit_code(), 1);
        assert_eq!(download.to_string(), "Failed to download firmware: HTTP 404");

        let flash: Error = FlashError::Exited {
            transport: TransportChoice::Usb,
            status: 3,
        }
        .into();
        assert_eq!(flash.exit_code(), 1);
        assert_eq!(flash.to_string(), "USB flasher exited with status 3");
    }
}
