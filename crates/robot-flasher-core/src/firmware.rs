//! Firmware Resolver
//!
//! Resolution and acquisition are separate steps. [`FirmwareResolver::resolve`]
//! only computes a path and never touches the network, so it can be called
//! without side effects. [`FirmwareResolver::source`] additionally checks
//! whether the bundled image is installed and, if not, says where to
//! download it from. Performing that download is the caller's job.

use std::path::{Path, PathBuf};

use crate::model::RobotModel;
use crate::profile::ProfileTable;

/// Where the firmware image for a run comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareSource {
    /// Path given by the operator, used verbatim
    ExplicitFile(PathBuf),
    /// Bundled image that is installed locally
    BundledDefault(PathBuf),
    /// Bundled image is missing and must be downloaded to `destination`
    RemoteDownload {
        /// Released image URL
        url: String,
        /// Bundled image path the download is written to
        destination: PathBuf,
    },
}

impl FirmwareSource {
    /// The single concrete path the flasher will be given
    pub fn path(&self) -> &Path {
        match self {
            FirmwareSource::ExplicitFile(path) | FirmwareSource::BundledDefault(path) => path,
            FirmwareSource::RemoteDownload { destination, .. } => destination,
        }
    }

    /// Whether a download must complete before this path is usable
    pub fn needs_download(&self) -> bool {
        matches!(self, FirmwareSource::RemoteDownload { .. })
    }
}

/// Resolves the firmware image path for a model
#[derive(Debug)]
pub struct FirmwareResolver<'a> {
    firmware_dir: PathBuf,
    table: &'a ProfileTable,
}

impl<'a> FirmwareResolver<'a> {
    /// Create a resolver rooted at the bundled firmware directory
    pub fn new(firmware_dir: impl Into<PathBuf>, table: &'a ProfileTable) -> Self {
        Self {
            firmware_dir: firmware_dir.into(),
            table,
        }
    }

    /// Bundled image path of a model
    pub fn bundled_path(&self, model: RobotModel) -> PathBuf {
        // An absolute override in the config replaces the directory entirely
        self.firmware_dir.join(&self.table.get(model).firmware)
    }

    /// Resolve the firmware path without checking the filesystem
    ///
    /// An explicit path always wins; no existence check is made on it.
    pub fn resolve(&self, model: RobotModel, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.bundled_path(model),
        }
    }

    /// Resolve the firmware source, checking whether the bundled image exists
    pub fn source(&self, model: RobotModel, explicit: Option<&Path>) -> FirmwareSource {
        let path = self.resolve(model, explicit);
        if explicit.is_some() {
            log::debug!("Using explicit firmware file {}", path.display());
            return FirmwareSource::ExplicitFile(path);
        }

        if path.is_file() {
            log::debug!("Using bundled firmware {}", path.display());
            FirmwareSource::BundledDefault(path)
        } else {
            log::debug!(
                "Bundled firmware {} not installed, download required",
                path.display()
            );
            FirmwareSource::RemoteDownload {
                url: self.table.get(model).url.clone(),
                destination: path,
            }
        }
    }
}
