//! Download command - firmware acquisition without touching a device

use std::path::{Path, PathBuf};

use robot_flasher_core::config::Config;
use robot_flasher_core::firmware::FirmwareResolver;
use robot_flasher_core::traits::Fetcher;
use robot_flasher_core::{Result, RobotModel};

/// Download the released firmware of `model`
///
/// Writes to `output`, or to the model's bundled image path under
/// `firmware_dir` (falling back to the configured directory).
pub fn run<F: Fetcher>(
    config: &Config,
    model: RobotModel,
    firmware_dir: Option<&Path>,
    output: Option<&Path>,
    fetcher: &mut F,
) -> Result<PathBuf> {
    let dir = firmware_dir.unwrap_or(&config.firmware_dir);
    let destination = FirmwareResolver::new(dir, &config.profiles).resolve(model, output);

    let profile = config.profiles.get(model);
    println!("Downloading {} firmware v{}...", model, profile.version);
    let bytes = fetcher.download(&profile.url, &destination)?;
    println!("Saved {} bytes to {}", bytes, destination.display());
    Ok(destination)
}
