//! TOML config file
//!
//! Every key is optional; a missing file means built-in defaults.
//!
//! ```toml
//! firmware_dir = "/usr/share/robot-flasher/firmware"
//!
//! [device]
//! vendor_id = "0403"
//! product_id = "6015"
//! fallback_port = "/dev/ttyUSB0"
//!
//! [http]
//! timeout_secs = 300
//! connect_timeout_secs = 30
//!
//! [flasher.usb]
//! program = "stm32loader"
//! args = ["-p", "{port}", "-e", "-w", "-v", "{firmware}"]
//!
//! [models.robot_xl]
//! url = "http://mirror.local/robot_xl/firmware.bin"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Error, UsageError};
use crate::model::RobotModel;
use crate::profile::{ProfileOverride, ProfileTable};

/// Installed location of the bundled firmware tree
pub const DEFAULT_FIRMWARE_DIR: &str = "/usr/share/robot-flasher/firmware";

/// Config files tried in order when none is given explicitly
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["robot-flasher.toml", "/etc/robot-flasher/config.toml"];

/// USB serial adapter the Device Locator looks for
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// USB vendor ID, 4 hex digits
    pub vendor_id: String,
    /// USB product ID, 4 hex digits
    pub product_id: String,
    /// Port used when no matching adapter is attached
    pub fallback_port: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: "0403".to_string(),
            product_id: "6015".to_string(),
            fallback_port: "/dev/ttyUSB0".to_string(),
        }
    }
}

/// HTTP client settings for firmware downloads
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    /// Whole-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection establishment timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            connect_timeout_secs: 30,
        }
    }
}

/// External flasher program and its argument template
///
/// Arguments may contain `{firmware}` and `{port}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlasherCommand {
    /// Program to execute
    pub program: String,
    /// Argument template
    #[serde(default)]
    pub args: Vec<String>,
}

impl FlasherCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Flasher commands per transport
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlasherConfig {
    /// UART flasher; finds its own port
    pub uart: FlasherCommand,
    /// USB flasher; receives the port
    pub usb: FlasherCommand,
}

impl Default for FlasherConfig {
    fn default() -> Self {
        Self {
            uart: FlasherCommand::new("stm32loader", &["-e", "-w", "-v", "{firmware}"]),
            usb: FlasherCommand::new(
                "stm32loader",
                &["-p", "{port}", "-e", "-w", "-v", "{firmware}"],
            ),
        }
    }
}

/// Raw file structure
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    firmware_dir: Option<PathBuf>,
    #[serde(default)]
    device: DeviceConfig,
    #[serde(default)]
    http: HttpConfig,
    #[serde(default)]
    flasher: FlasherConfig,
    #[serde(default)]
    models: BTreeMap<String, ProfileOverride>,
}

/// Effective configuration of a run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the bundled firmware tree
    pub firmware_dir: PathBuf,
    /// Adapter matched by the Device Locator
    pub device: DeviceConfig,
    /// Download client settings
    pub http: HttpConfig,
    /// External flasher commands
    pub flasher: FlasherConfig,
    /// Model profile table with overrides applied
    pub profiles: ProfileTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            firmware_dir: PathBuf::from(DEFAULT_FIRMWARE_DIR),
            device: DeviceConfig::default(),
            http: HttpConfig::default(),
            flasher: FlasherConfig::default(),
            profiles: ProfileTable::builtin(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;

        let mut overrides = BTreeMap::new();
        for (name, o) in file.models {
            let model: RobotModel = name.parse()?;
            overrides.insert(model, o);
        }

        Ok(Self {
            firmware_dir: file
                .firmware_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIRMWARE_DIR)),
            device: file.device,
            http: file.http,
            flasher: file.flasher,
            profiles: ProfileTable::with_overrides(&overrides),
        })
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the config from the given path or the default locations
    ///
    /// An explicit path must exist. Without one, the first existing file
    /// in [`DEFAULT_CONFIG_PATHS`] is used, or the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(UsageError::ConfigNotFound(path.to_path_buf()).into());
            }
            let config = Self::from_file(path)?;
            log::debug!("Loaded config from {}", path.display());
            return Ok(config);
        }

        for candidate in DEFAULT_CONFIG_PATHS.iter().map(Path::new) {
            if candidate.is_file() {
                let config = Self::from_file(candidate)?;
                log::debug!("Loaded config from {}", candidate.display());
                return Ok(config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.firmware_dir, PathBuf::from(DEFAULT_FIRMWARE_DIR));
        assert_eq!(config.device, DeviceConfig::default());
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.flasher, FlasherConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
firmware_dir = "/opt/firmware"

[device]
vendor_id = "10c4"
product_id = "ea60"

[http]
timeout_secs = 60

[flasher.uart]
program = "stm32flash"
args = ["-w", "{firmware}", "/dev/ttyAMA0"]

[models.robot_xl]
url = "http://mirror.local/xl.bin"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.firmware_dir, PathBuf::from("/opt/firmware"));
        assert_eq!(config.device.vendor_id, "10c4");
        assert_eq!(config.device.fallback_port, "/dev/ttyUSB0");
        assert_eq!(config.http.timeout(), Duration::from_secs(60));
        assert_eq!(config.http.connect_timeout_secs, 30);
        assert_eq!(config.flasher.uart.program, "stm32flash");
        assert_eq!(config.flasher.usb, FlasherConfig::default().usb);
        assert_eq!(
            config.profiles.get(RobotModel::RobotXl).url,
            "http://mirror.local/xl.bin"
        );
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = Config::from_toml_str("[models.robot_xxl]\nurl = \"x\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(UsageError::UnknownModel(name)) if name == "robot_xxl"
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Config::from_toml_str("firmware_path = \"/x\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_usage_error() {
        let err = Config::load(Some(Path::new("/nonexistent/robot-flasher.toml"))).unwrap_err();
        assert!(matches!(err, Error::Usage(UsageError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flasher.toml");
        fs::write(&path, "firmware_dir = \"/srv/fw\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.firmware_dir, PathBuf::from("/srv/fw"));
    }
}
