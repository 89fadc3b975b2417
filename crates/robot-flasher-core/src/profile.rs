//! Per-model firmware profiles
//!
//! The built-in table maps every [`RobotModel`] to its default transport,
//! the location of its bundled firmware image (relative to the firmware
//! directory) and the URL of the released image. Transport selection reads
//! the table too, see [`ProfileTable::transport`]. The table is plain data;
//! adding a model means adding a row here and a variant to `RobotModel`.
//! Config files may override the file and URL of existing rows.

use std::collections::BTreeMap;

use crate::model::{RobotModel, TransportChoice};

/// Firmware profile of one robot model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    /// Model this profile belongs to
    pub model: RobotModel,
    /// Transport used when the operator does not force USB
    pub default_transport: TransportChoice,
    /// Firmware version shipped with this tool
    pub version: String,
    /// Bundled image, relative to the firmware directory
    pub firmware: String,
    /// Released image URL
    pub url: String,
}

struct BuiltinProfile {
    model: RobotModel,
    default_transport: TransportChoice,
    version: &'static str,
    firmware: &'static str,
    url: &'static str,
}

const BUILTIN_PROFILES: &[BuiltinProfile] = &[
    BuiltinProfile {
        model: RobotModel::Robot,
        default_transport: TransportChoice::Uart,
        version: "0.11.0",
        firmware: "robot/v0.11.0.bin",
        url: "https://github.com/husarion/robot_ros2_firmware/releases/download/0.11.0/firmware.bin",
    },
    BuiltinProfile {
        model: RobotModel::RobotXl,
        default_transport: TransportChoice::Usb,
        version: "1.4.0",
        firmware: "robot_xl/v1.4.0.bin",
        url: "https://github.com/husarion/robot_firmware/releases/download/v1.4.0/firmware.bin",
    },
];

/// Override of a profile's file or URL, from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverride {
    /// Bundled image, relative to the firmware directory (or absolute)
    pub firmware: Option<String>,
    /// Released image URL
    pub url: Option<String>,
}

/// Immutable lookup table of model profiles
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: BTreeMap<RobotModel, ModelProfile>,
}

impl ProfileTable {
    /// Table with the built-in profiles only
    pub fn builtin() -> Self {
        let profiles = BUILTIN_PROFILES
            .iter()
            .map(|p| {
                (
                    p.model,
                    ModelProfile {
                        model: p.model,
                        default_transport: p.default_transport,
                        version: p.version.to_string(),
                        firmware: p.firmware.to_string(),
                        url: p.url.to_string(),
                    },
                )
            })
            .collect();
        Self { profiles }
    }

    /// Built-in table with config overrides applied
    pub fn with_overrides(overrides: &BTreeMap<RobotModel, ProfileOverride>) -> Self {
        let mut table = Self::builtin();
        for (model, o) in overrides {
            if let Some(profile) = table.profiles.get_mut(model) {
                if let Some(firmware) = &o.firmware {
                    log::debug!("{}: firmware overridden to {}", model, firmware);
                    profile.firmware = firmware.clone();
                }
                if let Some(url) = &o.url {
                    log::debug!("{}: URL overridden to {}", model, url);
                    profile.url = url.clone();
                }
            }
        }
        table
    }

    /// Profile of a model
    pub fn get(&self, model: RobotModel) -> &ModelProfile {
        // Every RobotModel has a builtin row
        &self.profiles[&model]
    }

    /// Resolve the transport for a model
    ///
    /// Forcing USB always yields USB; otherwise the profile's default
    /// transport applies (USB for `robot_xl`, UART for `robot`). This is a
    /// static rule, no device is probed.
    pub fn transport(&self, model: RobotModel, force_usb: bool) -> TransportChoice {
        if force_usb {
            TransportChoice::Usb
        } else {
            self.get(model).default_transport
        }
    }

    /// Iterate over all profiles in model order
    pub fn iter(&self) -> impl Iterator<Item = &ModelProfile> {
        self.profiles.values()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
