//! Robot models, transports and device ports

use core::fmt;
use core::str::FromStr;

use crate::error::UsageError;

/// Robot model selected for a run
///
/// The default transport, bundled firmware file and download URL of each
/// model live in [`crate::profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RobotModel {
    /// Base robot, flashed over UART by default
    Robot,
    /// Robot XL, always flashed over USB
    RobotXl,
}

impl RobotModel {
    /// Every known model, in table order
    pub const ALL: [RobotModel; 2] = [RobotModel::Robot, RobotModel::RobotXl];

    /// Canonical name as accepted on the command line and in config files
    pub fn name(self) -> &'static str {
        match self {
            RobotModel::Robot => "robot",
            RobotModel::RobotXl => "robot_xl",
        }
    }
}

impl fmt::Display for RobotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RobotModel {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RobotModel::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UsageError::UnknownModel(s.to_string()))
    }
}

/// Physical channel used to program the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportChoice {
    /// Serial UART; the flasher finds its own port
    Uart,
    /// USB serial adapter at an explicit port
    Usb,
}

impl fmt::Display for TransportChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportChoice::Uart => f.write_str("UART"),
            TransportChoice::Usb => f.write_str("USB"),
        }
    }
}

/// Filesystem handle of a serial device (e.g. `/dev/ttyUSB0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePort(String);

impl DevicePort {
    /// Wrap a device path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Device path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DevicePort {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DevicePort {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_names() {
        assert_eq!("robot".parse::<RobotModel>().unwrap(), RobotModel::Robot);
        assert_eq!("robot_xl".parse::<RobotModel>().unwrap(), RobotModel::RobotXl);
        assert!(matches!(
            "robot-xl".parse::<RobotModel>(),
            Err(UsageError::UnknownModel(name)) if name == "robot-xl"
        ));
    }
}
