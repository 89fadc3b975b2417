//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use robot_flasher_core::RobotModel;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "robot-flasher")]
#[command(author, version, about = "Flash robot controller firmware", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (TOML)
    /// Defaults to ./robot-flasher.toml, then /etc/robot-flasher/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Robot model as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelArg {
    /// Base robot (UART by default)
    #[value(name = "robot")]
    Robot,
    /// Robot XL (always USB)
    #[value(name = "robot_xl")]
    RobotXl,
}

impl From<ModelArg> for RobotModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Robot => RobotModel::Robot,
            ModelArg::RobotXl => RobotModel::RobotXl,
        }
    }
}

/// Model selection shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Robot model
    #[arg(long, env = "ROBOT_MODEL_NAME", value_enum)]
    pub robot_model: ModelArg,

    /// Directory holding the bundled firmware images
    #[arg(long, env = "ROBOT_FLASHER_FIRMWARE_DIR")]
    pub firmware_dir: Option<PathBuf>,
}

impl ModelArgs {
    pub fn model(&self) -> RobotModel {
        self.robot_model.into()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flash firmware to the robot controller
    Flash {
        #[command(flatten)]
        model: ModelArgs,

        /// Flash via USB. Always set for robot_xl; other robots use UART by default
        #[arg(long)]
        usb: bool,

        /// Communication port (defaults to the attached USB serial adapter, or /dev/ttyUSB0)
        #[arg(short, long)]
        port: Option<String>,

        /// Firmware file (defaults to the bundled image, downloaded if missing)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Download the released firmware without flashing
    Download {
        #[command(flatten)]
        model: ModelArgs,

        /// Output file (defaults to the bundled image path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported robot models
    ListModels,

    /// List attached serial ports
    ListPorts,
}
