//! robot-flasher - Firmware flashing tool for robot controller boards
//!
//! Resolves the transport (UART or USB) and the firmware image for a robot
//! model, downloads the released image when it is not installed, and runs
//! the transport flasher under supervision.
//!
//! # Architecture
//!
//! ```text
//! CLI (this crate)
//!   -> robot-flasher-core     model, profiles, Firmware Resolver, config, errors
//!   -> robot-flasher-locate   USB serial adapter discovery
//!   -> robot-flasher-fetch    HTTP firmware download
//!   -> robot-flasher-session  flasher process + interrupt handling
//! ```

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use commands::flash::FlashRequest;
use robot_flasher_core::config::Config;
use robot_flasher_core::Error;
use robot_flasher_fetch::HttpFetcher;
use robot_flasher_locate::{DeviceLocator, SystemPorts};
use robot_flasher_session::{CtrlcHook, FlashSupervisor};

/// Level forced by `-v`/`-vv`; `None` leaves `RUST_LOG` (default info) in charge
fn verbosity_filter(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = verbosity_filter(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Interrupted) => {
            eprintln!("Flashing interrupted.");
            ExitCode::from(Error::Interrupted.exit_code() as u8)
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Flash {
            model,
            usb,
            port,
            file,
        } => {
            let request = FlashRequest {
                force_usb: usb,
                port,
                file,
                firmware_dir: model.firmware_dir.clone(),
            };
            let plan = commands::flash::plan(&config, model.model(), &request, &SystemPorts)?;
            println!(
                "Flashing {} firmware over {} ({})",
                plan.model,
                plan.transport,
                plan.source.path().display()
            );

            let mut fetcher = HttpFetcher::with_config(&config.http)?;
            let mut supervisor = FlashSupervisor::new(&config.flasher, CtrlcHook::new());
            commands::flash::execute(&plan, &mut fetcher, &mut supervisor)
        }
        Commands::Download { model, output } => {
            let mut fetcher = HttpFetcher::with_config(&config.http)?;
            commands::download::run(
                &config,
                model.model(),
                model.firmware_dir.as_deref(),
                output.as_deref(),
                &mut fetcher,
            )
            .map(|_| ())
        }
        Commands::ListModels => {
            commands::list_models(&config.profiles);
            Ok(())
        }
        Commands::ListPorts => {
            let locator = DeviceLocator::new(&config.device.vendor_id, &config.device.product_id)?;
            commands::list_ports(&SystemPorts, &locator);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), None);
        assert_eq!(verbosity_filter(1), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity_filter(2), Some(log::LevelFilter::Trace));
        assert_eq!(verbosity_filter(5), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn test_verbose_flag_enables_debug_records() {
        let mut logger = env_logger::Builder::new();
        logger.parse_filters("info");
        if let Some(level) = verbosity_filter(1) {
            logger.filter_level(level);
        }
        let logger = logger.build();

        let debug = log::Metadata::builder()
            .level(log::Level::Debug)
            .target("robot_flasher_locate")
            .build();
        let trace = log::Metadata::builder()
            .level(log::Level::Trace)
            .target("robot_flasher_locate")
            .build();
        assert!(log::Log::enabled(&logger, &debug));
        assert!(!log::Log::enabled(&logger, &trace));
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }
}
