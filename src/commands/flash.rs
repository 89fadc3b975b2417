//! Flash command
//!
//! Everything is resolved before any I/O: transport, firmware source and
//! port. The firmware is then acquired (if it has to be downloaded) and
//! only after that succeeds is the flasher started.

use std::path::PathBuf;

use robot_flasher_core::config::Config;
use robot_flasher_core::firmware::{FirmwareResolver, FirmwareSource};
use robot_flasher_core::traits::{FlashRunner, Fetcher};
use robot_flasher_core::{DevicePort, Result, RobotModel, TransportChoice};
use robot_flasher_locate::{DeviceLocator, PortEnumerator};

/// Everything a flashing run needs, decided up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashPlan {
    pub model: RobotModel,
    pub transport: TransportChoice,
    pub source: FirmwareSource,
    pub port: DevicePort,
}

/// Operator input for the flash command
#[derive(Debug, Clone, Default)]
pub struct FlashRequest {
    pub force_usb: bool,
    pub port: Option<String>,
    pub file: Option<PathBuf>,
    pub firmware_dir: Option<PathBuf>,
}

/// Resolve transport, firmware source and port
pub fn plan(
    config: &Config,
    model: RobotModel,
    request: &FlashRequest,
    ports: &dyn PortEnumerator,
) -> Result<FlashPlan> {
    let transport = config.profiles.transport(model, request.force_usb);

    let firmware_dir = request
        .firmware_dir
        .as_deref()
        .unwrap_or(&config.firmware_dir);
    let resolver = FirmwareResolver::new(firmware_dir, &config.profiles);
    let source = resolver.source(model, request.file.as_deref());

    let port = match &request.port {
        Some(port) => DevicePort::new(port.as_str()),
        None => DeviceLocator::new(&config.device.vendor_id, &config.device.product_id)?
            .find_port(ports, &config.device.fallback_port),
    };

    log::info!(
        "Robot model {}: {} transport, firmware {}",
        model,
        transport,
        source.path().display()
    );

    Ok(FlashPlan {
        model,
        transport,
        source,
        port,
    })
}

/// Acquire the firmware if needed, then flash it
pub fn execute<F: Fetcher, R: FlashRunner>(
    plan: &FlashPlan,
    fetcher: &mut F,
    runner: &mut R,
) -> Result<()> {
    if let FirmwareSource::RemoteDownload { url, destination } = &plan.source {
        println!("Downloading firmware...");
        fetcher.download(url, destination)?;
        println!("Firmware downloaded successfully.");
    }

    runner.flash(plan.transport, plan.source.path(), &plan.port)?;
    println!("Firmware flashing completed successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_flasher_core::{DownloadError, Error, FlashError};
    use robot_flasher_locate::{PortEntry, UsbInfo};
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    struct RecordingFetcher {
        events: Events,
        status: Option<u16>,
    }

    impl Fetcher for RecordingFetcher {
        fn download(
            &mut self,
            url: &str,
            destination: &Path,
        ) -> std::result::Result<u64, DownloadError> {
            self.events
                .borrow_mut()
                .push(format!("fetch {} -> {}", url, destination.display()));
            match self.status {
                Some(status) => Err(DownloadError::Status(status)),
                None => Ok(4),
            }
        }
    }

    struct RecordingRunner {
        events: Events,
    }

    impl FlashRunner for RecordingRunner {
        fn flash(
            &mut self,
            transport: TransportChoice,
            firmware: &Path,
            port: &DevicePort,
        ) -> std::result::Result<(), FlashError> {
            self.events.borrow_mut().push(format!(
                "flash {} {} {}",
                transport,
                firmware.display(),
                port
            ));
            Ok(())
        }
    }

    struct Ports(Vec<PortEntry>);

    impl PortEnumerator for Ports {
        fn ports(&self) -> std::result::Result<Vec<PortEntry>, String> {
            Ok(self.0.clone())
        }
    }

    fn adapter(path: &str) -> Ports {
        Ports(vec![PortEntry {
            path: path.to_string(),
            usb: Some(UsbInfo {
                vid: 0x0403,
                pid: 0x6015,
                serial_number: None,
                product: None,
            }),
        }])
    }

    fn harness(status: Option<u16>) -> (Events, RecordingFetcher, RecordingRunner) {
        let events = Events::default();
        let fetcher = RecordingFetcher {
            events: Rc::clone(&events),
            status,
        };
        let runner = RecordingRunner {
            events: Rc::clone(&events),
        };
        (events, fetcher, runner)
    }

    fn request(dir: &Path) -> FlashRequest {
        FlashRequest {
            firmware_dir: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_robot_xl_downloads_then_flashes_over_usb() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let plan = plan(
            &config,
            RobotModel::RobotXl,
            &request(dir.path()),
            &adapter("/dev/ttyUSB2"),
        )
        .unwrap();

        let bundled = dir.path().join("robot_xl/v1.4.0.bin");
        assert_eq!(plan.transport, TransportChoice::Usb);
        assert_eq!(plan.port, DevicePort::new("/dev/ttyUSB2"));
        assert_eq!(plan.source.path(), bundled);

        let (events, mut fetcher, mut runner) = harness(None);
        execute(&plan, &mut fetcher, &mut runner).unwrap();

        let url = &config.profiles.get(RobotModel::RobotXl).url;
        assert_eq!(
            *events.borrow(),
            [
                format!("fetch {} -> {}", url, bundled.display()),
                format!("flash USB {} /dev/ttyUSB2", bundled.display()),
            ]
        );
    }

    #[test]
    fn test_failed_download_never_flashes() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(
            &Config::default(),
            RobotModel::Robot,
            &request(dir.path()),
            &Ports(vec![]),
        )
        .unwrap();

        let (events, mut fetcher, mut runner) = harness(Some(404));
        let err = execute(&plan, &mut fetcher, &mut runner).unwrap_err();

        assert!(matches!(err, Error::DownloadFailed(DownloadError::Status(404))));
        assert_eq!(events.borrow().len(), 1);
        assert!(events.borrow()[0].starts_with("fetch "));
    }

    #[test]
    fn test_explicit_file_suppresses_download() {
        let dir = tempfile::tempdir().unwrap();
        for model in RobotModel::ALL {
            let req = FlashRequest {
                file: Some(PathBuf::from("/tmp/custom.bin")),
                ..request(dir.path())
            };
            let plan = plan(&Config::default(), model, &req, &Ports(vec![])).unwrap();

            let (events, mut fetcher, mut runner) = harness(Some(500));
            execute(&plan, &mut fetcher, &mut runner).unwrap();
            assert_eq!(events.borrow().len(), 1);
            assert!(events.borrow()[0].starts_with("flash "));
            assert!(events.borrow()[0].contains("/tmp/custom.bin"));
        }
    }

    #[test]
    fn test_installed_firmware_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("robot/v0.11.0.bin");
        fs::create_dir_all(bundled.parent().unwrap()).unwrap();
        fs::write(&bundled, [0x55; 32]).unwrap();

        let plan = plan(
            &Config::default(),
            RobotModel::Robot,
            &request(dir.path()),
            &Ports(vec![]),
        )
        .unwrap();
        assert_eq!(plan.transport, TransportChoice::Uart);
        assert_eq!(plan.port, DevicePort::new("/dev/ttyUSB0"));

        let (events, mut fetcher, mut runner) = harness(None);
        execute(&plan, &mut fetcher, &mut runner).unwrap();
        assert_eq!(
            *events.borrow(),
            [format!("flash UART {} /dev/ttyUSB0", bundled.display())]
        );
    }

    #[test]
    fn test_explicit_port_and_forced_usb() {
        let dir = tempfile::tempdir().unwrap();
        let req = FlashRequest {
            force_usb: true,
            port: Some("/dev/ttyACM1".to_string()),
            ..request(dir.path())
        };
        let plan = plan(
            &Config::default(),
            RobotModel::Robot,
            &req,
            &adapter("/dev/ttyUSB2"),
        )
        .unwrap();
        assert_eq!(plan.transport, TransportChoice::Usb);
        assert_eq!(plan.port, DevicePort::new("/dev/ttyACM1"));
    }

    #[test]
    fn test_flash_failure_propagates() {
        struct FailingRunner;
        impl FlashRunner for FailingRunner {
            fn flash(
                &mut self,
                transport: TransportChoice,
                _firmware: &Path,
                _port: &DevicePort,
            ) -> std::result::Result<(), FlashError> {
                Err(FlashError::Exited {
                    transport,
                    status: 1,
                })
            }
        }

        let plan = FlashPlan {
            model: RobotModel::Robot,
            transport: TransportChoice::Uart,
            source: FirmwareSource::ExplicitFile(PathBuf::from("fw.bin")),
            port: DevicePort::new("/dev/ttyUSB0"),
        };
        let (_, mut fetcher, _) = harness(None);
        let err = execute(&plan, &mut fetcher, &mut FailingRunner).unwrap_err();
        assert!(matches!(err, Error::FlashFailed(FlashError::Exited { .. })));
        assert_eq!(err.exit_code(), 1);
    }
}
