//! robot-flasher-fetch - Firmware download over HTTP
//!
//! Performs a single GET (following redirects) and stores the body only
//! if the server answered 200 with a non-empty body. The image is written
//! to a `.part` sibling first and renamed into place, so the destination
//! either holds the complete download or is left untouched.
//!
//! No retry, resume or checksum verification is done.
//!
//! # Example
//!
//! ```no_run
//! use robot_flasher_core::traits::Fetcher;
//! use robot_flasher_fetch::HttpFetcher;
//! use std::path::Path;
//!
//! let mut fetcher = HttpFetcher::new()?;
//! let bytes = fetcher.download(
//!     "https://example.com/firmware.bin",
//!     Path::new("/tmp/firmware.bin"),
//! )?;
//! println!("Downloaded {} bytes", bytes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod progress;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use robot_flasher_core::config::HttpConfig;
use robot_flasher_core::traits::Fetcher;
use robot_flasher_core::DownloadError;

use crate::progress::DownloadProgress;

const READ_CHUNK: usize = 16 * 1024;

/// Upper bound on the buffer reserved from an advertised Content-Length
const MAX_PREALLOC: u64 = READ_CHUNK as u64 * 64;

/// Blocking HTTP firmware fetcher
pub struct HttpFetcher {
    client: Client,
    show_progress: bool,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeouts
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a fetcher with the given timeouts
    pub fn with_config(config: &HttpConfig) -> Result<Self, DownloadError> {
        Self::build(config.timeout(), config.connect_timeout())
    }

    fn build(timeout: Duration, connect_timeout: Duration) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("robot-flasher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// Enable or disable the terminal progress bar
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn fetch_body(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DownloadError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::debug!("GET {} answered {}", url, status);
            return Err(DownloadError::Status(status.as_u16()));
        }

        let total = response.content_length();
        let progress = DownloadProgress::new(total, self.show_progress);
        // Content-Length is untrusted; the Vec grows past this as data arrives
        let mut body = Vec::with_capacity(total.map_or(0, |t| t.min(MAX_PREALLOC)) as usize);
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let n = response
                .read(&mut chunk)
                .map_err(|e| DownloadError::Transport(e.to_string()))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
            progress.inc(n as u64);
        }
        progress.finish();

        if body.is_empty() {
            return Err(DownloadError::EmptyBody);
        }
        Ok(body)
    }
}

/// Sibling path the body is staged in before the rename
fn part_path(destination: &Path) -> io::Result<PathBuf> {
    let name = destination.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a file path: {}", destination.display()),
        )
    })?;
    let mut part = name.to_os_string();
    part.push(".part");
    Ok(destination.with_file_name(part))
}

/// Write `data` to `destination` through a `.part` file and a rename
fn store(destination: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let part = part_path(destination)?;
    let result = fs::write(&part, data).and_then(|()| fs::rename(&part, destination));
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

impl Fetcher for HttpFetcher {
    fn download(&mut self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        log::info!("Downloading firmware from {}", url);
        let body = self.fetch_body(url)?;
        store(destination, &body)?;
        log::info!(
            "Wrote {} bytes to {}",
            body.len(),
            destination.display()
        );
        Ok(body.len() as u64)
    }
}
