//! Streaming HTTP downloads with byte-level progress.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{ModsyncError, Result};
use crate::progress::{ProgressEvent, ProgressObserver};

/// Read buffer size.
const CHUNK_SIZE: usize = 8192;

/// Anything that can fetch a release artifact to disk.
pub trait ArtifactFetcher {
    /// Write the resource at `url` to `destination`, returning the byte count.
    fn fetch(&self, url: &str, destination: &Path, observer: &mut dyn ProgressObserver)
        -> Result<u64>;
}

/// Blocking HTTP downloader.
///
/// Downloads have no overall timeout since release archives can be large;
/// only connecting is bounded.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("modsync/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(Duration::from_secs(30))
                .timeout(None::<Duration>)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Stream `url` into `destination` in 8 KiB chunks.
    ///
    /// When the server sends `Content-Length`, `observer` receives a
    /// monotonic percentage after each chunk that changes it, ending at
    /// exactly 100. Otherwise it only receives 100 once the body is done.
    /// A failed download may leave a partial file behind.
    pub fn download(
        &self,
        url: &str,
        destination: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<u64> {
        let network = |message: String| ModsyncError::Network {
            url: url.to_string(),
            message,
        };

        tracing::debug!("Downloading {} to {}", url, destination.display());
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {}", status)));
        }

        let total = response.content_length();

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(destination)?);

        let mut buf = [0u8; CHUNK_SIZE];
        let mut done: u64 = 0;
        let mut last_percent: Option<u8> = None;

        loop {
            let n = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(network(format!("failed to read body: {}", e))),
            };

            writer.write_all(&buf[..n])?;
            done += n as u64;

            if let Some(total) = total {
                let event = ProgressEvent::from_ratio(done, total);
                if last_percent != Some(event.percent) {
                    last_percent = Some(event.percent);
                    observer.on_progress(event);
                }
            }
        }

        writer.flush()?;

        if let Some(total) = total {
            if done != total {
                return Err(network(format!(
                    "body ended after {} of {} bytes",
                    done, total
                )));
            }
        }

        if last_percent != Some(100) {
            observer.on_progress(ProgressEvent::new(100));
        }

        tracing::info!("Downloaded {} bytes from {}", done, url);
        Ok(done)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactFetcher for Downloader {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<u64> {
        self.download(url, destination, observer)
    }
}
