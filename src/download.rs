// src/download.rs

//! Source archive downloads
//!
//! Blocking HTTP client with retry support and streamed writes, plus an
//! optional progress bar for interactive fetches. The recipe model carries
//! no checksums, so a download is considered good when the server reports
//! success and the stream completes.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for failed downloads
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Stream an HTTP response to a file with optional progress tracking
///
/// Always streams in chunks, never buffering the entire response in
/// memory, so it is safe for archives of any size.
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    total_size: u64,
    progress_bar: Option<&ProgressBar>,
    display_name: &str,
) -> Result<u64> {
    if let Some(pb) = progress_bar {
        if total_size > 0 {
            pb.set_length(total_size);
            pb.set_message(display_name.to_string());
        } else {
            pb.set_message(format!("{} (unknown size)", display_name));
        }
    }

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::IoError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

/// HTTP client wrapper with retry support
pub struct SourceClient {
    client: reqwest::blocking::Client,
    max_retries: u32,
}

impl SourceClient {
    /// Create a new source client
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Download a URL to a file
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        self.download_file_with_progress(url, dest, None)
    }

    /// Download a URL to a file, updating `progress_bar` as bytes arrive
    ///
    /// Transport and stream failures are retried with linear backoff up to
    /// the configured limit; an HTTP error status is deterministic and
    /// fails immediately. A partial file from a failed attempt is removed
    /// before the next try.
    pub fn download_file_with_progress(
        &self,
        url: &str,
        dest: &Path,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<u64> {
        let display_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("archive")
            .to_string();

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(Error::DownloadError(format!(
                            "HTTP {} fetching {}",
                            status, url
                        )));
                    }

                    let total_size = response.content_length().unwrap_or(0);
                    let mut file = File::create(dest)?;
                    match stream_response_to_file(
                        response,
                        &mut file,
                        total_size,
                        progress_bar,
                        &display_name,
                    ) {
                        Ok(bytes) => {
                            debug!("Downloaded {} bytes from {}", bytes, url);
                            return Ok(bytes);
                        }
                        Err(e) => {
                            let _ = std::fs::remove_file(dest);
                            if attempt >= self.max_retries {
                                return Err(e);
                            }
                            warn!("Download attempt {} failed: {}", attempt, e);
                        }
                    }
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {}: {}",
                            url, e
                        )));
                    }
                    warn!("Download attempt {} failed: {}", attempt, e);
                }
            }

            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
        }
    }
}

/// Create a styled progress bar for an archive download
pub fn fetch_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(SourceClient::new().is_ok());
    }

    #[test]
    fn test_download_rejects_bad_url() {
        let client = SourceClient::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.tar.gz");
        let result = client.download_file("not-a-url", &dest);
        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_http_error_status_fails_fast() {
        use std::net::TcpListener;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let server_hits = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(s) => s,
                    Err(_) => break,
                };
                server_hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n");
            }
        });

        let client = SourceClient::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.tar.gz");

        let err = client
            .download_file(&format!("http://{}/missing.tar.gz", addr), &dest)
            .unwrap_err();

        // A deterministic status error is not retried
        assert!(err.to_string().contains("404"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!dest.exists());
    }
}
