use crate::core::{MediaRecord, StreamFormat};
use anyhow::Result;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};

const SITE_REFERER: &str = "https://www.contv.com/";

pub struct Downloader {
    client: reqwest::Client,
    pub concurrent_limit: usize,
}

impl Downloader {
    pub fn new(concurrent_limit: usize) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            concurrent_limit,
        }
    }

    pub async fn download(&self, record: &MediaRecord, output_path: PathBuf) -> Result<()> {
        let format = self.select_best_format(&record.formats)?;

        info!("Downloading: {} - {}", record.title, format.format_id);
        info!("URL: {}", format.url);

        self.download_format(format, output_path).await?;

        Ok(())
    }

    /// Prefer plain mp4 over manifest-derived streams, then highest bitrate.
    /// Codec fields stay optional on every format here, so they never gate
    /// selection.
    pub fn select_best_format<'a>(&self, formats: &'a [StreamFormat]) -> Result<&'a StreamFormat> {
        let best = formats.iter().max_by_key(|f| {
            let container = match f.ext.as_str() {
                "mp4" => 1000,
                "webm" => 500,
                _ => 0,
            };
            let direct = if f.format_id == "http" { 100 } else { 0 };
            container + direct + f.tbr.unwrap_or(0.0) as i32
        });

        best.ok_or_else(|| anyhow::anyhow!("No suitable format found"))
    }

    async fn download_format(&self, format: &StreamFormat, output_path: PathBuf) -> Result<()> {
        // Check if partial file exists for resume capability
        let resume_from = if output_path.exists() {
            match tokio::fs::metadata(&output_path).await {
                Ok(metadata) => {
                    let size = metadata.len();
                    info!("Found partial file, resuming from {} bytes", size);
                    Some(size)
                }
                Err(_) => None,
            }
        } else {
            None
        };

        const MAX_RETRIES: u32 = 3;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut request = self
                .client
                .get(&format.url)
                .header("Accept", "*/*")
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("Connection", "keep-alive")
                .header("Referer", SITE_REFERER)
                .header("Origin", SITE_REFERER.trim_end_matches('/'));

            if let Some(resume_pos) = resume_from {
                request = request.header("Range", format!("bytes={}-", resume_pos));
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!("Request failed (attempt {}): {}", attempt, e);
                    tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
                    continue;
                }
            };

            let status = response.status();

            if status.is_success() || status.as_u16() == 206 {
                return self.perform_download(response, output_path, resume_from).await;
            } else if status.as_u16() == 403 && attempt < MAX_RETRIES {
                warn!(
                    "HTTP 403 error (attempt {}), retrying in {} seconds...",
                    attempt,
                    2_u64.pow(attempt)
                );
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
                continue;
            } else {
                anyhow::bail!("Failed to download after {} attempts: HTTP {}", attempt, status);
            }
        }
    }

    async fn perform_download(
        &self,
        response: reqwest::Response,
        output_path: PathBuf,
        resume_from: Option<u64>,
    ) -> Result<()> {
        let total_size = response.content_length();
        let mut downloaded = resume_from.unwrap_or(0);

        // Open file in append mode if resuming, create new otherwise
        let mut file = if resume_from.is_some() {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&output_path)
                .await?;
            file.seek(std::io::SeekFrom::End(0)).await?;
            file
        } else {
            File::create(&output_path).await?
        };

        let expected_total = if let Some(partial_size) = resume_from {
            total_size.map(|size| size + partial_size)
        } else {
            total_size
        };

        println!(
            "Downloading {} bytes...",
            expected_total.map_or("unknown".to_string(), |s| s.to_string())
        );

        if let Some(resume_pos) = resume_from {
            println!("Resuming from {} bytes", resume_pos);
        }

        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            file.write_all(&chunk).await?;

            if let Some(total) = expected_total {
                let progress = (downloaded as f64 / total as f64 * 100.0) as u32;
                print!("\rProgress: {}% ({}/{} bytes)", progress, downloaded, total);
                std::io::Write::flush(&mut std::io::stdout())?;
            } else if downloaded % (1024 * 1024) == 0 {
                print!("\rDownloaded: {} bytes", downloaded);
                std::io::Write::flush(&mut std::io::stdout())?;
            }
        }

        println!();
        file.flush().await?;
        info!("Downloaded to: {}", output_path.display());

        Ok(())
    }
}
