use crate::config::Config;
use crate::core::{Downloader, Extraction, ExtractorEngine, MediaRecord};
use crate::utils::generate_output_filename;
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "contv-dl")]
#[command(about = "CONtv metadata extractor and downloader")]
#[command(version)]
pub struct Cli {
    /// URL to download
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output filename template
    #[arg(short = 't', long)]
    pub output_template: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of concurrent downloads
    #[arg(short = 'j', long)]
    pub concurrent: Option<usize>,

    /// Print the extracted record as JSON instead of downloading
    #[arg(long)]
    pub dump_json: bool,

    /// Extract and print information without downloading
    #[arg(long)]
    pub skip_download: bool,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        if self.verbose {
            println!("Verbose mode enabled");
        }

        let config = Config::load()?;
        let output_dir = self
            .output
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.output_dir.clone());
        let concurrent = self.concurrent.unwrap_or(config.concurrent_downloads);

        let engine = ExtractorEngine::new();

        println!("Extracting video information...");
        let extraction = engine.extract(&self.url).await?;

        if self.dump_json {
            println!("{}", serde_json::to_string_pretty(&extraction)?);
            return Ok(());
        }

        let downloader = Downloader::new(concurrent);

        match extraction {
            Extraction::Video(record) => {
                self.handle_video(&record, &downloader, &output_dir).await?;
            }
            Extraction::Playlist(playlist) => {
                println!(
                    "Playlist: {}",
                    playlist.title.as_deref().unwrap_or(&playlist.id)
                );
                println!("Entries: {}", playlist.entries.len());

                for entry in &playlist.entries {
                    println!("Resolving entry: {}", entry.id);
                    match engine.extract(&entry.url).await {
                        Ok(Extraction::Video(record)) => {
                            self.handle_video(&record, &downloader, &output_dir).await?;
                        }
                        Ok(Extraction::Playlist(_)) => {
                            tracing::warn!("{}: nested playlist, skipping", entry.id);
                        }
                        Err(e) => {
                            tracing::warn!("{}: extraction failed: {}", entry.id, e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_video(
        &self,
        record: &MediaRecord,
        downloader: &Downloader,
        output_dir: &Path,
    ) -> Result<()> {
        println!("Title: {}", record.title);
        if let Some(duration) = record.duration {
            println!("Duration: {:.0}s", duration);
        }
        if let Some(view_count) = record.view_count {
            println!("Views: {}", view_count);
        }

        println!("Available formats: {}", record.formats.len());
        for (i, format) in record.formats.iter().enumerate().take(5) {
            println!(
                "  {}: {} - {} ({})",
                i + 1,
                format.format_id,
                format.resolution.as_deref().unwrap_or("unknown"),
                format.ext
            );
        }

        if self.skip_download {
            return Ok(());
        }

        let template = self
            .output_template
            .as_deref()
            .unwrap_or("%(title)s.%(ext)s");
        let filename = generate_output_filename(template, record);
        let output_path = output_dir.join(filename);

        println!("Output file: {}", output_path.display());

        println!("Starting download...");
        downloader.download(record, output_path).await?;

        println!("Download completed!");

        Ok(())
    }
}
