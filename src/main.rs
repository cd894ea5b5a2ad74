mod blacklist;
mod config;
mod error;
mod fetcher;
mod format;
mod models;
mod photo_clients;
mod pipeline;
mod scheduler;
mod selector;
mod source;
mod store;
mod store_clients;
#[cfg(test)]
mod testing;
mod web_server;

use crate::config::AppConfig;
use crate::format::FormatTag;
use crate::models::{validate_requests, ImageRequest};
use crate::photo_clients::unsplash::UnsplashSource;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::source::PhotoSource;
use crate::store::BlobStore;
use crate::store_clients::local::LocalBlobStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Downloads random photos in device-sized crops")]
struct Cli {
    /// Directory holding default.toml and the per-environment overrides
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP trigger, plus the timer when schedule.enabled is set
    Serve,
    /// Run one batch and print the manifest
    Run {
        /// Subject to fetch instead of the scheduled list
        #[arg(long)]
        subject: Option<String>,
        /// Format for --subject, repeatable
        #[arg(long = "format", value_name = "FORMAT", requires = "subject")]
        formats: Vec<FormatTag>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::new(&cli.config_dir)?;

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    config.validate()?;
    info!("Starting image-downloader");

    let source: Arc<dyn PhotoSource> = Arc::new(UnsplashSource::new(&config)?);
    let store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config)?);
    let pipeline = Arc::new(Pipeline::new(
        source,
        store,
        PipelineSettings::from_config(&config),
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let job = config.schedule.enabled.then(|| {
                scheduler::start_scheduled_job(config.schedule.clone(), pipeline.clone())
            });

            if let Err(e) = web_server::start_web_server(Arc::new(config), pipeline).await {
                log::error!("Web server error: {}", e);
            }
            if let Some(job) = job {
                job.abort();
            }
        }
        Command::Run { subject, formats } => {
            let requests = match subject {
                Some(subject) => validate_requests(vec![ImageRequest::new(subject, formats)])?,
                None => validate_requests(config.schedule.images.clone())?,
            };
            let manifest = pipeline.run(&requests).await?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
    }

    info!("Image-downloader finished");

    Ok(())
}
