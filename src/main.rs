//! Emoji photo booth driven by a replayed detection script.

use anyhow::{Context, Result};
use clap::Parser;
use emoji_booth::{
    app::Booth,
    assets::Assets,
    config::{Config, EXAMPLE_CONFIG},
    publish::{create_publisher, Publisher},
    replay,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Detection script to replay (JSON lines)
    #[arg(short, long, required_unless_present = "print_config")]
    script: Option<PathBuf>,

    /// Background image shown on every replayed frame
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Where to write the captured photo
    #[arg(short, long, default_value = "capture.jpg")]
    output: PathBuf,

    /// Skip remote publishing and share the preview instead
    #[arg(long)]
    offline: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Emoji Booth");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if args.offline {
        config.publish.enabled = false;
    }
    config.validate()?;

    let script = args.script.context("--script is required")?;
    let (source, mut detector) = replay::load(&script, args.background.as_deref(), &config.camera)
        .with_context(|| format!("Failed to load script {}", script.display()))?;

    let assets = Assets::load(&config.assets).await;
    let publisher: Arc<dyn Publisher> = Arc::from(create_publisher(&config.publish)?);

    // Create and run the booth
    let mut booth = Booth::new(&config, assets, publisher)?;
    booth.start(Box::new(source))?;

    let Some(capture) = booth.run(&mut detector).await? else {
        info!("Session ended without a photo");
        return Ok(());
    };

    std::fs::write(&args.output, &capture.artifact.photo_jpeg)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Photo written to {}", args.output.display());

    let link = capture.share.resolve().await;
    if link.is_remote() {
        println!("Photo link: {}", link.as_str());
    } else {
        println!("Photo preview: {}", link.as_str());
    }
    println!("QR code: {}", link.qr_code_url());

    Ok(())
}
