//! TextGrab - OCR text extraction and annotation
//!
//! Invokes an external OCR engine, normalizes its version-dependent raw
//! output into a single stable schema, and writes plain-text, JSON, and
//! annotated-image results.

mod batch;
mod config;
mod engine;
mod export;
mod normalize;
mod render;
mod report;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::render::OverlayRenderer;
use crate::session::OcrSession;

/// TextGrab - OCR text extraction tool
#[derive(Parser, Debug)]
#[command(name = "textgrab")]
#[command(about = "Extracts text from images via an external OCR engine")]
struct Args {
    /// Image to process (defaults to the first image found in the current directory)
    image: Option<PathBuf>,

    /// Process every image in this directory instead of a single file
    #[arg(long)]
    batch: Option<PathBuf>,

    /// Output directory for batch mode
    #[arg(long, default_value = "ocr_output")]
    out: PathBuf,

    /// Recognition language (overrides the configured language)
    #[arg(short, long)]
    lang: Option<String>,

    /// Force the non-accelerated backend
    #[arg(long)]
    cpu: bool,

    /// Output prefix for single-image results
    #[arg(long)]
    output_prefix: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // Load or create configuration, then apply CLI overrides
    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(lang) = &args.lang {
        config.engine.language = lang.clone();
    }
    if args.cpu {
        config.engine.accelerated = false;
    }

    info!(
        "TextGrab starting (language: {}, accelerated: {})",
        config.engine.language, config.engine.accelerated
    );

    let engine = engine::connect(&config.engine).context("OCR engine initialization failed")?;
    let renderer = OverlayRenderer::new(config.output.label_font.as_deref());
    let session = OcrSession::new(Box::new(engine), renderer);

    if let Some(input_dir) = &args.batch {
        return batch::run_batch(&session, input_dir, &args.out);
    }

    let image = match args.image {
        Some(path) => path,
        None => batch::find_image_files(Path::new("."))?
            .into_iter()
            .next()
            .context(
                "no image file found in the current directory \
                 (supported: jpg, jpeg, png, bmp, tiff, webp)",
            )?,
    };

    let run = session.run(&image);

    if run.results.is_empty() {
        info!("no text detected");
        return Ok(());
    }

    // Plain text to stdout
    println!("{}", report::plain_text(&run.results));

    // Per-block detail
    for (index, block) in run.results.iter().enumerate() {
        info!(
            "{}. '{}' (confidence: {:.4}, polygon: {:?})",
            index + 1,
            block.text,
            block.confidence,
            block.polygon
        );
    }

    let prefix = args
        .output_prefix
        .unwrap_or_else(|| config.output.output_prefix.clone());
    session.save_results(&run, &prefix)?;

    info!("done");
    Ok(())
}

/// Load configuration from an explicit path, the config directory, or fall
/// back to defaults.
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(config) => {
                info!("loaded configuration from {}", path.display());
                return config;
            }
            Err(err) => {
                warn!(
                    "failed to load {}: {err}; using default configuration",
                    path.display()
                );
                return AppConfig::default();
            }
        }
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("using default configuration");
    AppConfig::default()
}
