//! Batch folder processing.
//!
//! Walks a directory for supported image files and writes one plain-text
//! report per image. A failed or textless image is logged and skipped; a
//! single image never aborts the batch.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::report;
use crate::session::OcrSession;

/// Image extensions the batch surface accepts.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// List supported image files in a directory, sorted by name.
pub fn find_image_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to read directory {}", directory.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if supported {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Process every supported image in `input_dir`, writing a `{stem}.txt`
/// report into `output_dir` for each image with detected text.
pub fn run_batch(session: &OcrSession, input_dir: &Path, output_dir: &Path) -> Result<()> {
    info!(
        "batch processing: {} -> {}",
        input_dir.display(),
        output_dir.display()
    );
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let images = find_image_files(input_dir)?;
    if images.is_empty() {
        info!("no images to process");
        return Ok(());
    }

    for image in &images {
        info!("processing {}", image.display());
        let run = session.run(image);
        let text = report::plain_text(&run.results);
        if text.is_empty() {
            info!("no text detected, skipping");
            continue;
        }

        let stem = image
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("output");
        let destination = output_dir.join(format!("{stem}.txt"));
        if let Err(err) = fs::write(&destination, &text) {
            warn!("failed to write {}: {err}", destination.display());
            continue;
        }
        info!("saved {}", destination.display());
    }

    Ok(())
}
