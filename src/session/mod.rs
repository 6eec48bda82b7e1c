//! OCR session orchestration.
//!
//! Owns the engine handle, times each invocation, and routes the raw
//! payload through normalization and on to the report, export, and overlay
//! consumers. One invocation is in flight at a time; every call produces a
//! fresh [`OcrRunResult`].

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::engine::{ProcessingMode, TextEngine};
use crate::normalize::{self, TextBlock};
use crate::render::OverlayRenderer;
use crate::{export, report};

/// Aggregate result of one OCR invocation against one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRunResult {
    pub image_path: String,
    pub processing_mode: ProcessingMode,
    pub processing_time_seconds: f64,
    pub total_blocks: usize,
    pub results: Vec<TextBlock>,
    pub timestamp: String,
}

/// One OCR engine plus the consumers of its normalized output.
pub struct OcrSession {
    engine: Box<dyn TextEngine>,
    renderer: OverlayRenderer,
}

impl OcrSession {
    pub fn new(engine: Box<dyn TextEngine>, renderer: OverlayRenderer) -> Self {
        Self { engine, renderer }
    }

    /// Run the engine against one image. An engine failure is reported and
    /// yields an empty run rather than an error, so callers always get a
    /// result to consume.
    pub fn run(&self, image_path: &Path) -> OcrRunResult {
        info!(
            image = %image_path.display(),
            mode = %self.engine.mode(),
            "analyzing image"
        );

        let start = Instant::now();
        let blocks = match self.engine.recognize(image_path) {
            Ok(raw) => normalize::normalize(&raw),
            Err(err) => {
                warn!(
                    "OCR invocation failed after {:.2}s: {err}",
                    start.elapsed().as_secs_f64()
                );
                Vec::new()
            }
        };
        let processing_time = start.elapsed().as_secs_f64();

        info!(
            "found {} text blocks in {:.2}s",
            blocks.len(),
            processing_time
        );

        OcrRunResult {
            image_path: image_path.display().to_string(),
            processing_mode: self.engine.mode(),
            processing_time_seconds: processing_time,
            total_blocks: blocks.len(),
            results: blocks,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Extract just the newline-joined plain text from an image.
    pub fn plain_text(&self, image_path: &Path) -> String {
        report::plain_text(&self.run(image_path).results)
    }

    /// Write the text report, JSON export, and annotated overlay for a run.
    /// A run without blocks produces no files. A rendering failure is
    /// reported but does not disturb the text and JSON outputs, which are
    /// already complete by then.
    pub fn save_results(&self, run: &OcrRunResult, prefix: &str) -> Result<()> {
        if run.results.is_empty() {
            info!("no text to export");
            return Ok(());
        }

        let txt_path = format!("{prefix}.txt");
        report::write_report(run, Path::new(&txt_path))?;
        info!("text report saved: {txt_path}");

        let json_path = format!("{prefix}.json");
        export::write_json(run, Path::new(&json_path))?;
        info!("JSON export saved: {json_path}");

        let visual_path = format!("{prefix}_visual.jpg");
        match self.renderer.render(
            Path::new(&run.image_path),
            &run.results,
            Path::new(&visual_path),
        ) {
            Ok(()) => info!("annotated image saved: {visual_path}"),
            Err(err) => error!("overlay rendering failed: {err}"),
        }

        Ok(())
    }
}
