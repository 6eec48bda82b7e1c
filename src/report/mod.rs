//! Plain-text reporting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;

use crate::normalize::TextBlock;
use crate::session::OcrRunResult;

/// Join block texts with newlines, in detection order. Empty input produces
/// the empty string.
pub fn plain_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the text report: run metadata as comment lines, then one block's
/// text per line.
pub fn write_report(run: &OcrRunResult, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "# OCR result - {} processing", run.processing_mode)?;
    writeln!(writer, "# processing time: {:.2}s", run.processing_time_seconds)?;
    writeln!(writer, "# text blocks: {}", run.total_blocks)?;
    writeln!(writer)?;
    for block in &run.results {
        writeln!(writer, "{}", block.text)?;
    }
    Ok(())
}
