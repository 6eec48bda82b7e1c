//! Structured JSON export.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use crate::session::OcrRunResult;

/// Write one run as pretty-printed UTF-8 JSON. The document deserializes
/// back into an equivalent [`OcrRunResult`] via serde.
///
/// Callers skip the export for runs without blocks; this function assumes
/// there is something to write.
pub fn write_json(run: &OcrRunResult, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .with_context(|| format!("failed to write JSON export to {}", path.display()))?;
    Ok(())
}
