//! External OCR bridge process.
//!
//! The bridge is a script wrapping the OCR engine; it accepts an image path
//! and engine knobs on its command line and prints the engine's raw result
//! as JSON on stdout. The JSON shape varies with the installed engine
//! version, which is why the payload is carried as an opaque
//! `serde_json::Value` until normalization.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, info};

use super::{EngineConfig, EngineError, ProcessingMode, TextEngine};

/// OCR engine backed by an external bridge process.
pub struct BridgeEngine {
    config: EngineConfig,
}

impl BridgeEngine {
    /// Initialize the engine handle by probing the bridge once, so a missing
    /// interpreter or broken script surfaces here rather than on the first
    /// image.
    pub fn initialize(config: EngineConfig) -> Result<Self, EngineError> {
        info!(
            language = %config.language,
            accelerated = config.accelerated,
            "initializing OCR engine"
        );

        let output = Command::new(&config.interpreter)
            .arg(&config.script)
            .arg("--probe")
            .output()
            .map_err(|err| EngineError::init(format!("failed to spawn bridge: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::init(format!(
                "bridge probe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        info!("OCR engine ready ({} mode)", if config.accelerated { "GPU" } else { "CPU" });
        Ok(Self { config })
    }
}

impl TextEngine for BridgeEngine {
    fn mode(&self) -> ProcessingMode {
        if self.config.accelerated {
            ProcessingMode::Gpu
        } else {
            ProcessingMode::Cpu
        }
    }

    fn recognize(&self, image: &Path) -> Result<Value, EngineError> {
        debug!(image = %image.display(), "invoking OCR bridge");

        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(&self.config.script)
            .arg("--image")
            .arg(image)
            .arg("--lang")
            .arg(&self.config.language)
            .arg("--cpu-threads")
            .arg(self.config.cpu_threads.to_string());
        if self.config.accelerated {
            command
                .arg("--accelerated")
                .arg("--memory-budget")
                .arg(self.config.memory_budget_mb.to_string());
        }

        let output = command
            .output()
            .map_err(|err| EngineError::invocation(format!("failed to spawn bridge: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::invocation(format!(
                "bridge exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|err| EngineError::invocation(format!("unparseable bridge output: {err}")))
    }
}
