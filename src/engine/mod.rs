//! OCR engine boundary.
//!
//! The engine itself is an external black box (a PaddleOCR bridge process).
//! This module owns the handle to it: configuration, the two-step
//! initialization protocol with a reduced-configuration fallback, and the
//! raw JSON payload hand-off to the normalizer.

pub mod bridge;

pub use bridge::BridgeEngine;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::EngineSettings;

/// Errors at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine construction failed even after the fallback configuration.
    #[error("engine initialization failed: {message}")]
    Init { message: String },
    /// One engine call failed; the run yields zero blocks downstream.
    #[error("engine invocation failed: {message}")]
    Invocation { message: String },
}

impl EngineError {
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation {
            message: message.into(),
        }
    }
}

/// Backend identifier recorded with every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMode {
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "CPU")]
    Cpu,
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu => write!(f, "GPU"),
            Self::Cpu => write!(f, "CPU"),
        }
    }
}

/// Common interface for OCR engines.
///
/// `recognize` returns the engine's payload verbatim as JSON; shape
/// detection is the normalizer's job, not the engine's.
pub trait TextEngine {
    fn mode(&self) -> ProcessingMode;

    fn recognize(&self, image: &Path) -> Result<Value, EngineError>;
}

/// Configuration handed to the bridge process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interpreter used to run the bridge script
    pub interpreter: String,
    /// Path to the bridge script
    pub script: PathBuf,
    /// Recognition language ('en', 'korean', 'ch', ...)
    pub language: String,
    /// Use the accelerated backend
    pub accelerated: bool,
    /// CPU threads for the engine
    pub cpu_threads: u32,
    /// Accelerator memory budget in MB
    pub memory_budget_mb: u32,
}

impl EngineConfig {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            interpreter: settings.interpreter.clone(),
            script: settings.bridge_script.clone(),
            language: settings.language.clone(),
            accelerated: settings.accelerated,
            cpu_threads: settings.cpu_threads,
            memory_budget_mb: settings.memory_budget_mb,
        }
    }

    /// Reduced configuration for the second initialization attempt: the
    /// language is kept, everything else returns to defaults with
    /// acceleration off.
    pub fn fallback(&self) -> Self {
        let defaults = EngineSettings::default();
        Self {
            interpreter: self.interpreter.clone(),
            script: self.script.clone(),
            language: self.language.clone(),
            accelerated: false,
            cpu_threads: defaults.cpu_threads,
            memory_budget_mb: defaults.memory_budget_mb,
        }
    }
}

/// Initialize an engine from settings: one primary attempt, then one retry
/// with the reduced fallback configuration before surfacing failure.
pub fn connect(settings: &EngineSettings) -> Result<BridgeEngine, EngineError> {
    let config = EngineConfig::from_settings(settings);
    match BridgeEngine::initialize(config.clone()) {
        Ok(engine) => Ok(engine),
        Err(err) => {
            warn!("engine initialization failed ({err}); retrying with fallback configuration");
            BridgeEngine::initialize(config.fallback())
        }
    }
}
