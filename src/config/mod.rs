//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OCR engine settings
    pub engine: EngineSettings,
    /// Output settings
    pub output: OutputSettings,
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Recognition language ('en', 'korean', 'ch', ...)
    pub language: String,
    /// Use the accelerated (GPU) backend
    pub accelerated: bool,
    /// CPU threads for the engine
    pub cpu_threads: u32,
    /// Accelerator memory budget in MB
    pub memory_budget_mb: u32,
    /// Interpreter used to run the bridge script
    pub interpreter: String,
    /// Path to the OCR bridge script
    pub bridge_script: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            accelerated: true,
            cpu_threads: 8,
            memory_budget_mb: 2000,
            interpreter: "python3".to_string(),
            bridge_script: PathBuf::from("bridge/ocr_bridge.py"),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output prefix for single-image results
    pub output_prefix: String,
    /// Font file for overlay labels; common system fonts are tried when unset
    pub label_font: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_prefix: "ocr_output".to_string(),
            label_font: None,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "textgrab", "TextGrab")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check engine defaults
        assert_eq!(config.engine.language, "en");
        assert!(config.engine.accelerated);
        assert_eq!(config.engine.cpu_threads, 8);
        assert_eq!(config.engine.memory_budget_mb, 2000);
        assert_eq!(config.engine.interpreter, "python3");

        // Check output defaults
        assert_eq!(config.output.output_prefix, "ocr_output");
        assert!(config.output.label_font.is_none());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        // Serialize to TOML
        let toml_str = toml::to_string_pretty(&config).unwrap();

        // Deserialize back
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Verify values match
        assert_eq!(config.engine.language, parsed.engine.language);
        assert_eq!(config.engine.cpu_threads, parsed.engine.cpu_threads);
        assert_eq!(config.engine.accelerated, parsed.engine.accelerated);
        assert_eq!(config.output.output_prefix, parsed.output.output_prefix);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.engine.language = "korean".to_string();
        config.engine.accelerated = false;
        config.output.label_font = Some(PathBuf::from("/tmp/font.ttf"));

        // Serialize and deserialize
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.engine.language, "korean");
        assert!(!parsed.engine.accelerated);
        assert_eq!(parsed.output.label_font, Some(PathBuf::from("/tmp/font.ttf")));
    }

    #[test]
    fn test_save_and_load_config() {
        let config = AppConfig::default();

        // Create a temporary file
        let temp_file = NamedTempFile::new().unwrap();

        // Save config
        save_config(&config, temp_file.path()).unwrap();

        // Load config
        let loaded = load_config(temp_file.path()).unwrap();

        // Verify
        assert_eq!(config.engine.language, loaded.engine.language);
        assert_eq!(config.engine.memory_budget_mb, loaded.engine.memory_budget_mb);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
